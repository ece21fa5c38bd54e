use crate::library::logger::interface::Logger;
use crate::streaming_channel::interface::{ChannelError, ChannelEvent, StreamingChannel};
use crate::streaming_channel::message::{FrameMessage, WireMessage};
use crate::streaming_channel::subscribers::Subscribers;
use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const DROP_LOG_EVERY: u64 = 50;

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct WebSocketChannelConfig {
    pub url: String,
    pub tag_frames: bool,
    pub queue_capacity: usize,
}

/// JSON-over-WebSocket transport. One IO thread per connection owns the
/// socket, interleaving queued writes with short-timeout reads.
pub struct StreamingChannelWebSocket {
    config: WebSocketChannelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
    outbound: Mutex<Option<SyncSender<FrameMessage>>>,
    subscribers: Arc<Subscribers<ChannelEvent>>,
    dropped: AtomicU64,
}

impl StreamingChannelWebSocket {
    pub fn new(config: WebSocketChannelConfig, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            config,
            logger: logger.with_namespace("channel").with_namespace("websocket"),
            outbound: Mutex::new(None),
            subscribers: Arc::new(Subscribers::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Frames discarded so far, for any reason.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn drop_frame(&self, frame: &FrameMessage, why: &str) {
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        if dropped == 1 || dropped % DROP_LOG_EVERY == 0 {
            let _ = self.logger.warn(&format!(
                "Dropped frame {} ({}); {} dropped so far",
                frame.seq, why, dropped
            ));
        }
    }
}

impl StreamingChannel for StreamingChannelWebSocket {
    fn connect(&self) -> Result<(), ChannelError> {
        let _ = self
            .logger
            .info(&format!("Connecting to {}", self.config.url));

        let (mut socket, _response) = tungstenite::connect(self.config.url.as_str())
            .map_err(|e| ChannelError::TransportFailure(e.to_string()))?;

        set_read_timeout(&mut socket, POLL_INTERVAL)
            .map_err(|e| ChannelError::TransportFailure(e.to_string()))?;

        let (tx, rx) = sync_channel(self.config.queue_capacity.max(1));

        // Replacing the sender retires any previous IO thread.
        *self
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);

        let io = SocketIo {
            socket,
            outbound: rx,
            subscribers: Arc::clone(&self.subscribers),
            logger: Arc::clone(&self.logger),
            tag_frames: self.config.tag_frames,
        };
        std::thread::spawn(move || io.run());

        let _ = self.logger.info("Connected");
        self.subscribers.publish(ChannelEvent::Connected);
        Ok(())
    }

    fn send(&self, frame: FrameMessage) {
        let mut outbound = self
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(tx) = outbound.as_ref() else {
            self.drop_frame(&frame, "not connected");
            return;
        };

        match tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => self.drop_frame(&frame, "queue full"),
            Err(TrySendError::Disconnected(frame)) => {
                *outbound = None;
                self.drop_frame(&frame, "connection closed");
            }
        }
    }

    fn events(&self) -> Receiver<ChannelEvent> {
        self.subscribers.subscribe()
    }
}

fn set_read_timeout(socket: &mut Socket, timeout: Duration) -> std::io::Result<()> {
    match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout)),
        _ => Ok(()),
    }
}

struct SocketIo {
    socket: Socket,
    outbound: Receiver<FrameMessage>,
    subscribers: Arc<Subscribers<ChannelEvent>>,
    logger: Arc<dyn Logger + Send + Sync>,
    tag_frames: bool,
}

enum Step {
    Continue,
    Retired,
    Lost(String),
}

impl SocketIo {
    fn run(mut self) {
        loop {
            let step = match self.flush_outbound() {
                Step::Continue => self.poll_inbound(),
                other => other,
            };

            match step {
                Step::Continue => {}
                Step::Retired => {
                    let _ = self.socket.close(None);
                    let _ = self.socket.flush();
                    return;
                }
                Step::Lost(reason) => {
                    let _ = self.logger.error(&format!("Connection lost: {}", reason));
                    self.subscribers
                        .publish(ChannelEvent::Disconnected { reason });
                    return;
                }
            }
        }
    }

    fn flush_outbound(&mut self) -> Step {
        loop {
            match self.outbound.try_recv() {
                Ok(frame) => {
                    let text = match serde_json::to_string(&frame.to_wire(self.tag_frames)) {
                        Ok(text) => text,
                        Err(e) => {
                            let _ = self
                                .logger
                                .warn(&format!("Could not encode frame {}: {}", frame.seq, e));
                            continue;
                        }
                    };
                    if let Err(e) = self.socket.send(Message::Text(text)) {
                        return Step::Lost(e.to_string());
                    }
                }
                Err(TryRecvError::Empty) => return Step::Continue,
                Err(TryRecvError::Disconnected) => return Step::Retired,
            }
        }
    }

    fn poll_inbound(&mut self) -> Step {
        match self.socket.read() {
            Ok(Message::Text(text)) => {
                match serde_json::from_str::<WireMessage>(&text) {
                    Ok(WireMessage::Response(result)) => {
                        self.subscribers.publish(ChannelEvent::Result(result))
                    }
                    Ok(WireMessage::Image(_)) => {
                        let _ = self.logger.warn("Ignoring image event sent by the service");
                    }
                    Err(e) => {
                        let _ = self
                            .logger
                            .warn(&format!("Ignoring unparseable message: {}", e));
                    }
                }
                Step::Continue
            }
            Ok(Message::Close(_)) => Step::Lost("closed by server".to_string()),
            Ok(_) => Step::Continue,
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                Step::Continue
            }
            Err(e) => Step::Lost(e.to_string()),
        }
    }
}
