#[cfg(test)]
mod websocket_test {
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::streaming_channel::impl_websocket::{
        StreamingChannelWebSocket, WebSocketChannelConfig,
    };
    use crate::streaming_channel::interface::{ChannelEvent, StreamingChannel};
    use crate::streaming_channel::message::{
        EncodedImage, FrameMessage, FramePayload, WireMessage,
    };
    use chrono::{Offset, Utc};
    use std::net::TcpListener;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::{Duration, Instant};
    use tungstenite::Message;

    const WAIT: Duration = Duration::from_secs(5);

    fn channel(url: String, tag_frames: bool) -> StreamingChannelWebSocket {
        channel_with_queue(url, tag_frames, 4)
    }

    fn channel_with_queue(
        url: String,
        tag_frames: bool,
        queue_capacity: usize,
    ) -> StreamingChannelWebSocket {
        StreamingChannelWebSocket::new(
            WebSocketChannelConfig {
                url,
                tag_frames,
                queue_capacity,
            },
            Arc::new(LoggerConsole::new(Utc.fix())),
        )
    }

    fn frame(seq: u64) -> FrameMessage {
        FrameMessage {
            seq,
            image: EncodedImage::jpeg(&[0xff, 0xd8, 0xff]),
        }
    }

    #[test]
    fn sends_frames_and_delivers_responses() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut socket = tungstenite::accept(stream).unwrap();

            let received = socket.read().unwrap().into_text().unwrap();
            let wire: WireMessage = serde_json::from_str(&received).unwrap();

            let response = serde_json::json!({
                "event": "response",
                "data": {
                    "image": "data:image/jpeg;base64,AA==",
                    "message": "Detected",
                    "chart_data": { "neutral": 3 }
                }
            });
            socket.send(Message::Text(response.to_string())).unwrap();

            // Wait for the client to hang up.
            let _ = socket.read();
            wire
        });

        let channel = channel(url, true);
        let events = channel.events();
        channel.connect().unwrap();
        assert_eq!(events.recv_timeout(WAIT).unwrap(), ChannelEvent::Connected);

        channel.send(frame(3));

        match events.recv_timeout(WAIT).unwrap() {
            ChannelEvent::Result(result) => {
                assert_eq!(result.message, "Detected");
                assert_eq!(result.category_values.get("neutral"), Some(&3.0));
            }
            other => panic!("unexpected event {:?}", other),
        }

        drop(channel);
        let wire = server.join().unwrap();
        match wire {
            WireMessage::Image(FramePayload::Sequenced { seq, image }) => {
                assert_eq!(seq, 3);
                assert_eq!(image, EncodedImage::jpeg(&[0xff, 0xd8, 0xff]));
            }
            other => panic!("unexpected wire message {:?}", other),
        }
    }

    #[test]
    fn reports_a_disconnect_when_the_server_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut socket = tungstenite::accept(stream).unwrap();
            socket.close(None).unwrap();
            while socket.read().is_ok() {}
        });

        let channel = channel(url, false);
        let events = channel.events();
        channel.connect().unwrap();

        assert_eq!(events.recv_timeout(WAIT).unwrap(), ChannelEvent::Connected);
        assert!(matches!(
            events.recv_timeout(WAIT).unwrap(),
            ChannelEvent::Disconnected { .. }
        ));
        server.join().unwrap();
    }

    #[test]
    fn connect_fails_with_a_transport_error_when_nobody_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        drop(listener);

        let channel = channel(url, false);

        assert!(channel.connect().is_err());

        channel.send(frame(1));
        assert_eq!(channel.dropped(), 1);
    }

    #[test]
    fn frames_are_dropped_when_the_queue_is_full() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (release_tx, release_rx) = mpsc::channel::<()>();

        // Accepts and then never reads, so the first large frame stalls the writer.
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let socket = tungstenite::accept(stream).unwrap();
            let _ = release_rx.recv_timeout(WAIT * 4);
            drop(socket);
        });

        let channel = channel_with_queue(url, false, 1);
        channel.connect().unwrap();
        let large = FrameMessage {
            seq: 0,
            image: EncodedImage::jpeg(&vec![0u8; 24 * 1024 * 1024]),
        };

        let started = Instant::now();
        for seq in 0..8 {
            channel.send(FrameMessage {
                seq,
                ..large.clone()
            });
            thread::sleep(Duration::from_millis(20));
        }

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(channel.dropped() >= 6, "dropped {}", channel.dropped());

        let _ = release_tx.send(());
        server.join().unwrap();
    }
}
