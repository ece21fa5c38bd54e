use crate::analysis_client::interface::AnalysisClient;
use crate::capture_session::lifecycle::CaptureLifecycle;
use crate::command::Command;
use crate::emotion_client::core::{Effect, Event};
use crate::library::logger::interface::Logger;
use crate::streaming_channel::interface::{ChannelEvent, StreamingChannel};
use crate::streaming_channel::message::EncodedImage;
use std::error::Error;
use std::io::BufRead;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

pub type CommandInput = Arc<Mutex<Box<dyn BufRead + Send>>>;

#[derive(Clone)]
pub struct RunEffect {
    logger: Arc<dyn Logger + Send + Sync>,
    lifecycle: Arc<CaptureLifecycle>,
    channel: Arc<dyn StreamingChannel + Send + Sync>,
    analysis_client: Arc<dyn AnalysisClient + Send + Sync>,
    input: CommandInput,
    channel_events: Arc<Mutex<Option<Receiver<ChannelEvent>>>>,
    event_sender: Sender<Event>,
}

impl RunEffect {
    pub fn new(
        logger: Arc<dyn Logger + Send + Sync>,
        lifecycle: Arc<CaptureLifecycle>,
        channel: Arc<dyn StreamingChannel + Send + Sync>,
        analysis_client: Arc<dyn AnalysisClient + Send + Sync>,
        input: CommandInput,
        event_sender: Sender<Event>,
    ) -> Self {
        // Subscribed up front so nothing published by the first connect is missed.
        let channel_events = Arc::new(Mutex::new(Some(channel.events())));
        Self {
            logger,
            lifecycle,
            channel,
            analysis_client,
            input,
            channel_events,
            event_sender,
        }
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        match effect {
            Effect::SubscribeToCommands => self.read_commands(),
            Effect::SubscribeToChannelEvents => {
                let subscribed = self
                    .channel_events
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                let events = match subscribed {
                    Some(events) => events,
                    None => self.channel.events(),
                };
                while let Ok(event) = events.recv() {
                    if self.event_sender.send(Event::Channel(event)).is_err() {
                        return;
                    }
                }
            }
            Effect::ConnectChannel => {
                let connected = self.channel.connect();
                let _ = self.event_sender.send(Event::ChannelConnectDone(connected));
            }
            Effect::StartSession => {
                let started = self.lifecycle.start();
                let _ = self.event_sender.send(Event::SessionStartDone(started));
            }
            Effect::StopSession => {
                let stopped = self.lifecycle.stop();
                let _ = self.event_sender.send(Event::SessionStopDone(stopped));
            }
            Effect::AnalyzeStatic(source) => {
                let analyzed = self.analysis_client.analyze(&source);
                let _ = self.event_sender.send(Event::StaticAnalysisDone(analyzed));
            }
            Effect::Snap => {
                let annotated: Result<EncodedImage, Box<dyn Error + Send + Sync>> =
                    match self.lifecycle.snapshot() {
                        Ok(frame) => self
                            .analysis_client
                            .annotate(&frame.image)
                            .map_err(Into::into),
                        Err(e) => Err(e.into()),
                    };
                let _ = self.event_sender.send(Event::SnapDone(annotated));
            }
            // Handled by the event loop itself.
            Effect::Shutdown => {}
        }
    }

    fn read_commands(&self) {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        let mut line = String::new();

        loop {
            line.clear();
            let event = match input.read_line(&mut line) {
                Ok(0) => Event::InputClosed,
                Ok(_) if line.trim().is_empty() => continue,
                Ok(_) => match line.parse::<Command>() {
                    Ok(command) => Event::Command(command),
                    Err(e) => Event::CommandRejected(e),
                },
                Err(e) => {
                    let _ = self.logger.error(&format!("Reading commands failed: {}", e));
                    Event::InputClosed
                }
            };

            let closed = matches!(event, Event::InputClosed);
            if self.event_sender.send(event).is_err() || closed {
                return;
            }
        }
    }
}
