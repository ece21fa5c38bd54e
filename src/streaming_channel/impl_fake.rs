use crate::library::logger::interface::Logger;
use crate::result_aggregator::{Emotion, EmotionHistogram};
use crate::streaming_channel::interface::{ChannelError, ChannelEvent, StreamingChannel};
use crate::streaming_channel::message::{FrameMessage, ResultMessage};
use crate::streaming_channel::subscribers::Subscribers;
use rand::distr::{Distribution, Uniform};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};

/// How many sent frames are kept for inspection.
const RECENT_FRAMES: usize = 64;

/// In-process stand-in for the classification service.
pub struct StreamingChannelFake {
    logger: Arc<dyn Logger + Send + Sync>,
    connected: AtomicBool,
    auto_respond: bool,
    recent: Mutex<VecDeque<FrameMessage>>,
    sent: AtomicUsize,
    subscribers: Subscribers<ChannelEvent>,
}

impl StreamingChannelFake {
    /// With `auto_respond` every sent frame is answered with a random result.
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, auto_respond: bool) -> Self {
        Self {
            logger: logger.with_namespace("channel").with_namespace("fake"),
            connected: AtomicBool::new(false),
            auto_respond,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_FRAMES)),
            sent: AtomicUsize::new(0),
            subscribers: Subscribers::new(),
        }
    }

    /// The most recent sent frames, oldest first.
    pub fn sent_frames(&self) -> Vec<FrameMessage> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Every frame accepted since creation.
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Simulates the service pushing a result.
    pub fn deliver(&self, result: ResultMessage) {
        self.subscribers.publish(ChannelEvent::Result(result));
    }

    pub fn disconnect(&self, reason: &str) {
        self.connected.store(false, Ordering::SeqCst);
        self.subscribers.publish(ChannelEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    fn random_result(frame: &FrameMessage) -> Result<ResultMessage, rand::distr::uniform::Error> {
        let mut rng = rand::rng();
        let score = Uniform::new(0.0, 1.0)?;

        let category_values = Emotion::ALL
            .into_iter()
            .map(|emotion| (emotion.label().to_string(), score.sample(&mut rng)))
            .collect();

        let mut result = ResultMessage {
            display_image: Some(frame.image.clone()),
            message: String::new(),
            category_values,
            seq: Some(frame.seq),
        };

        let mut histogram = EmotionHistogram::default();
        histogram.replace_from(&result.category_values);
        result.message = match histogram.dominant() {
            Some(emotion) => format!("Detected {} {}", emotion, emotion.emoji()),
            None => "No face detected".to_string(),
        };

        Ok(result)
    }
}

impl StreamingChannel for StreamingChannelFake {
    fn connect(&self) -> Result<(), ChannelError> {
        let _ = self.logger.info("Connecting...");
        self.connected.store(true, Ordering::SeqCst);
        self.subscribers.publish(ChannelEvent::Connected);
        Ok(())
    }

    fn send(&self, frame: FrameMessage) {
        if !self.connected.load(Ordering::SeqCst) {
            let _ = self
                .logger
                .warn(&format!("Not connected, dropping frame {}", frame.seq));
            return;
        }

        if self.auto_respond {
            match Self::random_result(&frame) {
                Ok(result) => self.subscribers.publish(ChannelEvent::Result(result)),
                Err(e) => {
                    let _ = self.logger.error(&format!("Fake result failed: {}", e));
                }
            }
        }

        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        if recent.len() == RECENT_FRAMES {
            recent.pop_front();
        }
        recent.push_back(frame);
        self.sent.fetch_add(1, Ordering::SeqCst);
    }

    fn events(&self) -> Receiver<ChannelEvent> {
        self.subscribers.subscribe()
    }
}
