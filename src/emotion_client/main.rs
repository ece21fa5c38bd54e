use crate::analysis_client::interface::AnalysisClient;
use crate::capture_session::lifecycle::CaptureLifecycle;
use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::emotion_client::core::{init, transition, Effect, Event, Model};
use crate::emotion_client::render::Render;
use crate::emotion_client::run_effect::RunEffect;
use crate::frame_scheduler::SchedulerConfig;
use crate::library::logger::interface::Logger;
use crate::streaming_channel::interface::StreamingChannel;
use std::error::Error;
use std::io::BufRead;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct EmotionClient {
    model: Arc<Mutex<Model>>,
    event_receiver: Arc<Mutex<Receiver<Event>>>,
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    lifecycle: Arc<CaptureLifecycle>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    run_effect: RunEffect,
    render: Render,
}

impl EmotionClient {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        streaming_channel: Arc<dyn StreamingChannel + Send + Sync>,
        analysis_client: Arc<dyn AnalysisClient + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        input: Box<dyn BufRead + Send>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let lifecycle = Arc::new(CaptureLifecycle::new(
            SchedulerConfig {
                interval: config.capture_interval,
                jpeg_quality: config.jpeg_quality,
            },
            logger.clone(),
            device_camera,
            streaming_channel.clone(),
        ));
        let run_effect = RunEffect::new(
            logger.with_namespace("effect"),
            lifecycle.clone(),
            streaming_channel,
            analysis_client,
            Arc::new(Mutex::new(input)),
            event_sender,
        );

        Self {
            model: Arc::new(Mutex::new(init(&config).0)),
            event_receiver: Arc::new(Mutex::new(event_receiver)),
            logger: logger.with_namespace("client"),
            lifecycle,
            render: Render::new(device_display.clone()),
            device_display,
            run_effect,
            config,
        }
    }

    #[allow(dead_code)]
    pub fn model(&self) -> Model {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let run_effect = self.run_effect.clone();
            std::thread::spawn(move || run_effect.run_effect(effect));
        }
    }

    fn render(&self, model: &Model) {
        if let Err(e) = self.render.render(model) {
            let _ = self.logger.error(&format!("Render failed: {}", e));
        }
    }

    fn shutdown(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let _ = self.logger.info("Shutting down");
        self.lifecycle.shutdown();
        self.device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()?;
        Ok(())
    }

    /// Runs until a `quit` command or the end of command input.
    pub fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .init()?;

        let (initial, effects) = init(&self.config);
        *self.model.lock().unwrap_or_else(PoisonError::into_inner) = initial.clone();
        self.render(&initial);
        self.spawn_effects(effects);

        let receiver = self
            .event_receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut current = initial;

        loop {
            let event = receiver.recv()?;
            let _ = self
                .logger
                .info(&format!("event: {}", event.to_display_string()));

            let stale_before = current.stale_results;
            let (next, effects) = transition(&self.config, current, event);

            if next.stale_results > stale_before {
                let _ = self.logger.warn(&format!(
                    "Discarded a late result ({} so far)",
                    next.stale_results
                ));
            }
            if !effects.is_empty() {
                let _ = self.logger.info(&format!("effects: {:?}", effects));
            }

            *self.model.lock().unwrap_or_else(PoisonError::into_inner) = next.clone();
            self.render(&next);

            if effects.contains(&Effect::Shutdown) {
                return self.shutdown();
            }

            self.spawn_effects(effects);
            current = next;
        }
    }
}
