use crate::analysis_client::impl_fake::AnalysisClientFake;
use crate::config::Config;
use crate::device_camera::impl_fake::DeviceCameraFake;
use crate::device_display::impl_fake::{DeviceDisplayFake, ShownFrame};
use crate::emotion_client::main::EmotionClient;
use crate::library::logger::{impl_console::LoggerConsole, interface::Logger};
use crate::streaming_channel::impl_fake::StreamingChannelFake;
use std::io::{BufReader, Read};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Blocking command input fed line by line from the test.
pub struct ScriptedInput {
    lines: Receiver<String>,
    pending: Vec<u8>,
}

impl Read for ScriptedInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pending.is_empty() {
            match self.lines.recv() {
                Ok(line) => self.pending = format!("{}\n", line).into_bytes(),
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

pub struct Fixture {
    pub device_camera: Arc<DeviceCameraFake>,
    pub channel: Arc<StreamingChannelFake>,
    pub analysis_client: Arc<AnalysisClientFake>,
    pub shown: Arc<Mutex<Vec<ShownFrame>>>,
    pub input: Sender<String>,
    pub client: EmotionClient,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_camera(|camera| camera)
    }

    pub fn with_camera(configure: impl FnOnce(DeviceCameraFake) -> DeviceCameraFake) -> Self {
        let config = Config::default();
        let logger: Arc<dyn Logger + Send + Sync> =
            Arc::new(LoggerConsole::new(config.logger_timezone));
        let device_camera = Arc::new(configure(DeviceCameraFake::new(logger.clone())));
        let channel = Arc::new(StreamingChannelFake::new(logger.clone(), true));
        let analysis_client = Arc::new(AnalysisClientFake::new(logger.clone()));
        let device_display = DeviceDisplayFake::new(logger.clone());
        let shown = device_display.history();
        let (input, lines) = mpsc::channel();

        let client = EmotionClient::new(
            config,
            logger,
            device_camera.clone(),
            channel.clone(),
            analysis_client.clone(),
            Arc::new(Mutex::new(device_display)),
            Box::new(BufReader::new(ScriptedInput {
                lines,
                pending: Vec::new(),
            })),
        );

        Self {
            device_camera,
            channel,
            analysis_client,
            shown,
            input,
            client,
        }
    }

    pub fn type_line(&self, line: &str) {
        let _ = self.input.send(line.to_string());
    }

    pub fn forget_frames(&self) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Polls the shown frames until one satisfies `predicate`.
    pub fn wait_for_frame(&self, predicate: impl Fn(&ShownFrame) -> bool) -> Option<ShownFrame> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let found = self
                .shown
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .rev()
                .find(|frame| predicate(frame))
                .cloned();
            if found.is_some() {
                return found;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        None
    }
}
