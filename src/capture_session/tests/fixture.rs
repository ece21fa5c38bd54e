use crate::capture_session::lifecycle::CaptureLifecycle;
use crate::device_camera::impl_fake::DeviceCameraFake;
use crate::frame_scheduler::SchedulerConfig;
use crate::library::logger::{impl_console::LoggerConsole, interface::Logger};
use crate::streaming_channel::impl_fake::StreamingChannelFake;
use crate::streaming_channel::interface::StreamingChannel;
use chrono::{Offset, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const INTERVAL: Duration = Duration::from_millis(10);

pub struct Fixture {
    pub device_camera: Arc<DeviceCameraFake>,
    pub channel: Arc<StreamingChannelFake>,
    pub lifecycle: CaptureLifecycle,
}

impl Fixture {
    pub fn new() -> Self {
        let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(Utc.fix()));
        let device_camera = Arc::new(DeviceCameraFake::new(logger.clone()));
        let channel = Arc::new(StreamingChannelFake::new(logger.clone(), false));
        let _ = channel.connect();
        let lifecycle = CaptureLifecycle::new(
            SchedulerConfig {
                interval: INTERVAL,
                jpeg_quality: 80,
            },
            logger,
            device_camera.clone(),
            channel.clone(),
        );

        Self {
            device_camera,
            channel,
            lifecycle,
        }
    }

    pub fn wait_for_sends(&self, at_least: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.channel.sent_count() < at_least && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        self.channel.sent_count()
    }
}
