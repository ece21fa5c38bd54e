use crate::device_camera::interface::{CaptureError, VideoStream};
use crate::library::logger::interface::Logger;
use crate::streaming_channel::message::{EncodedImage, FrameMessage};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub type OnFrame = Box<dyn Fn(FrameMessage) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub jpeg_quality: u8,
}

struct Ticker {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Snapshots the video feed at a fixed period and hands each encoded frame
/// to `on_frame`. Ticks never overlap; a tick that finds the feed not ready
/// is skipped.
pub struct FrameCaptureScheduler {
    config: SchedulerConfig,
    sequence: Arc<AtomicU64>,
    logger: Arc<dyn Logger + Send + Sync>,
    ticker: Option<Ticker>,
}

impl FrameCaptureScheduler {
    /// `sequence` is shared between schedulers so frame numbers stay
    /// monotonic across sessions.
    pub fn new(
        config: SchedulerConfig,
        sequence: Arc<AtomicU64>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            config: SchedulerConfig {
                interval: config.interval.max(MIN_INTERVAL),
                ..config
            },
            sequence,
            logger: logger.with_namespace("scheduler"),
            ticker: None,
        }
    }

    pub fn start(&mut self, source: Arc<dyn VideoStream>, on_frame: OnFrame) {
        if self.ticker.is_some() {
            let _ = self.logger.warn("Already ticking, ignoring start");
            return;
        }

        let (shutdown_tx, shutdown_rx) = channel::<()>();
        let config = self.config;
        let sequence = Arc::clone(&self.sequence);
        let logger = Arc::clone(&self.logger);

        let handle = std::thread::spawn(move || {
            let mut deadline = Instant::now() + config.interval;
            loop {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match shutdown_rx.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }

                match capture_tick(source.as_ref(), config.jpeg_quality, &sequence) {
                    Ok(Some(frame)) => on_frame(frame),
                    Ok(None) => {}
                    Err(e) => {
                        let _ = logger.warn(&format!("Tick skipped: {}", e));
                    }
                }

                // Missed periods are dropped rather than fired back to back.
                deadline += config.interval;
                let now = Instant::now();
                while deadline <= now {
                    deadline += config.interval;
                }
            }
        });

        let _ = self.logger.info(&format!(
            "Ticking every {}ms",
            self.config.interval.as_millis()
        ));
        self.ticker = Some(Ticker {
            shutdown_tx,
            handle,
        });
    }

    /// Returns once the ticker thread has exited; no tick fires afterwards.
    pub fn stop(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };
        let _ = ticker.shutdown_tx.send(());
        if ticker.handle.join().is_err() {
            let _ = self.logger.error("Ticker thread panicked");
        }
        let _ = self.logger.info("Stopped");
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }
}

impl Drop for FrameCaptureScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One tick: `None` when the feed is not ready yet.
pub fn capture_tick(
    source: &dyn VideoStream,
    jpeg_quality: u8,
    sequence: &AtomicU64,
) -> Result<Option<FrameMessage>, CaptureError> {
    if !source.has_enough_data() {
        return Ok(None);
    }

    let (width, height) = source.native_resolution();
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let mut buffer = RgbImage::new(width, height);
    source.render_frame(&mut buffer)?;
    let bytes = encode_jpeg(&buffer, jpeg_quality)?;

    Ok(Some(FrameMessage {
        seq: sequence.fetch_add(1, Ordering::SeqCst),
        image: EncodedImage::jpeg(&bytes),
    }))
}

pub fn encode_jpeg(buffer: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(buffer)
        .map_err(|e| CaptureError::Frame(e.to_string()))?;
    Ok(bytes)
}
