use crate::device_camera::interface::{CaptureError, DeviceCamera, VideoStream};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCameraAccess {
    Granted,
    Denied,
    NoDevice,
}

pub struct DeviceCameraFake {
    logger: Arc<dyn Logger + Send + Sync>,
    access: Mutex<FakeCameraAccess>,
    resolution: (u32, u32),
    warmup: Duration,
    acquire_delay: Duration,
    acquisitions: AtomicUsize,
    streams: Mutex<Vec<Arc<FakeVideoStream>>>,
}

impl DeviceCameraFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("camera").with_namespace("fake"),
            access: Mutex::new(FakeCameraAccess::Granted),
            resolution: (320, 240),
            warmup: Duration::ZERO,
            acquire_delay: Duration::ZERO,
            acquisitions: AtomicUsize::new(0),
            streams: Mutex::new(Vec::new()),
        }
    }

    /// Time after acquisition before the feed reports enough data.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = (width, height);
        self
    }

    pub fn set_access(&self, access: FakeCameraAccess) {
        *self.access.lock().unwrap_or_else(PoisonError::into_inner) = access;
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn last_stream(&self) -> Option<Arc<FakeVideoStream>> {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Streams still held by the fake. Stopped ones are let go on the next acquisition.
    pub fn retained_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn live_streams(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|stream| stream.is_live())
            .count()
    }
}

impl DeviceCamera for DeviceCameraFake {
    fn acquire(&self) -> Result<Arc<dyn VideoStream>, CaptureError> {
        let _ = self.logger.info("Acquiring camera...");
        if !self.acquire_delay.is_zero() {
            std::thread::sleep(self.acquire_delay);
        }

        let access = *self.access.lock().unwrap_or_else(PoisonError::into_inner);
        match access {
            FakeCameraAccess::Denied => {
                return Err(CaptureError::PermissionDenied(
                    "user refused camera access".to_string(),
                ))
            }
            FakeCameraAccess::NoDevice => {
                return Err(CaptureError::ResourceUnavailable(
                    "no video input device".to_string(),
                ))
            }
            FakeCameraAccess::Granted => {}
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        let stream = Arc::new(FakeVideoStream::new(
            self.resolution,
            self.warmup,
            Arc::clone(&self.logger),
        ));
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        streams.retain(|stream| stream.is_live());
        streams.push(Arc::clone(&stream));
        drop(streams);

        let _ = self.logger.info("Camera acquired");
        Ok(stream)
    }
}

pub struct FakeVideoStream {
    logger: Arc<dyn Logger + Send + Sync>,
    resolution: (u32, u32),
    acquired_at: Instant,
    warmup: Duration,
    forced_ready: Mutex<Option<bool>>,
    live: AtomicBool,
    frames_rendered: AtomicU64,
}

impl FakeVideoStream {
    fn new(resolution: (u32, u32), warmup: Duration, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger,
            resolution,
            acquired_at: Instant::now(),
            warmup,
            forced_ready: Mutex::new(None),
            live: AtomicBool::new(true),
            frames_rendered: AtomicU64::new(0),
        }
    }

    /// Overrides the warm-up based readiness.
    pub fn set_ready(&self, ready: bool) {
        *self
            .forced_ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(ready);
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::SeqCst)
    }
}

impl VideoStream for FakeVideoStream {
    fn has_enough_data(&self) -> bool {
        if !self.is_live() {
            return false;
        }
        let forced = *self
            .forced_ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        forced.unwrap_or_else(|| self.acquired_at.elapsed() >= self.warmup)
    }

    fn native_resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn render_frame(&self, buffer: &mut RgbImage) -> Result<(), CaptureError> {
        if !self.is_live() {
            return Err(CaptureError::Frame("tracks stopped".to_string()));
        }

        let frame = self.frames_rendered.fetch_add(1, Ordering::SeqCst);
        let tint: u8 = rand::rng().random();
        let shift = (frame % 256) as u32;

        for (x, y, pixel) in buffer.enumerate_pixels_mut() {
            *pixel = Rgb([((x + shift) % 256) as u8, (y % 256) as u8, tint]);
        }
        Ok(())
    }

    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            let _ = self.logger.info("Tracks stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
