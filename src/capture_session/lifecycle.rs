use crate::device_camera::interface::{CaptureError, DeviceCamera, VideoStream};
use crate::frame_scheduler::{capture_tick, FrameCaptureScheduler, SchedulerConfig};
use crate::library::logger::interface::Logger;
use crate::streaming_channel::interface::StreamingChannel;
use crate::streaming_channel::message::FrameMessage;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: u64,
    pub resolution: (u32, u32),
}

/// The acquired camera feed plus the scheduler ticking over it.
struct CaptureSession {
    info: SessionInfo,
    stream: Arc<dyn VideoStream>,
    scheduler: FrameCaptureScheduler,
}

/// Owns the one capture session. `start` and `stop` are serialized, so a
/// stop issued while an acquisition is pending waits for it and then tears
/// the new session down.
pub struct CaptureLifecycle {
    scheduler_config: SchedulerConfig,
    logger: Arc<dyn Logger + Send + Sync>,
    device_camera: Arc<dyn DeviceCamera + Send + Sync>,
    channel: Arc<dyn StreamingChannel + Send + Sync>,
    sequence: Arc<AtomicU64>,
    next_session_id: AtomicU64,
    closed: AtomicBool,
    session: Mutex<Option<CaptureSession>>,
}

impl CaptureLifecycle {
    pub fn new(
        scheduler_config: SchedulerConfig,
        logger: Arc<dyn Logger + Send + Sync>,
        device_camera: Arc<dyn DeviceCamera + Send + Sync>,
        channel: Arc<dyn StreamingChannel + Send + Sync>,
    ) -> Self {
        Self {
            scheduler_config,
            logger: logger.with_namespace("session"),
            device_camera,
            channel,
            sequence: Arc::new(AtomicU64::new(0)),
            next_session_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            session: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CaptureSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle -> Active. Returns the running session unchanged when already Active.
    pub fn start(&self) -> Result<SessionInfo, CaptureError> {
        let mut session = self.lock();

        if self.closed.load(Ordering::SeqCst) {
            return Err(CaptureError::ResourceUnavailable(
                "client is shutting down".to_string(),
            ));
        }

        if let Some(active) = session.as_ref() {
            let _ = self
                .logger
                .info(&format!("Session {} already active", active.info.id));
            return Ok(active.info.clone());
        }

        let stream = match self.device_camera.acquire() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = self.logger.error(&format!("Camera acquisition failed: {}", e));
                return Err(e);
            }
        };

        let info = SessionInfo {
            id: self.next_session_id.fetch_add(1, Ordering::SeqCst),
            resolution: stream.native_resolution(),
        };

        let mut scheduler = FrameCaptureScheduler::new(
            self.scheduler_config,
            Arc::clone(&self.sequence),
            Arc::clone(&self.logger),
        );
        let channel = Arc::clone(&self.channel);
        scheduler.start(
            Arc::clone(&stream),
            Box::new(move |frame| channel.send(frame)),
        );

        let _ = self.logger.info(&format!(
            "Session {} active at {}x{}",
            info.id, info.resolution.0, info.resolution.1
        ));

        *session = Some(CaptureSession {
            info: info.clone(),
            stream,
            scheduler,
        });
        Ok(info)
    }

    /// Active -> Idle. Returns false when there was nothing to stop.
    pub fn stop(&self) -> bool {
        let mut session = self.lock();

        let Some(mut active) = session.take() else {
            return false;
        };

        active.scheduler.stop();
        active.stream.stop_tracks();

        let _ = self
            .logger
            .info(&format!("Session {} stopped", active.info.id));
        true
    }

    /// Stops the session for good: every later `start` is refused, including
    /// one already waiting on the lock.
    pub fn shutdown(&self) -> bool {
        self.closed.store(true, Ordering::SeqCst);
        self.stop()
    }

    pub fn state(&self) -> SessionState {
        match self.lock().as_ref() {
            Some(_) => SessionState::Active,
            None => SessionState::Idle,
        }
    }

    pub fn session_info(&self) -> Option<SessionInfo> {
        self.lock().as_ref().map(|active| active.info.clone())
    }

    /// Encodes the current frame of the active session outside the tick cadence.
    pub fn snapshot(&self) -> Result<FrameMessage, CaptureError> {
        let session = self.lock();
        let active = session
            .as_ref()
            .ok_or_else(|| CaptureError::ResourceUnavailable("camera is not started".to_string()))?;

        capture_tick(
            active.stream.as_ref(),
            self.scheduler_config.jpeg_quality,
            &self.sequence,
        )?
        .ok_or_else(|| CaptureError::Frame("video is not ready yet".to_string()))
    }
}

impl Drop for CaptureLifecycle {
    fn drop(&mut self) {
        self.stop();
    }
}
