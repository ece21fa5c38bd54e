use image::RgbImage;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("camera unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("frame capture failed: {0}")]
    Frame(String),
}

/// A live video feed handed out by a successful acquisition.
pub trait VideoStream: Send + Sync {
    /// False until the feed can produce a complete frame, and after `stop_tracks`.
    fn has_enough_data(&self) -> bool;

    fn native_resolution(&self) -> (u32, u32);

    /// Draws the current frame into `buffer`, which is sized to `native_resolution`.
    fn render_frame(&self, buffer: &mut RgbImage) -> Result<(), CaptureError>;

    /// Stops every underlying capture track. Idempotent.
    fn stop_tracks(&self);

    fn is_live(&self) -> bool;
}

pub trait DeviceCamera: Send + Sync {
    fn acquire(&self) -> Result<Arc<dyn VideoStream>, CaptureError>;
}
