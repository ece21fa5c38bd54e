use crate::device_camera::interface::{CaptureError, DeviceCamera, VideoStream};
use crate::library::logger::interface::Logger;
use image::imageops::FilterType;
use image::{GenericImage, RgbImage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Plays a directory of still images back as a camera feed, one image per
/// frame, looping.
pub struct DeviceCameraStillImages {
    dir: PathBuf,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DeviceCameraStillImages {
    pub fn new(dir: impl Into<PathBuf>, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            dir: dir.into(),
            logger: logger.with_namespace("camera").with_namespace("still_images"),
        }
    }

    fn list_frames(&self) -> Result<Vec<PathBuf>, CaptureError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| map_io_error(&self.dir, e))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_image(path))
            .collect();
        frames.sort();
        Ok(frames)
    }
}

impl DeviceCamera for DeviceCameraStillImages {
    fn acquire(&self) -> Result<Arc<dyn VideoStream>, CaptureError> {
        let _ = self
            .logger
            .info(&format!("Opening {}", self.dir.display()));

        let frames = self.list_frames()?;
        let first = frames.first().ok_or_else(|| {
            CaptureError::ResourceUnavailable(format!(
                "no images in {}",
                self.dir.display()
            ))
        })?;

        let resolution = image::image_dimensions(first)
            .map_err(|e| CaptureError::ResourceUnavailable(format!("{}: {}", first.display(), e)))?;

        let _ = self.logger.info(&format!(
            "Playing {} frames at {}x{}",
            frames.len(),
            resolution.0,
            resolution.1
        ));

        Ok(Arc::new(StillImageStream {
            frames,
            resolution,
            next: AtomicUsize::new(0),
            live: AtomicBool::new(true),
        }))
    }
}

struct StillImageStream {
    frames: Vec<PathBuf>,
    resolution: (u32, u32),
    next: AtomicUsize,
    live: AtomicBool,
}

impl VideoStream for StillImageStream {
    fn has_enough_data(&self) -> bool {
        self.is_live()
    }

    fn native_resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn render_frame(&self, buffer: &mut RgbImage) -> Result<(), CaptureError> {
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.frames.len();
        let path = &self.frames[index];

        let mut frame = image::open(path)
            .map_err(|e| CaptureError::Frame(format!("{}: {}", path.display(), e)))?
            .to_rgb8();

        let (width, height) = (buffer.width(), buffer.height());
        if frame.dimensions() != (width, height) {
            frame = image::imageops::resize(&frame, width, height, FilterType::Triangle);
        }

        buffer
            .copy_from(&frame, 0, 0)
            .map_err(|e| CaptureError::Frame(e.to_string()))
    }

    fn stop_tracks(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn map_io_error(dir: &Path, error: std::io::Error) -> CaptureError {
    let message = format!("{}: {}", dir.display(), error);
    match error.kind() {
        ErrorKind::PermissionDenied => CaptureError::PermissionDenied(message),
        _ => CaptureError::ResourceUnavailable(message),
    }
}
