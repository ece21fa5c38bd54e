use crate::command::View;
use crate::device_display::interface::DeviceDisplay;
use crate::emotion_client::core::{ChannelStatus, Model, SessionStatus, UploadState};
use crate::ui_projector::{project, DisplayState};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
}

impl Render {
    pub fn new(device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>) -> Self {
        Self { device_display }
    }

    pub fn render(&self, model: &Model) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut device_display = self
            .device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        device_display.show(&status_line(model), &display_state(model))
    }
}

pub fn status_line(model: &Model) -> String {
    let view = match model.view {
        View::LiveCamera => "live",
        View::StaticUpload => "upload",
    };

    let camera = match &model.session {
        SessionStatus::Idle => "idle".to_string(),
        SessionStatus::Starting { .. } => "starting...".to_string(),
        SessionStatus::Active(info) => format!(
            "active #{} {}x{}",
            info.id, info.resolution.0, info.resolution.1
        ),
        SessionStatus::Stopping { .. } => "stopping...".to_string(),
    };

    let channel = match &model.channel {
        ChannelStatus::Connecting => "connecting...".to_string(),
        ChannelStatus::Connected => "connected".to_string(),
        ChannelStatus::Disconnected { reason } => format!("disconnected ({})", reason),
    };

    let mut line = format!("view: {} | camera: {} | channel: {}", view, camera, channel);
    if model.stale_results > 0 {
        line.push_str(&format!(" | late results dropped: {}", model.stale_results));
    }
    if let Some(notice) = &model.notice {
        line.push_str(&format!("\n{}", notice));
    }
    line
}

pub fn display_state(model: &Model) -> DisplayState {
    let mut display = match model.view {
        View::LiveCamera => {
            let mut display = project(model.latest_result.as_ref(), &model.aggregator.snapshot());
            if let Some(image) = &model.snapshot_image {
                display.image = Some(image.clone());
            }
            display
        }
        View::StaticUpload => match &model.upload {
            UploadState::Empty => DisplayState {
                message: "Type `analyze <path|url>` to classify an image".to_string(),
                ..DisplayState::default()
            },
            UploadState::Analyzing(source) => DisplayState {
                message: format!("Analyzing {}...", source),
                ..DisplayState::default()
            },
            UploadState::Done(display) => display.clone(),
            UploadState::Failed(error) => DisplayState {
                message: format!("Error: {}", error),
                ..DisplayState::default()
            },
        },
    };

    display.message = decorate(&display);
    display
}

/// Appends the dominant category's emoji unless the message already has it.
fn decorate(display: &DisplayState) -> String {
    match display.dominant() {
        Some(emotion)
            if !display.message.is_empty() && !display.message.contains(emotion.emoji()) =>
        {
            format!("{} {}", display.message, emotion.emoji())
        }
        _ => display.message.clone(),
    }
}
