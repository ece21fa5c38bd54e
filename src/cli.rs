use crate::config::Config;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraBackend {
    Fake,
    Stills(PathBuf),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBackend {
    Fake,
    Websocket,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisBackend {
    Fake,
    Http,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayBackend {
    Console,
    Gui,
}

/// Streams camera frames to an emotion classifier and shows the results.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Frame source: `fake` or `stills:<dir>` (a directory of jpg/png files).
    #[arg(long, env = "EMOTION_CAMERA", default_value = "fake", value_parser = parse_camera)]
    pub camera: CameraBackend,

    #[arg(long, env = "EMOTION_CHANNEL", value_enum, default_value_t = ChannelBackend::Fake)]
    pub channel: ChannelBackend,

    #[arg(long, env = "EMOTION_ANALYSIS", value_enum, default_value_t = AnalysisBackend::Fake)]
    pub analysis: AnalysisBackend,

    #[arg(long, value_enum, default_value_t = DisplayBackend::Console)]
    pub display: DisplayBackend,

    /// Streaming endpoint.
    #[arg(long, env = "EMOTION_STREAM_URL")]
    pub stream_url: Option<String>,

    /// One-shot analysis endpoint.
    #[arg(long, env = "EMOTION_ANALYZE_URL")]
    pub analyze_url: Option<String>,

    /// Legacy snapshot endpoint.
    #[arg(long, env = "EMOTION_PREDICT_URL")]
    pub predict_url: Option<String>,

    /// Capture period in milliseconds, clamped to 200..=250.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Outbound frames buffered before new ones are dropped.
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Send `{ image, seq }` instead of the bare image so late results can be discarded.
    #[arg(long)]
    pub tag_frames: bool,

    /// Start the camera as soon as the client is up.
    #[arg(long)]
    pub autostart: bool,
}

impl Args {
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();

        if let Some(interval_ms) = self.interval_ms {
            config = config.with_capture_interval(Duration::from_millis(interval_ms));
        }
        if let Some(url) = &self.stream_url {
            config.stream_url = url.clone();
        }
        if let Some(url) = &self.analyze_url {
            config.analyze_url = url.clone();
        }
        if let Some(url) = &self.predict_url {
            config.predict_url = url.clone();
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality.clamp(1, 100);
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity.max(1);
        }
        config.tag_frames = self.tag_frames;
        config.autostart = self.autostart;

        config
    }
}

fn parse_camera(value: &str) -> Result<CameraBackend, String> {
    match value.split_once(':') {
        None if value == "fake" => Ok(CameraBackend::Fake),
        Some(("stills", dir)) if !dir.is_empty() => Ok(CameraBackend::Stills(PathBuf::from(dir))),
        _ => Err(format!("expected `fake` or `stills:<dir>`, got `{}`", value)),
    }
}
