use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

pub const MIN_CAPTURE_INTERVAL: Duration = Duration::from_millis(200);
pub const MAX_CAPTURE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Config {
    pub capture_interval: Duration,
    pub jpeg_quality: u8,
    pub stream_url: String,
    pub analyze_url: String,
    pub predict_url: String,
    pub request_timeout: Duration,
    pub queue_capacity: usize,
    pub tag_frames: bool,
    pub autostart: bool,
    pub logger_timezone: FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_interval: MIN_CAPTURE_INTERVAL,
            jpeg_quality: 80,
            stream_url: "ws://127.0.0.1:5000/ws".to_string(),
            analyze_url: "http://127.0.0.1:5000/analyze".to_string(),
            predict_url: "http://127.0.0.1:5000/predict".to_string(),
            request_timeout: Duration::from_secs(10),
            queue_capacity: 4,
            tag_frames: false,
            autostart: false,
            logger_timezone: Utc.fix(),
        }
    }
}

impl Config {
    pub fn with_capture_interval(mut self, interval: Duration) -> Self {
        self.capture_interval = clamp_capture_interval(interval);
        self
    }
}

/// Keeps the capture period inside the band the service is sized for.
pub fn clamp_capture_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_CAPTURE_INTERVAL, MAX_CAPTURE_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_interval_is_clamped_into_band() {
        assert_eq!(
            clamp_capture_interval(Duration::from_millis(10)),
            MIN_CAPTURE_INTERVAL
        );
        assert_eq!(
            clamp_capture_interval(Duration::from_millis(225)),
            Duration::from_millis(225)
        );
        assert_eq!(
            Config::default()
                .with_capture_interval(Duration::from_secs(2))
                .capture_interval,
            MAX_CAPTURE_INTERVAL
        );
    }
}
