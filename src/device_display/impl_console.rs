use crate::device_display::interface::DeviceDisplay;
use crate::ui_projector::DisplayState;
use std::error::Error;
use std::io::Write;

const BAR_WIDTH: usize = 24;

pub struct DeviceDisplayConsole {
    last_frame: Option<String>,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self { last_frame: None }
    }
}

impl Default for DeviceDisplayConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("Commands: start | stop | view live|upload | analyze <path|url> | snap | reconnect | quit");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.last_frame = None;
        Ok(())
    }

    fn show(
        &mut self,
        status: &str,
        display: &DisplayState,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let frame = format_frame(status, display);
        // Unchanged frames are not reprinted.
        if self.last_frame.as_deref() == Some(frame.as_str()) {
            return Ok(());
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;
        self.last_frame = Some(frame);
        Ok(())
    }
}

pub fn format_frame(status: &str, display: &DisplayState) -> String {
    let mut out = String::new();
    out.push_str("┌──────────────────────────────────────────\n");
    out.push_str(&format!("│ {}\n", status));

    if !display.message.is_empty() {
        out.push_str(&format!("│ {}\n", display.message));
    }

    if let Some(image) = &display.image {
        let size = image.decode().map(|bytes| bytes.len()).unwrap_or(0);
        out.push_str(&format!(
            "│ image: {} ({} bytes)\n",
            image.mime().unwrap_or("unknown"),
            size
        ));
    }

    let max = display
        .histogram
        .iter()
        .map(|(_, value)| value)
        .fold(0.0_f64, f64::max);
    let dominant = display.dominant();

    for (emotion, value) in display.histogram.iter() {
        let filled = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let marker = if Some(emotion) == dominant { "◀" } else { "" };
        out.push_str(&format!(
            "│ {:<8} {} {}{} {:>6.2} {}\n",
            emotion.label(),
            emotion.emoji(),
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            value,
            marker
        ));
    }

    out.push_str("└──────────────────────────────────────────\n");
    out
}
