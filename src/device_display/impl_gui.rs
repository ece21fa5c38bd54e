use crate::device_display::interface::DeviceDisplay;
use crate::result_aggregator::Emotion;
use crate::ui_projector::DisplayState;
use eframe::egui;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

const IMAGE_WIDTH: f32 = 360.0;

#[derive(Default)]
struct Screen {
    status: String,
    display: DisplayState,
}

struct DisplayWindow {
    screen: Arc<Mutex<Screen>>,
    texture: Option<(String, egui::TextureHandle)>,
}

impl DisplayWindow {
    /// Re-uploads the result image only when its data URI changed.
    fn refresh_texture(&mut self, ctx: &egui::Context, display: &DisplayState) {
        let Some(image) = &display.image else {
            self.texture = None;
            return;
        };
        if matches!(&self.texture, Some((uri, _)) if uri == image.as_data_uri()) {
            return;
        }

        let decoded = image
            .decode()
            .ok()
            .and_then(|bytes| image::load_from_memory(&bytes).ok())
            .map(|decoded| decoded.to_rgba8());

        self.texture = decoded.map(|rgba| {
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            let handle = ctx.load_texture("result", color_image, egui::TextureOptions::default());
            (image.as_data_uri().to_string(), handle)
        });
    }
}

impl eframe::App for DisplayWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (status, display) = {
            let screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
            (screen.status.clone(), screen.display.clone())
        };
        self.refresh_texture(ctx, &display);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(egui::RichText::new(status).monospace());
            ui.separator();

            ui.heading(display.message.as_str());

            if let Some((_, texture)) = &self.texture {
                let [width, height] = texture.size();
                let scale = IMAGE_WIDTH / width.max(1) as f32;
                let size = egui::vec2(IMAGE_WIDTH, height as f32 * scale);
                ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                    texture.id(),
                    size,
                )));
            }

            ui.add_space(8.0);
            let max = display
                .histogram
                .iter()
                .map(|(_, value)| value)
                .fold(0.0_f64, f64::max);
            for emotion in Emotion::ALL {
                let value = display.histogram.get(emotion);
                let fraction = if max > 0.0 { (value / max) as f32 } else { 0.0 };
                ui.add(
                    egui::ProgressBar::new(fraction)
                        .text(format!("{} {} {:.2}", emotion.emoji(), emotion, value)),
                );
            }
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

pub struct DeviceDisplayGui {
    screen: Arc<Mutex<Screen>>,
}

impl DeviceDisplayGui {
    pub fn new() -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen::default())),
        }
    }
}

impl Default for DeviceDisplayGui {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let screen = self.screen.clone();

        // The window owns its own thread; the event loop keeps running.
        thread::spawn(move || {
            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 640.0]),
                ..Default::default()
            };

            let window = DisplayWindow {
                screen,
                texture: None,
            };

            let _ = eframe::run_native(
                "Emotion stream",
                options,
                Box::new(|_cc| Box::new(window)),
            );
        });

        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        *screen = Screen::default();
        Ok(())
    }

    fn show(
        &mut self,
        status: &str,
        display: &DisplayState,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        screen.status = status.to_string();
        screen.display = display.clone();
        Ok(())
    }
}
