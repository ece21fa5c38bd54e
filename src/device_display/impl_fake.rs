use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use crate::ui_projector::DisplayState;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct ShownFrame {
    pub status: String,
    pub display: DisplayState,
}

pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    history: Arc<Mutex<Vec<ShownFrame>>>,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("display").with_namespace("fake"),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to everything shown so far.
    pub fn history(&self) -> Arc<Mutex<Vec<ShownFrame>>> {
        Arc::clone(&self.history)
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::init()")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info("DeviceDisplayFake::clear()")?;
        Ok(())
    }

    fn show(
        &mut self,
        status: &str,
        display: &DisplayState,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info(&format!(
            "DeviceDisplayFake::show({}, {:?})",
            status, display.message
        ))?;
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ShownFrame {
                status: status.to_string(),
                display: display.clone(),
            });
        Ok(())
    }
}
