use crate::ui_projector::DisplayState;
use std::error::Error;

/// Rendering sink. Receives a status line and the projected display state on
/// every refresh; it never feeds anything back into the core.
pub trait DeviceDisplay: Send + Sync {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn show(
        &mut self,
        status: &str,
        display: &DisplayState,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
