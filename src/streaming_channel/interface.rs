use crate::streaming_channel::message::{FrameMessage, ResultMessage};
use std::sync::mpsc::Receiver;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected { reason: String },
    Result(ResultMessage),
}

/// Process-wide duplex connection to the classification service. Outlives
/// any capture session.
pub trait StreamingChannel: Send + Sync {
    fn connect(&self) -> Result<(), ChannelError>;

    /// Fire-and-forget. A frame the transport cannot take right now is dropped.
    fn send(&self, frame: FrameMessage);

    /// Every call registers a new subscriber. Results arrive in transport
    /// order, which need not match send order.
    fn events(&self) -> Receiver<ChannelEvent>;
}
