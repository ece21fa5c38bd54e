use crate::streaming_channel::message::{EncodedImage, ResultMessage};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("{message} (status {status})")]
    Service { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unreadable response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    File(PathBuf),
    Url(String),
}

impl AnalysisSource {
    /// `http(s)://` arguments are remote images, anything else a local path.
    pub fn parse(argument: &str) -> Self {
        let lower = argument.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            AnalysisSource::Url(argument.to_string())
        } else {
            AnalysisSource::File(PathBuf::from(argument))
        }
    }
}

impl fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisSource::File(path) => write!(f, "{}", path.display()),
            AnalysisSource::Url(url) => f.write_str(url),
        }
    }
}

/// One-shot request/response calls against the analysis service.
pub trait AnalysisClient: Send + Sync {
    fn analyze(&self, source: &AnalysisSource) -> Result<ResultMessage, AnalysisError>;

    /// The older endpoint: returns the annotated image and nothing else.
    fn annotate(&self, image: &EncodedImage) -> Result<EncodedImage, AnalysisError>;
}
