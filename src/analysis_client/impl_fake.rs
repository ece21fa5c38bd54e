use crate::analysis_client::interface::{AnalysisClient, AnalysisError, AnalysisSource};
use crate::library::logger::interface::Logger;
use crate::result_aggregator::Emotion;
use crate::streaming_channel::message::{EncodedImage, ResultMessage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Answers every call with a fixed verdict, or with a scripted failure.
pub struct AnalysisClientFake {
    logger: Arc<dyn Logger + Send + Sync>,
    verdict: Emotion,
    failure: Mutex<Option<AnalysisError>>,
    calls: AtomicUsize,
}

impl AnalysisClientFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("analysis").with_namespace("fake"),
            verdict: Emotion::Happy,
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_with(&self, error: AnalysisError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AnalysisClient for AnalysisClientFake {
    fn analyze(&self, source: &AnalysisSource) -> Result<ResultMessage, AnalysisError> {
        let _ = self.logger.info(&format!("Analyzing {}", source));
        self.check_failure()?;

        let display_image = match source {
            AnalysisSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    AnalysisError::InvalidInput(format!("{}: {}", path.display(), e))
                })?;
                Some(EncodedImage::jpeg(&bytes))
            }
            AnalysisSource::Url(_) => None,
        };

        Ok(ResultMessage {
            display_image,
            message: format!("Detected {} {}", self.verdict, self.verdict.emoji()),
            category_values: [(self.verdict.label().to_string(), 1.0)]
                .into_iter()
                .collect(),
            seq: None,
        })
    }

    fn annotate(&self, image: &EncodedImage) -> Result<EncodedImage, AnalysisError> {
        let _ = self.logger.info("Annotating snapshot");
        self.check_failure()?;
        Ok(image.clone())
    }
}
