use crate::analysis_client::interface::{AnalysisClient, AnalysisError, AnalysisSource};
use crate::library::logger::interface::Logger;
use crate::streaming_channel::message::{EncodedImage, ResultMessage};
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpAnalysisConfig {
    pub analyze_url: String,
    pub predict_url: String,
    pub timeout: Duration,
}

pub struct AnalysisClientHttp {
    config: HttpAnalysisConfig,
    agent: ureq::Agent,
    logger: Arc<dyn Logger + Send + Sync>,
}

#[derive(Deserialize)]
struct AnnotatedImage {
    image: EncodedImage,
}

impl AnalysisClientHttp {
    pub fn new(config: HttpAnalysisConfig, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            config,
            agent,
            logger: logger.with_namespace("analysis").with_namespace("http"),
        }
    }

    fn upload_file(&self, path: &Path, bytes: &[u8]) -> Result<ureq::Response, ureq::Error> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .replace('"', "_");
        let boundary = format!("----emotion-stream-{:016x}", rand::rng().random::<u64>());
        let body = multipart_file(&boundary, &filename, mime_for(path), bytes);

        self.agent
            .post(&self.config.analyze_url)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={}", boundary),
            )
            .send_bytes(&body)
    }
}

impl AnalysisClient for AnalysisClientHttp {
    fn analyze(&self, source: &AnalysisSource) -> Result<ResultMessage, AnalysisError> {
        let _ = self.logger.info(&format!("Analyzing {}", source));

        let response = match source {
            AnalysisSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    AnalysisError::InvalidInput(format!("{}: {}", path.display(), e))
                })?;
                self.upload_file(path, &bytes)
            }
            AnalysisSource::Url(url) => self
                .agent
                .post(&self.config.analyze_url)
                .send_form(&[("url", url.as_str())]),
        };

        let body = read_json(response)?;
        if let Some(error) = body.get("error").and_then(|error| error.as_str()) {
            return Err(AnalysisError::Service {
                status: 200,
                message: error.to_string(),
            });
        }
        serde_json::from_value(body).map_err(|e| AnalysisError::Decode(e.to_string()))
    }

    fn annotate(&self, image: &EncodedImage) -> Result<EncodedImage, AnalysisError> {
        let _ = self.logger.info("Sending snapshot to the legacy endpoint");

        let response = self
            .agent
            .post(&self.config.predict_url)
            .send_json(serde_json::json!({ "image": image.as_data_uri() }));

        let body: AnnotatedImage = serde_json::from_value(read_json(response)?)
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;
        Ok(body.image)
    }
}

fn read_json(
    response: Result<ureq::Response, ureq::Error>,
) -> Result<serde_json::Value, AnalysisError> {
    match response {
        Ok(response) => response
            .into_json()
            .map_err(|e| AnalysisError::Decode(e.to_string())),
        Err(ureq::Error::Status(status, response)) => {
            let message = response
                .into_json::<serde_json::Value>()
                .ok()
                .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| format!("HTTP {}", status));
            Err(AnalysisError::Service { status, message })
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(AnalysisError::Transport(transport.to_string()))
        }
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn multipart_file(boundary: &str, filename: &str, mime: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            boundary, filename, mime
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
