use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum EncodedImageError {
    #[error("not a base64 data URI")]
    NotDataUri,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A compressed still image carried as a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    pub fn jpeg(bytes: &[u8]) -> Self {
        Self::from_bytes("image/jpeg", bytes)
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }

    pub fn mime(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (header, _) = rest.split_once(',')?;
        Some(header.split(';').next().unwrap_or(header))
    }

    /// Raw bytes behind the URI. Only the display sink needs this.
    pub fn decode(&self) -> Result<Vec<u8>, EncodedImageError> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or(EncodedImageError::NotDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(EncodedImageError::NotDataUri)?;
        if !header.ends_with(";base64") {
            return Err(EncodedImageError::NotDataUri);
        }
        Ok(STANDARD.decode(payload)?)
    }
}

/// One captured frame, ready for the channel. Discarded after `send`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMessage {
    pub seq: u64,
    pub image: EncodedImage,
}

impl FrameMessage {
    pub fn to_wire(&self, tag_frames: bool) -> WireMessage {
        let payload = if tag_frames {
            FramePayload::Sequenced {
                image: self.image.clone(),
                seq: self.seq,
            }
        } else {
            FramePayload::Plain(self.image.clone())
        };
        WireMessage::Image(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub display_image: Option<EncodedImage>,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "chart_data", default)]
    pub category_values: BTreeMap<String, f64>,
    /// Echo of the frame `seq`, when the service tags its responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FramePayload {
    Plain(EncodedImage),
    Sequenced { image: EncodedImage, seq: u64 },
}

/// Envelope for everything that crosses the duplex channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WireMessage {
    Image(FramePayload),
    Response(ResultMessage),
}
