use crate::result_aggregator::{Emotion, EmotionHistogram};
use crate::streaming_channel::message::{EncodedImage, ResultMessage};

/// Everything a display needs for one refresh. Always derived, never edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub image: Option<EncodedImage>,
    pub message: String,
    pub histogram: EmotionHistogram,
}

impl DisplayState {
    /// Chart data vector in `Emotion::ALL` order.
    pub fn chart_data(&self) -> Vec<f64> {
        self.histogram.to_vec()
    }

    pub fn dominant(&self) -> Option<Emotion> {
        self.histogram.dominant()
    }
}

pub fn project(latest: Option<&ResultMessage>, histogram: &EmotionHistogram) -> DisplayState {
    match latest {
        Some(result) => DisplayState {
            image: result.display_image.clone(),
            message: result.message.clone(),
            histogram: histogram.clone(),
        },
        None => DisplayState {
            image: None,
            message: String::new(),
            histogram: histogram.clone(),
        },
    }
}
