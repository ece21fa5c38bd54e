use crate::streaming_channel::message::ResultMessage;
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of categories the classification service reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Surprise,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Angry => "😠",
            Emotion::Disgust => "🤢",
            Emotion::Fear => "😨",
            Emotion::Happy => "😊",
            Emotion::Neutral => "😐",
            Emotion::Sad => "😢",
            Emotion::Surprise => "😮",
        }
    }

    /// Case-insensitive lookup of a category name as sent by the service.
    pub fn from_label(key: &str) -> Option<Emotion> {
        Self::ALL
            .into_iter()
            .find(|emotion| emotion.label().eq_ignore_ascii_case(key))
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Latest known value per category. A snapshot of the most recent result,
/// never a running total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionHistogram {
    values: [f64; Emotion::ALL.len()],
}

impl EmotionHistogram {
    pub fn get(&self, emotion: Emotion) -> f64 {
        self.values[emotion.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL
            .into_iter()
            .map(move |emotion| (emotion, self.get(emotion)))
    }

    /// Chart data vector, in `Emotion::ALL` order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Highest category, if any category is above zero.
    pub fn dominant(&self) -> Option<Emotion> {
        self.iter()
            .filter(|(_, value)| *value > 0.0)
            .fold(None, |best: Option<(Emotion, f64)>, (emotion, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((emotion, value)),
            })
            .map(|(emotion, _)| emotion)
    }

    /// Replace-per-key update. Unknown keys and values that are negative or
    /// not finite leave the histogram untouched. Returns how many entries
    /// were replaced.
    pub fn replace_from(&mut self, category_values: &BTreeMap<String, f64>) -> usize {
        let mut replaced = 0;
        for (key, value) in category_values {
            let Some(emotion) = Emotion::from_label(key) else {
                continue;
            };
            if !value.is_finite() || *value < 0.0 {
                continue;
            }
            self.values[emotion.index()] = *value;
            replaced += 1;
        }
        replaced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { replaced: usize },
    Stale { seq: u64, last_applied: u64 },
}

/// Sole owner of the live histogram. Results tagged with a sequence number
/// older than the last applied one are discarded; untagged results always
/// apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultAggregator {
    histogram: EmotionHistogram,
    last_applied_seq: Option<u64>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, result: &ResultMessage) -> ApplyOutcome {
        if let (Some(seq), Some(last_applied)) = (result.seq, self.last_applied_seq) {
            if seq < last_applied {
                return ApplyOutcome::Stale { seq, last_applied };
            }
        }

        let replaced = self.histogram.replace_from(&result.category_values);

        if let Some(seq) = result.seq {
            self.last_applied_seq = Some(seq);
        }

        ApplyOutcome::Applied { replaced }
    }

    pub fn snapshot(&self) -> EmotionHistogram {
        self.histogram.clone()
    }
}
