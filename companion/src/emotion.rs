use std::fmt;
use std::sync::Arc;

use lingproc::{TextScorer, argmax};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tone used when an emotion label is not recognised.
pub const DEFAULT_TONE: &str = "Stay clear and matter-of-fact.";

/// Emotion detected in the player's message.
///
/// Variant order matches the scoring model's output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Neutral,
    Sadness,
    Surprise,
}

impl Emotion {
    /// Every emotion in scoring order.
    pub const ALL: [Emotion; 7] = [
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Neutral,
        Emotion::Sadness,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Neutral => "neutral",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
        }
    }

    /// Parse a lowercase label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == label)
    }

    /// Directive steering the reply's affect.
    pub fn tone(&self) -> &'static str {
        match self {
            Emotion::Anger => "Sound calm and level-headed.",
            Emotion::Disgust => "Stay neutral and detached.",
            Emotion::Fear => "Speak gently and reassuringly.",
            Emotion::Joy => "Respond warm and upbeat.",
            Emotion::Neutral => DEFAULT_TONE,
            Emotion::Sadness => "Sound supportive yet comforting.",
            Emotion::Surprise => "Keep your tone steady and observant.",
        }
    }

    /// Map model scores to an emotion; the first maximum wins.
    pub fn from_scores(scores: &[f32]) -> Self {
        argmax(scores)
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Emotion::Neutral)
    }
}

/// Tone directive for an arbitrary label, falling back to [`DEFAULT_TONE`].
pub fn tone_for_label(label: &str) -> &'static str {
    Emotion::from_label(label).map_or(DEFAULT_TONE, |e| e.tone())
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies text into an [`Emotion`].
///
/// Without a scorer every text is [`Emotion::Neutral`].
#[derive(Clone)]
pub struct EmotionClassifier {
    scorer: Option<Arc<dyn TextScorer>>,
}

impl EmotionClassifier {
    pub fn new(scorer: Option<Arc<dyn TextScorer>>) -> Self {
        Self { scorer }
    }

    pub fn is_available(&self) -> bool {
        self.scorer.is_some()
    }

    pub async fn classify(&self, text: &str) -> Emotion {
        let Some(scorer) = &self.scorer else {
            return Emotion::Neutral;
        };
        match scorer.score(text).await {
            Ok(scores) => {
                let emotion = Emotion::from_scores(&scores);
                debug!(?scores, %emotion, "emotion classified");
                emotion
            }
            Err(e) => {
                warn!(error = %e, "emotion scoring failed, assuming neutral");
                Emotion::Neutral
            }
        }
    }
}
