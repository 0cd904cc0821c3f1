use std::sync::Arc;

use lingproc::{TextScorer, VisionChatter, ZeroShotClassifier};
use serde::Serialize;

/// Models loaded at startup.
///
/// Optional slots left empty stay empty for the life of the process; the
/// stages that depend on them fall back to fixed answers. The intent model
/// is mandatory.
#[derive(Clone)]
pub struct ModelSlots {
    pub emotion: Option<Arc<dyn TextScorer>>,
    pub intent: Arc<dyn ZeroShotClassifier>,
    pub vision: Option<Arc<dyn VisionChatter>>,
}

impl ModelSlots {
    /// Slots holding only the intent model.
    pub fn new(intent: Arc<dyn ZeroShotClassifier>) -> Self {
        Self {
            emotion: None,
            intent,
            vision: None,
        }
    }

    pub fn with_emotion(mut self, scorer: Arc<dyn TextScorer>) -> Self {
        self.emotion = Some(scorer);
        self
    }

    pub fn with_vision(mut self, chatter: Arc<dyn VisionChatter>) -> Self {
        self.vision = Some(chatter);
        self
    }

    pub fn status(&self) -> SlotStatus {
        SlotStatus {
            emotion: self.emotion.is_some(),
            intent: true,
            vision: self.vision.is_some(),
        }
    }
}

/// Which model slots are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub emotion: bool,
    pub intent: bool,
    pub vision: bool,
}
