//! Request orchestration.
//!
//! A request flows through the stages in a fixed order: emotion, intent,
//! then (unless the player is making small talk) scene captioning, and
//! finally the reply. Small talk skips the captioner entirely and withholds
//! the screenshot from the reply.

use std::time::{Duration, Instant};

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::caption::SceneCaptioner;
use crate::emotion::{Emotion, EmotionClassifier};
use crate::intent::{Intent, IntentClassifier};
use crate::reply::ReplyGenerator;
use crate::screenshot;
use crate::slots::{ModelSlots, SlotStatus};

/// Text assumed when the player sent nothing.
pub const DEFAULT_USER_TEXT: &str = "Hello";

/// Body of a prediction request. Every field is optional.
///
/// A field holding something other than a string reads as absent without
/// affecting the others.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub user_text: Option<String>,
    /// Base64 screenshot.
    #[serde(deserialize_with = "lenient_string")]
    pub image: Option<String>,
    /// Accepted for forward compatibility; not used by any stage.
    #[serde(deserialize_with = "lenient_string")]
    pub scene_state: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Other(serde::de::IgnoredAny),
    }
    Ok(match Field::deserialize(deserializer)? {
        Field::Text(text) => Some(text),
        Field::Other(_) => None,
    })
}

impl InferenceRequest {
    pub fn new(user_text: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            user_text: Some(user_text.into()),
            image: Some(image.into()),
            scene_state: None,
        }
    }
}

/// Everything the caller sees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub emotion: Emotion,
    pub intent: Intent,
    pub caption: String,
    pub reply: String,
    /// Length of the still-encoded image field.
    pub received_image_bytes: usize,
}

/// The four model stages wired together.
#[derive(Clone)]
pub struct Pipeline {
    emotion: EmotionClassifier,
    intent: IntentClassifier,
    captioner: SceneCaptioner,
    replier: ReplyGenerator,
    status: SlotStatus,
}

impl Pipeline {
    pub fn new(slots: ModelSlots) -> Self {
        let status = slots.status();
        Self {
            emotion: EmotionClassifier::new(slots.emotion),
            intent: IntentClassifier::new(slots.intent),
            captioner: SceneCaptioner::new(slots.vision.clone()),
            replier: ReplyGenerator::new(slots.vision),
            status,
        }
    }

    /// Bound every vision-language call by `deadline`.
    pub fn with_generation_timeout(mut self, deadline: Duration) -> Self {
        self.captioner = self.captioner.with_deadline(deadline);
        self.replier = self.replier.with_deadline(deadline);
        self
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    /// Run all stages for one request.
    ///
    /// Only the intent classifier can fail; every other stage degrades to a
    /// fixed value.
    pub async fn run(&self, request: InferenceRequest) -> Result<InferenceResult> {
        let start = Instant::now();
        let text = match request.user_text.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_USER_TEXT.to_string(),
        };
        let raw_image = request.image.unwrap_or_default();
        if request.scene_state.is_some() {
            debug!("scene state supplied, ignoring");
        }

        let emotion = self.emotion.classify(&text).await;
        let intent = self.intent.classify(&text).await?;

        let (caption, reply) = match intent {
            Intent::Smalltalk => {
                let reply = self.replier.generate(emotion, &text, None).await;
                (String::new(), reply)
            }
            Intent::AskWhereAmI
            | Intent::AskWhatIsThis
            | Intent::AskForHelp
            | Intent::AskAboutEnvironment => {
                let decoded = screenshot::decode(&raw_image);
                let caption = if raw_image.is_empty() {
                    String::new()
                } else {
                    self.captioner.caption(decoded.as_ref()).await
                };
                let reply = self.replier.generate(emotion, &text, decoded.as_ref()).await;
                (caption, reply)
            }
        };

        let result = InferenceResult {
            emotion,
            intent,
            caption,
            reply,
            received_image_bytes: raw_image.chars().count(),
        };
        info!(
            elapsed = ?start.elapsed(),
            %emotion,
            %intent,
            image_bytes = result.received_image_bytes,
            "request processed"
        );
        Ok(result)
    }
}
