//! VERA's inference pipeline.
//!
//! Turns a player's message and optional screenshot into an emotion, an
//! intent, a scene caption and a short companion reply. Each stage is a
//! total function over its input: missing models and bad images degrade to
//! fixed values instead of failing the request.

pub mod caption;
pub mod emotion;
pub mod generation;
pub mod intent;
pub mod pipeline;
pub mod reply;
pub mod screenshot;
pub mod slots;

pub use caption::{CAPTION_UNAVAILABLE, SceneCaptioner, first_sentence};
pub use emotion::{Emotion, EmotionClassifier, tone_for_label};
pub use generation::{DEFAULT_GENERATION_TIMEOUT, GenerationError, generate_within};
pub use intent::{Intent, IntentClassifier};
pub use pipeline::{DEFAULT_USER_TEXT, InferenceRequest, InferenceResult, Pipeline};
pub use reply::{OFFLINE_REPLY, ReplyGenerator, TIMEOUT_REPLY};
pub use screenshot::{DecodedImage, decode};
pub use slots::{ModelSlots, SlotStatus};
