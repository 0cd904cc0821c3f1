use std::sync::Arc;
use std::time::{Duration, Instant};

use lingproc::{ChatMessage, ImageData, SamplingOptions, VisionChatter};
use tracing::{debug, info, warn};

use crate::emotion::Emotion;
use crate::generation::{DEFAULT_GENERATION_TIMEOUT, GenerationError, generate_within};
use crate::screenshot::DecodedImage;

/// Reply when no vision-language model is loaded.
pub const OFFLINE_REPLY: &str = "I am offline right now. (Model not loaded)";

/// Reply when generation exceeds its deadline.
pub const TIMEOUT_REPLY: &str = "I need a moment to think. (Model timed out)";

/// Text sent when the player said nothing.
pub const EMPTY_TEXT_FALLBACK: &str = "Hello.";

/// Conversational decoding with some variety.
pub const REPLY_SAMPLING: SamplingOptions = SamplingOptions {
    max_new_tokens: 150,
    temperature: 0.4,
    top_p: 0.85,
    repetition_penalty: Some(1.2),
};

/// VERA's persona, grounding rules and scene vocabulary, ending with `tone`.
///
/// The twelve-word limit is a request to the model; replies are not cut.
pub fn system_prompt(tone: &str) -> String {
    format!(
        "You are VERA, an in-game AI companion. \
         Only describe objects that are clearly visible in the screenshot. \
         Pink pill-shaped capsules are friendly NPCs the player can talk to. \
         Gray cylinder shapes are scrap metal used for ship repairs and can be collected. \
         Purple blocks or cubes are platforms the player can stand on as they explore! \
         The green surface is the grass-covered ground. \
         Do not guess or invent anything that is not directly visible. \
         Speak naturally, as if you are guiding the player. \
         Keep your response to one short, friendly sentence under twelve words. \
         Tone: {tone}"
    )
}

/// Build the system and user messages for a reply.
pub fn conversation(emotion: Emotion, text: &str, image: Option<ImageData>) -> Vec<ChatMessage> {
    let text = if text.is_empty() {
        EMPTY_TEXT_FALLBACK
    } else {
        text
    };
    let mut user = ChatMessage::user(text);
    if let Some(image) = image {
        user = user.with_image(image);
    }
    vec![ChatMessage::system(system_prompt(emotion.tone())), user]
}

/// Generates VERA's spoken reply.
#[derive(Clone)]
pub struct ReplyGenerator {
    vision: Option<Arc<dyn VisionChatter>>,
    deadline: Duration,
}

impl ReplyGenerator {
    pub fn new(vision: Option<Arc<dyn VisionChatter>>) -> Self {
        Self {
            vision,
            deadline: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Give up on generation after `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn generate(&self, emotion: Emotion, text: &str, image: Option<&DecodedImage>) -> String {
        let Some(vision) = &self.vision else {
            return OFFLINE_REPLY.to_string();
        };
        let image = image.and_then(|img| match img.to_image_data() {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "could not encode image, replying without it");
                None
            }
        });

        debug!(%emotion, with_image = image.is_some(), "generating reply");
        let start = Instant::now();
        let messages = conversation(emotion, text, image);
        match generate_within(vision.as_ref(), &messages, &REPLY_SAMPLING, self.deadline).await {
            Ok(reply) => {
                info!(elapsed = ?start.elapsed(), "reply generated");
                reply.trim().to_string()
            }
            Err(GenerationError::Timeout(deadline)) => {
                warn!(?deadline, "reply generation timed out");
                TIMEOUT_REPLY.to_string()
            }
            Err(e) => {
                warn!(error = %e, "reply generation failed");
                OFFLINE_REPLY.to_string()
            }
        }
    }
}
