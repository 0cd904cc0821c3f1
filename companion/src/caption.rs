use std::sync::Arc;
use std::time::{Duration, Instant};

use lingproc::{ChatMessage, SamplingOptions, VisionChatter};
use tracing::{debug, info, warn};

use crate::generation::{DEFAULT_GENERATION_TIMEOUT, generate_within};
use crate::screenshot::DecodedImage;

/// Caption returned when no vision-language model is loaded.
pub const CAPTION_UNAVAILABLE: &str = "Scene captioning unavailable (Model not loaded).";

/// Instruction sent alongside the screenshot.
pub const CAPTION_INSTRUCTION: &str =
    "Describe what is happening in this image in one short, clear sentence.";

/// Low-variance decoding for factual descriptions.
pub const CAPTION_SAMPLING: SamplingOptions = SamplingOptions {
    max_new_tokens: 150,
    temperature: 0.2,
    top_p: 0.8,
    repetition_penalty: None,
};

/// Cut `text` down to its first sentence, always ending with a period.
///
/// Everything from the first `.` onwards is dropped and a single period is
/// re-appended; text without a period gets one appended.
pub fn first_sentence(text: &str) -> String {
    let text = text.trim();
    match text.split_once('.') {
        Some((head, _)) => format!("{}.", head.trim()),
        None => format!("{text}."),
    }
}

/// Describes screenshots in a single sentence.
#[derive(Clone)]
pub struct SceneCaptioner {
    vision: Option<Arc<dyn VisionChatter>>,
    deadline: Duration,
}

impl SceneCaptioner {
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

    /// Caption `image`.
    ///
    /// Returns [`CAPTION_UNAVAILABLE`] without a model, and an empty string
    /// when there is no image or generation fails.
    pub async fn caption(&self, image: Option<&DecodedImage>) -> String {
        let Some(vision) = &self.vision else {
            return CAPTION_UNAVAILABLE.to_string();
        };
        let Some(image) = image else {
            return String::new();
        };
        let data = match image.to_image_data() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "could not encode image for captioning");
                return String::new();
            }
        };

        debug!("captioning scene");
        let start = Instant::now();
        let messages = [ChatMessage::user(CAPTION_INSTRUCTION).with_image(data)];
        match generate_within(vision.as_ref(), &messages, &CAPTION_SAMPLING, self.deadline).await {
            Ok(text) => {
                let caption = first_sentence(&text);
                info!(elapsed = ?start.elapsed(), %caption, "scene captioned");
                caption
            }
            Err(e) => {
                warn!(error = %e, "scene captioning failed");
                String::new()
            }
        }
    }
}
