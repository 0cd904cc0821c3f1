use std::time::Duration;

use lingproc::{ChatMessage, SamplingOptions, VisionChatter};
use thiserror::Error;

/// Deadline applied to vision-language calls unless configured otherwise.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("generation failed: {0}")]
    Backend(String),
}

/// Run one generation call, giving up after `deadline`.
pub async fn generate_within(
    chatter: &dyn VisionChatter,
    messages: &[ChatMessage],
    options: &SamplingOptions,
    deadline: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(deadline, chatter.generate(messages, options)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(GenerationError::Backend(format!("{e:#}"))),
        Err(_) => Err(GenerationError::Timeout(deadline)),
    }
}
