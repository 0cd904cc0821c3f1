use anyhow::Result;
use async_trait::async_trait;

/// Encoded image handed to a vision-language model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub mime: String,
    pub base64: String,
}

/// Speaker roles for a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// Message in a chat exchange, optionally carrying images.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub images: Vec<ImageData>,
}

impl ChatMessage {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Attach an image to this message.
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.images.push(image);
        self
    }
}

/// Decoding parameters for a single generation call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingOptions {
    /// Upper bound on newly generated tokens.
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: Option<f32>,
}

/// Candidate label paired with its score.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f32,
}

/// Produces one raw score per label of a fixed taxonomy.
#[async_trait]
pub trait TextScorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<Vec<f32>>;
}

/// Classifies text against labels supplied at call time.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Return every candidate ordered by descending score.
    async fn rank(&self, text: &str, candidates: &[&str]) -> Result<Vec<ScoredLabel>>;
}

/// Generates text conditioned on a conversation that may include images.
///
/// Implementations return only the newly generated text, never an echo of
/// the prompt.
#[async_trait]
pub trait VisionChatter: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage], options: &SamplingOptions)
    -> Result<String>;
}
