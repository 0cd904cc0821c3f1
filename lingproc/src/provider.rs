//! Vision-language chat backed by an Ollama server.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage as OllamaMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::images::Image;
use ollama_rs::models::ModelOptions;
use tracing::debug;

use crate::{ChatMessage, Role, SamplingOptions, VisionChatter};

/// [`VisionChatter`] talking to a single model on an Ollama server.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
}

impl OllamaProvider {
    /// Create a provider for `model` served at `host`, e.g. `http://localhost:11434`.
    pub fn new(host: &str, model: &str) -> Result<Self> {
        let client =
            Ollama::try_new(host).map_err(|e| anyhow!("invalid Ollama url {host}: {e}"))?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    /// Name of the model this provider generates with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Retrieve the list of installed model names.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| anyhow!("{e}"))
            .context("failed to query models from server")?;
        Ok(models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the configured model is installed on the server.
    ///
    /// A model name without a tag matches the `:latest` tag.
    pub async fn has_model(&self) -> Result<bool> {
        let wanted = with_default_tag(&self.model);
        Ok(self
            .list_models()
            .await?
            .iter()
            .any(|name| with_default_tag(name) == wanted))
    }
}

fn with_default_tag(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{name}:latest")
    }
}

fn to_ollama(message: &ChatMessage) -> OllamaMessage {
    let content = message.content.clone();
    let converted = match message.role {
        Role::System => OllamaMessage::system(content),
        Role::User => OllamaMessage::user(content),
    };
    if message.images.is_empty() {
        converted
    } else {
        converted.with_images(
            message
                .images
                .iter()
                .map(|img| Image::from_base64(img.base64.as_str()))
                .collect(),
        )
    }
}

fn model_options(options: &SamplingOptions) -> ModelOptions {
    let opts = ModelOptions::default()
        .num_predict(options.max_new_tokens as i32)
        .temperature(options.temperature)
        .top_p(options.top_p);
    match options.repetition_penalty {
        Some(penalty) => opts.repeat_penalty(penalty),
        None => opts,
    }
}

#[async_trait]
impl VisionChatter for OllamaProvider {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &SamplingOptions,
    ) -> Result<String> {
        let images: usize = messages.iter().map(|m| m.images.len()).sum();
        debug!(model = %self.model, messages = messages.len(), images, "ollama chat request");
        let request = ChatMessageRequest::new(
            self.model.clone(),
            messages.iter().map(to_ollama).collect(),
        )
        .options(model_options(options));
        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| anyhow!("ollama chat failed: {e}"))?;
        Ok(response.message.content.trim().to_string())
    }
}
