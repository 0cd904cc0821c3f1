//! Startup model loading.
//!
//! Each model gets exactly one load attempt. The emotion classifier and the
//! vision-language model are optional: a failure is logged and the slot is
//! left empty. The intent model is required.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use companion::{Emotion, ModelSlots};
use lingproc::{
    Device, NliZeroShot, OllamaProvider, SequenceClassifier, TextScorer, TruncationStrategy,
    VisionChatter, ZeroShotClassifier, parse_labels, select_device,
};
use tracing::{info, warn};

use crate::config::Config;

/// Token limit for emotion inputs.
pub const EMOTION_MAX_TOKENS: usize = 64;
/// Token limit for premise/hypothesis pairs.
pub const INTENT_MAX_TOKENS: usize = 512;

/// Load every model named in `config`.
pub async fn load_slots(config: &Config) -> Result<ModelSlots> {
    let device = select_device(config.cpu);
    info!(?device, "inference device selected");

    let intent = load_intent(config, &device).context("intent model is required")?;
    let emotion = load_emotion(config, &device);
    let vision = load_vision(config).await;
    let slots = fill_slots(Arc::new(intent), emotion, vision);
    info!(status = ?slots.status(), "models loaded");
    Ok(slots)
}

/// Build the slots from one load attempt per optional model.
///
/// A failed attempt is logged and leaves its slot empty.
pub fn fill_slots(
    intent: Arc<dyn ZeroShotClassifier>,
    emotion: Result<Arc<dyn TextScorer>>,
    vision: Result<Arc<dyn VisionChatter>>,
) -> ModelSlots {
    let mut slots = ModelSlots::new(intent);
    match emotion {
        Ok(scorer) => slots = slots.with_emotion(scorer),
        Err(e) => warn!(error = %format!("{e:#}"), "emotion model unavailable, emotions default to neutral"),
    }
    match vision {
        Ok(chatter) => slots = slots.with_vision(chatter),
        Err(e) => warn!(error = %format!("{e:#}"), "vision model unavailable, captions and replies are disabled"),
    }
    slots
}

/// Fail unless `labels` are the emotion taxonomy in order.
pub fn check_emotion_labels(labels: &[String]) -> Result<()> {
    let expected: Vec<&str> = Emotion::ALL.iter().map(Emotion::as_str).collect();
    if labels != expected.as_slice() {
        bail!("emotion model labels {labels:?} do not match {expected:?}");
    }
    Ok(())
}

pub fn load_emotion(config: &Config, device: &Device) -> Result<Arc<dyn TextScorer>> {
    let Some(dir) = config.model_path(&config.emotion_model) else {
        bail!("no emotion model at {}", config.emotion_model.display());
    };
    let config_path = dir.join("config.json");
    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    check_emotion_labels(&parse_labels(&raw)?)?;
    let classifier =
        SequenceClassifier::load(&dir, EMOTION_MAX_TOKENS, TruncationStrategy::LongestFirst, device)?;
    Ok(Arc::new(classifier))
}

pub fn load_intent(config: &Config, device: &Device) -> Result<NliZeroShot> {
    let Some(dir) = config.model_path(&config.intent_model) else {
        bail!("no intent model at {}", config.intent_model.display());
    };
    let classifier =
        SequenceClassifier::load(&dir, INTENT_MAX_TOKENS, TruncationStrategy::OnlyFirst, device)?;
    NliZeroShot::new(classifier)
}

pub async fn load_vision(config: &Config) -> Result<Arc<dyn VisionChatter>> {
    let provider = OllamaProvider::new(&config.ollama_url, &config.vision_model)?;
    if !provider.has_model().await? {
        bail!(
            "model {} is not installed on {}",
            config.vision_model,
            config.ollama_url
        );
    }
    info!(model = %config.vision_model, url = %config.ollama_url, "vision model available");
    Ok(Arc::new(provider))
}
