//! Local transformer sequence classifiers.
//!
//! A [`SequenceClassifier`] loads a RoBERTa-family checkpoint
//! (`config.json`, `tokenizer.json` and weights) from a directory and returns
//! raw logits, one per label listed in the checkpoint's `id2label` table.
//! Inference is CPU/GPU bound, so the async entry points move the work onto
//! the blocking thread pool.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use candle_core::{DType, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config, XLMRobertaForSequenceClassification};
use serde::Deserialize;
use tokenizers::{EncodeInput, PaddingParams, Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::TextScorer;

pub use candle_core::Device;
pub use tokenizers::TruncationStrategy;

/// Choose the inference device, preferring CUDA unless `force_cpu` is set.
pub fn select_device(force_cpu: bool) -> Device {
    if force_cpu {
        return Device::Cpu;
    }
    Device::cuda_if_available(0).unwrap_or(Device::Cpu)
}

#[derive(Deserialize)]
struct LabelTable {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Parse the `id2label` table of a model config into index order.
pub fn parse_labels(config_json: &str) -> Result<Vec<String>> {
    let table: LabelTable = serde_json::from_str(config_json).context("parsing label table")?;
    if table.id2label.is_empty() {
        bail!("model config has no id2label table");
    }
    let mut indexed = Vec::with_capacity(table.id2label.len());
    for (id, label) in table.id2label {
        let id: usize = id
            .parse()
            .with_context(|| format!("label id {id:?} is not an index"))?;
        indexed.push((id, label));
    }
    indexed.sort_by_key(|(id, _)| *id);
    for (expected, (id, _)) in indexed.iter().enumerate() {
        if *id != expected {
            bail!("label ids are not contiguous: missing {expected}");
        }
    }
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

struct Inner {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    labels: Vec<String>,
}

impl Inner {
    fn logits<'s>(&self, input: impl Into<EncodeInput<'s>>) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(input, true)
            .map_err(|e| anyhow!("tokenization failed: {e}"))?;
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;
        let logits = logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?;
        debug!(tokens = encoding.get_ids().len(), ?logits, "sequence classified");
        Ok(logits)
    }
}

/// Transformer encoder with a sequence classification head.
#[derive(Clone)]
pub struct SequenceClassifier {
    inner: Arc<Inner>,
}

impl SequenceClassifier {
    /// Load a checkpoint from `dir`, truncating inputs to `max_length` tokens.
    ///
    /// Use [`TruncationStrategy::OnlyFirst`] for premise/hypothesis pairs so
    /// only the premise is shortened.
    pub fn load(
        dir: &Path,
        max_length: usize,
        strategy: TruncationStrategy,
        device: &Device,
    ) -> Result<Self> {
        let config_path = dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&raw).context("parsing model config")?;
        let labels = parse_labels(&raw)?;

        let tokenizer_path = dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("loading {}: {e}", tokenizer_path.display()))?;
        configure_tokenizer(&mut tokenizer, max_length, strategy)?;

        let vb = weights(dir, device)?;
        let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)
            .context("building classifier")?;
        info!(dir = %dir.display(), ?labels, max_length, ?strategy, "sequence classifier loaded");
        Ok(Self {
            inner: Arc::new(Inner {
                model,
                tokenizer,
                device: device.clone(),
                labels,
            }),
        })
    }

    /// Labels in logit order.
    pub fn labels(&self) -> &[String] {
        &self.inner.labels
    }

    /// Logits for a single text.
    pub async fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let inner = self.inner.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || inner.logits(text.as_str())).await?
    }

    /// Logits for a text pair, e.g. premise and hypothesis.
    pub async fn pair_logits(&self, first: &str, second: &str) -> Result<Vec<f32>> {
        let inner = self.inner.clone();
        let first = first.to_string();
        let second = second.to_string();
        tokio::task::spawn_blocking(move || inner.logits((first.as_str(), second.as_str())))
            .await?
    }
}

fn configure_tokenizer(
    tokenizer: &mut Tokenizer,
    max_length: usize,
    strategy: TruncationStrategy,
) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            strategy,
            ..Default::default()
        }))
        .map_err(|e| anyhow!("configuring truncation: {e}"))?;
    tokenizer.with_padding(Some(PaddingParams::default()));
    Ok(())
}

fn weights(dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file must not change while it is mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? };
        return Ok(vb);
    }
    let pth = dir.join("pytorch_model.bin");
    if pth.exists() {
        return Ok(VarBuilder::from_pth(&pth, DType::F32, device)?);
    }
    bail!("no model.safetensors or pytorch_model.bin in {}", dir.display())
}

#[async_trait]
impl TextScorer for SequenceClassifier {
    async fn score(&self, text: &str) -> Result<Vec<f32>> {
        self.logits(text).await
    }
}
