//! Zero-shot classification by natural language inference.
//!
//! Each candidate label is turned into a hypothesis ("This example is
//! {label}.") and scored against the text as premise. The entailment logits
//! of all candidates are normalized with a softmax, so exactly one label is
//! favoured (single-label mode).

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use crate::{ScoredLabel, SequenceClassifier, ZeroShotClassifier, softmax};

/// Hypothesis template; `{}` is replaced by the candidate label.
pub const HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Zero-shot classifier on top of an NLI [`SequenceClassifier`].
#[derive(Clone)]
pub struct NliZeroShot {
    classifier: SequenceClassifier,
    entailment: usize,
}

impl NliZeroShot {
    /// Wrap an NLI classifier. Fails unless it exposes an `entailment` label.
    pub fn new(classifier: SequenceClassifier) -> Result<Self> {
        let entailment = entailment_index(classifier.labels())
            .context("NLI model has no entailment label")?;
        Ok(Self {
            classifier,
            entailment,
        })
    }
}

/// Hypothesis scored against the text for `label`.
pub fn hypothesis(label: &str) -> String {
    HYPOTHESIS_TEMPLATE.replace("{}", label)
}

/// Position of the entailment label, matched case-insensitively.
pub fn entailment_index(labels: &[String]) -> Option<usize> {
    labels
        .iter()
        .position(|l| l.to_ascii_lowercase().starts_with("entail"))
}

/// Rank `candidates` by the softmax of their entailment logits.
///
/// Candidates with equal scores keep their original order.
pub fn rank_candidates(candidates: &[&str], entailment_logits: &[f32]) -> Vec<ScoredLabel> {
    let scores = softmax(entailment_logits);
    let mut ranked: Vec<ScoredLabel> = candidates
        .iter()
        .zip(scores)
        .map(|(label, score)| ScoredLabel {
            label: (*label).to_string(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[async_trait]
impl ZeroShotClassifier for NliZeroShot {
    async fn rank(&self, text: &str, candidates: &[&str]) -> Result<Vec<ScoredLabel>> {
        let mut entailment = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let logits = self.classifier.pair_logits(text, &hypothesis(candidate)).await?;
            let logit = logits
                .get(self.entailment)
                .copied()
                .ok_or_else(|| anyhow!("NLI output has {} logits", logits.len()))?;
            entailment.push(logit);
        }
        let ranked = rank_candidates(candidates, &entailment);
        debug!(?ranked, "zero-shot ranking");
        Ok(ranked)
    }
}
