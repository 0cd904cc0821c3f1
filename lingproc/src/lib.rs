//! Model backends for the companion pipeline.
//!
//! This crate defines the capability traits the pipeline consumes
//! ([`TextScorer`], [`ZeroShotClassifier`], [`VisionChatter`]) together with
//! the concrete backends: an [`OllamaProvider`] for vision-language chat and a
//! local [`SequenceClassifier`] running on candle, which also powers the
//! entailment-based [`NliZeroShot`] classifier.

pub mod classifier;
pub mod math;
pub mod provider;
pub mod types;
pub mod zero_shot;

pub use crate::classifier::*;
pub use crate::math::*;
pub use crate::provider::*;
pub use crate::types::*;
pub use crate::zero_shot::*;
