use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

/// Command line and environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "VERA companion inference server")]
pub struct Config {
    /// Address to bind the HTTP server
    #[arg(long, env = "VERA_ADDR", default_value = "0.0.0.0:8000")]
    pub addr: String,

    /// Directory searched for local model checkpoints
    #[arg(long, env = "VERA_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// Emotion classifier checkpoint (a directory)
    #[arg(long, env = "VERA_EMOTION_MODEL", default_value = "emotion")]
    pub emotion_model: PathBuf,

    /// NLI checkpoint used for zero-shot intent classification
    #[arg(long, env = "VERA_INTENT_MODEL", default_value = "intent")]
    pub intent_model: PathBuf,

    /// Base URL of the Ollama server
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Vision-language model served by Ollama
    #[arg(long, env = "VERA_VISION_MODEL", default_value = "qwen2.5vl:3b")]
    pub vision_model: String,

    /// Seconds before a generation call is abandoned
    #[arg(long, env = "VERA_GENERATION_TIMEOUT", default_value_t = 120)]
    pub generation_timeout: u64,

    /// Run the local classifiers on the CPU even if a GPU is available
    #[arg(long, env = "VERA_CPU")]
    pub cpu: bool,
}

impl Config {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout)
    }

    /// Resolve a model path: as given first, then inside the models directory.
    pub fn model_path(&self, name: &Path) -> Option<PathBuf> {
        if name.exists() {
            return Some(name.to_path_buf());
        }
        let candidate = self.models_dir.join(name);
        candidate.exists().then_some(candidate)
    }
}
