use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use lingproc::ZeroShotClassifier;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the player is trying to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "PLAYER_SMALLTALK")]
    Smalltalk,
    #[serde(rename = "PLAYER_ASK_WHERE_AM_I")]
    AskWhereAmI,
    #[serde(rename = "PLAYER_ASK_WHAT_IS_THIS")]
    AskWhatIsThis,
    #[serde(rename = "PLAYER_ASK_FOR_HELP")]
    AskForHelp,
    #[serde(rename = "PLAYER_ASK_ABOUT_ENVIRONMENT")]
    AskAboutEnvironment,
}

impl Intent {
    /// Candidate set in the order it is offered to the classifier.
    pub const ALL: [Intent; 5] = [
        Intent::Smalltalk,
        Intent::AskWhereAmI,
        Intent::AskWhatIsThis,
        Intent::AskForHelp,
        Intent::AskAboutEnvironment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Smalltalk => "PLAYER_SMALLTALK",
            Intent::AskWhereAmI => "PLAYER_ASK_WHERE_AM_I",
            Intent::AskWhatIsThis => "PLAYER_ASK_WHAT_IS_THIS",
            Intent::AskForHelp => "PLAYER_ASK_FOR_HELP",
            Intent::AskAboutEnvironment => "PLAYER_ASK_ABOUT_ENVIRONMENT",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == label)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-shot intent classification. There is no fallback: scorer errors
/// propagate to the caller.
#[derive(Clone)]
pub struct IntentClassifier {
    zero_shot: Arc<dyn ZeroShotClassifier>,
}

impl IntentClassifier {
    pub fn new(zero_shot: Arc<dyn ZeroShotClassifier>) -> Self {
        Self { zero_shot }
    }

    pub async fn classify(&self, text: &str) -> Result<Intent> {
        let candidates: Vec<&str> = Intent::ALL.iter().map(Intent::as_str).collect();
        let ranked = self.zero_shot.rank(text, &candidates).await?;
        let top = ranked
            .first()
            .context("zero-shot classifier returned no candidates")?;
        let intent = Intent::from_label(&top.label)
            .with_context(|| format!("zero-shot classifier returned unknown label {:?}", top.label))?;
        debug!(%intent, score = top.score, "intent classified");
        Ok(intent)
    }
}
