//! Cultural-sensitivity classification for new submissions.
//!
//! Default: `KeywordClassifier` (pure-Rust, fast, deterministic, fully
//! testable). `AppState` holds an `Arc<dyn SensitivityClassifier>` so an ML
//! backend can be swapped in without touching handlers.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::content::SensitivityLevel;

/// The classifier trait. Implement this to swap backends without touching
/// the endpoint, handler, or caller code.
#[async_trait]
pub trait SensitivityClassifier: Send + Sync {
    async fn classify(&self, title: &str, body: &str) -> Result<SensitivityLevel, AppError>;
}

/// Terms that mark content as requiring the strictest cultural protocol.
const HIGH_SENSITIVITY_TERMS: &[&str] = &[
    "ceremony",
    "ceremonial",
    "sacred",
    "sorry business",
    "initiation",
    "men's business",
    "women's business",
    "burial",
    "ancestral remains",
];

/// Terms that suggest traditional or community knowledge worth a closer look.
const MEDIUM_SENSITIVITY_TERMS: &[&str] = &[
    "traditional",
    "elder",
    "ancestor",
    "dreaming",
    "kinship",
    "totem",
    "language group",
    "healing",
    "lore",
];

/// Keyword-based classifier: scans title and body for protocol terms.
/// High-sensitivity matches win over medium; no match means low.
pub struct KeywordClassifier;

#[async_trait]
impl SensitivityClassifier for KeywordClassifier {
    async fn classify(&self, title: &str, body: &str) -> Result<SensitivityLevel, AppError> {
        Ok(classify_text(title, body))
    }
}

fn classify_text(title: &str, body: &str) -> SensitivityLevel {
    let haystack = format!("{} {}", title.to_lowercase(), body.to_lowercase());

    if HIGH_SENSITIVITY_TERMS.iter().any(|t| haystack.contains(t)) {
        return SensitivityLevel::High;
    }
    if MEDIUM_SENSITIVITY_TERMS.iter().any(|t| haystack.contains(t)) {
        return SensitivityLevel::Medium;
    }
    SensitivityLevel::Low
}
