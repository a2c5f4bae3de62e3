use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::moderation::classify::SensitivityClassifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable cultural-sensitivity classifier. Default: KeywordClassifier.
    /// Used at submission time when the submitter does not set a level.
    pub classifier: Arc<dyn SensitivityClassifier>,
}
