use std::sync::Arc;

use crate::careers::generator::QuestionModel;
use crate::careers::store::CareerStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres-backed in production, in-memory in tests.
    pub store: Arc<dyn CareerStore>,
    pub question_model: Arc<dyn QuestionModel>,
}
