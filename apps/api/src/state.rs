use std::sync::Arc;

use crate::persistence::PersistenceSink;
use crate::recommendation::engine::RecommendationEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Classifier and career table, behind `Arc`s inside the engine.
    pub engine: RecommendationEngine,
    /// Audit log sink. Default: PgSink, or MemorySink without DATABASE_URL.
    pub sink: Arc<dyn PersistenceSink>,
}
