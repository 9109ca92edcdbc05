use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_api::classifier::{load_classifier, Classifier};
use career_api::config::Config;
use career_api::persistence::{MemorySink, PersistenceSink, PgSink};
use career_api::recommendation::careers::CareerKnowledgeBase;
use career_api::recommendation::engine::RecommendationEngine;
use career_api::routes::build_router;
use career_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("career_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Career table: embedded unless overridden
    let careers = match &config.career_kb_path {
        Some(path) => CareerKnowledgeBase::from_path(path)?,
        None => CareerKnowledgeBase::embedded()?,
    };
    info!("Career table: {} careers", careers.len());

    // Trained classifier (run `train-model` to produce it)
    let classifier = load_classifier(&config.model_path)?;
    if classifier.n_classes() != careers.len() {
        bail!(
            "model predicts {} classes but the career table has {}",
            classifier.n_classes(),
            careers.len()
        );
    }

    let engine = RecommendationEngine::new(Arc::new(classifier), Arc::new(careers));

    // Audit log: PostgreSQL when configured, otherwise in-process only
    let sink: Arc<dyn PersistenceSink> = match &config.database_url {
        Some(url) => {
            let pg = PgSink::connect(url).await?;
            pg.ensure_schema().await?;
            Arc::new(pg)
        }
        None => {
            warn!("DATABASE_URL not set; students, predictions and feedback are kept in memory only");
            Arc::new(MemorySink::new())
        }
    };

    let state = AppState { engine, sink };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
