pub mod error;
pub mod handlers;
pub mod page;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::workflow::ReviewPipeline;

pub use error::ApiError;
pub use page::PageRenderer;

pub struct AppState {
    pub pipeline: Arc<ReviewPipeline>,
    pub provider: String,
    pub page: PageRenderer,
}

impl AppState {
    pub fn new(pipeline: Arc<ReviewPipeline>, provider: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pipeline,
            provider: provider.into(),
            page: PageRenderer::new()?,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index_handler).post(handlers::submit_form_handler))
        .route("/api/review", post(handlers::api_review_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
}

/// Serves the app until Ctrl-C. Each request runs its own pipeline
/// invocation; a client disconnect drops the in-flight model call.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Review Response Assistant listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
