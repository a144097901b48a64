use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, IntoResponse},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ErrorKind;
use crate::models::ResponseRecord;
use crate::web::error::ApiError;
use crate::web::page::Outcome;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub review: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub review: String,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.provider,
        "model": state.pipeline.model_name(),
        "ambiguous_sentiment": state.pipeline.ambiguity_policy().as_str(),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn index_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let html = state
        .page
        .render("", Outcome::Empty, state.pipeline.model_name())?;
    Ok(Html(html))
}

pub async fn submit_form_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ReviewForm>,
) -> Result<Html<String>, ApiError> {
    let model = state.pipeline.model_name();

    let html = match state.pipeline.process_review(&form.review).await {
        Ok(record) => state
            .page
            .render(&form.review, Outcome::Success(&record), model)?,
        Err(err) if err.kind() == ErrorKind::InvalidInput => {
            state
                .page
                .render(&form.review, Outcome::Warning(&err.to_string()), model)?
        }
        Err(err) => {
            tracing::error!("Review processing failed: {}", err);
            state
                .page
                .render(&form.review, Outcome::Failure(&err.to_string()), model)?
        }
    };

    Ok(Html(html))
}

pub async fn api_review_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ResponseRecord>, ApiError> {
    let Json(request) = payload?;
    let record = state
        .pipeline
        .process_review(&request.review)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(record))
}
