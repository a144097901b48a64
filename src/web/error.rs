use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{Error, ErrorKind};

/// JSON error body returned by the API routes.
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: String,
}

impl ApiError {
    pub fn status_for(err: &Error) -> StatusCode {
        match err {
            Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ if err.is_external() => StatusCode::BAD_GATEWAY,
            _ => match err.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::ExternalService | ErrorKind::Parse | ErrorKind::Classification => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorKind::Configuration | ErrorKind::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self {
            status_code: Self::status_for(&err),
            error_code: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Malformed API bodies answer with the same JSON error shape as pipeline failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            message: format!("Invalid request body: {}", rejection.body_text()),
            status_code: StatusCode::BAD_REQUEST,
            error_code: ErrorKind::InvalidInput.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        } else {
            tracing::warn!("Request rejected: {}", self.message);
        }

        let body = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16(),
            "error_code": self.error_code,
        });

        (self.status_code, Json(body)).into_response()
    }
}
