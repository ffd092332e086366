//! HTTP facade.
//!
//! | Method | Path                                 | Response                  |
//! |--------|--------------------------------------|---------------------------|
//! | POST   | `/api/generate`                      | `GenerationResult` JSON   |
//! | GET    | `/api/customers`                     | `[CustomerRecord]` JSON   |
//! | GET    | `/api/customers/{customer}/archive`  | `application/zip` bytes   |
//! | GET    | `/health`                            | `{"status":"ok"}`         |
//!
//! Errors are returned as `{"code": "...", "message": "..."}`.

use crate::state::AppState;
use crate::types::GenerateParams;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use sapgen_core::{CustomerName, CustomerRecord, Error, GenerationResult};

/// Builds the router with all routes and the request body limit.
#[must_use]
pub fn router(state: AppState) -> Router {
    let body_limit = state.config().max_body_bytes;

    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({ "status": "ok" })) }),
        )
        .route("/api/generate", post(generate))
        .route("/api/customers", get(customers))
        .route("/api/customers/{customer}/archive", get(archive))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// Error response body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::CustomerNotFound { .. } => (StatusCode::NOT_FOUND, "customer_not_found"),
            Error::ValidationError { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Error::ConfigError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::SpawnFailed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "spawn_failed"),
            Error::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::ArchiveError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "archive_error"),
            Error::SerializationError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
            }
            Error::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = ?err, "Request failed");
        } else {
            tracing::debug!(error = %err, "Request rejected");
        }

        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // axum reports missing or mistyped keys as 422
        let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::BAD_REQUEST
        };
        Self {
            status,
            code: "invalid_request",
            message: rejection.body_text(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateParams>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(params) = payload?;
    let request = params.into_request()?;
    let result = state.generate(&request).await?;
    Ok(Json(result))
}

async fn customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerRecord>>, ApiError> {
    Ok(Json(state.list_customers().await?))
}

async fn archive(
    State(state): State<AppState>,
    Path(customer): Path<String>,
) -> Result<Response, ApiError> {
    let customer = CustomerName::new(customer)?;
    let disposition = content_disposition(&customer);
    let bytes = state.archive(customer).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment; filename="<customer>.zip"`, with characters that are not
/// valid in a quoted header value replaced by `_`.
fn content_disposition(customer: &CustomerName) -> String {
    let safe: String = customer
        .as_str()
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}.zip\"")
}
