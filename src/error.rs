use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Failures that abort a request. Everything here maps to a 500 with the
/// `{ "ok": false, "error": ... }` envelope the clients expect; domain-level
/// rejections (404, 409, ...) are modeled per resource module instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("scanner failed: {0}")]
    Scanner(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
