// In crates/web-server/src/error.rs

use crate::types::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to bind server address: {0}")]
    ServerBindError(std::io::Error),
    #[error("Server stopped with an error: {0}")]
    ServeError(std::io::Error),
    #[error("Notification failed: {0}")]
    Notification(#[from] notifier::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Notification(notifier::Error::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Notification(_) => StatusCode::BAD_GATEWAY,
            Error::ServerBindError(_) | Error::ServeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self, %status, "Request failed.");
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
