//! error types for the store and the http layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mongodb::bson;
use thiserror::Error;

/// failures talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database not connected")]
    Disconnected,

    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to encode reading: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("inserted reading {0} could not be read back")]
    MissingAfterInsert(String),
}

/// a storage failure surfaced to an http caller
///
/// nothing is retried; the caller gets a generic 500 and the cause goes to
/// the log.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "storage operation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Internal Server Error" })),
        )
            .into_response()
    }
}
