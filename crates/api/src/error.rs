//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use fulfillment::FulfillmentError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Order lifecycle error.
    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Fulfillment(err) => fulfillment_status(err),
        }
    }
}

fn fulfillment_status(err: &FulfillmentError) -> StatusCode {
    match err {
        FulfillmentError::NotFound { .. } => StatusCode::NOT_FOUND,
        FulfillmentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        FulfillmentError::IllegalTransition(_) => StatusCode::CONFLICT,
        FulfillmentError::Store(_)
        | FulfillmentError::Notification(_)
        | FulfillmentError::Email(_)
        | FulfillmentError::Settlement(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Fulfillment(err.into())
    }
}
