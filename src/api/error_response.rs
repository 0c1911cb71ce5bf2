//! HTTP error response handling for the API
//!
//! Converts domain errors into HTTP responses with the matching status code
//! and the JSON error envelope.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Status is derived from the error code where one is known, 500 otherwise
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match self.error.code.as_str() {
            "validation_error" | "config_error" => StatusCode::BAD_REQUEST,
            "not_found" | "job_not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status_code, Json(self)).into_response()
    }
}
