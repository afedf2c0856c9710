//! # Error Handling Middleware
//!
//! Maps booking errors to HTTP status codes and a JSON body of the form
//! `{"code": "...", "message": "..."}`. Internal failures are logged with
//! their full detail and reported to the caller only as a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use timebook_core::errors::BookingError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use timebook_api::middleware::error_handling::AppError;
/// use timebook_core::errors::BookingError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(BookingError::NotFound("Appointment not found".to_string()).into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::Authorization(_) => StatusCode::FORBIDDEN,
            BookingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if self.0.is_internal() {
            error!(error = ?self.0, "Request failed with internal error");
            "Internal server error".to_string()
        } else {
            match &self.0 {
                BookingError::NotFound(msg)
                | BookingError::Validation(msg)
                | BookingError::Conflict(msg)
                | BookingError::Authentication(msg)
                | BookingError::Authorization(msg) => msg.clone(),
                other => other.to_string(),
            }
        };

        let body = Json(json!({ "code": self.0.code(), "message": message }));
        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Database(err))
    }
}
