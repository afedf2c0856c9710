use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    /// Stable machine-readable code reported to callers alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::Validation(_) => "VALIDATION_ERROR",
            BookingError::Conflict(_) => "CONFLICT",
            BookingError::Authentication(_) => "UNAUTHORIZED",
            BookingError::Authorization(_) => "FORBIDDEN",
            BookingError::Database(_) | BookingError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Persistence or transaction failures whose detail must stay server-side.
    pub fn is_internal(&self) -> bool {
        matches!(self, BookingError::Database(_) | BookingError::Internal(_))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
