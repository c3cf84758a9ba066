use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use slotbook_core::error::{error_response, retryable_error_response};

/// Reservations service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ReservationsServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("schedule not found")]
    ScheduleNotFound,
    #[error("already taken")]
    DuplicateReservation,
    #[error("capacity is already full")]
    CapacityExceeded,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("login required")]
    Unauthenticated,
    #[error("login failed")]
    LoginFailed,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid capacity")]
    InvalidCapacity,
    #[error("missing data")]
    MissingData,
    /// Lock wait timed out, commit failed, or the store was unreachable.
    /// The whole operation may be retried.
    #[error("storage temporarily unavailable")]
    TransientStorage(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ReservationsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ScheduleNotFound => "SCHEDULE_NOT_FOUND",
            Self::DuplicateReservation => "DUPLICATE_RESERVATION",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidCapacity => "INVALID_CAPACITY",
            Self::MissingData => "MISSING_DATA",
            Self::TransientStorage(_) => "TRANSIENT_STORAGE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStorage(_))
    }
}

impl IntoResponse for ReservationsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::ScheduleNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateReservation | Self::CapacityExceeded | Self::UserAlreadyExists => {
                StatusCode::CONFLICT
            }
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::LoginFailed | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidCapacity | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::TransientStorage(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are business outcomes; the trace layer already records them.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
            }
            Self::TransientStorage(e) => {
                tracing::warn!(error = format!("{e:#}"), kind = "TRANSIENT_STORAGE", "transient storage error");
                return retryable_error_response(status, self.kind(), self.to_string(), 1);
            }
            _ => {}
        }
        error_response(status, self.kind(), self.to_string())
    }
}
