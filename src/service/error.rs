use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    #[error("Unknown recurrence frequency '{0}'")]
    InvalidFrequency(String),

    #[error("Contract end date {end} is before start date {start}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("No payment amount could be resolved for the service request")]
    MissingPrice,

    #[error("An active payment already exists for contract {0}")]
    DuplicateObligation(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidState(_)
            | ServiceError::InvalidFrequency(_)
            | ServiceError::InvalidDateRange { .. }
            | ServiceError::MissingPrice => StatusCode::BAD_REQUEST,

            ServiceError::DuplicateObligation(_) => StatusCode::CONFLICT,

            ServiceError::Database(_) | ServiceError::Mail(_) | ServiceError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}
