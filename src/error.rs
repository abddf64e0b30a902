use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};

use thiserror::Error;

use crate::output::Envelope;
use crate::repo::StoreError;
use crate::service::{CredentialError, DelayError, SessionError, SubscriptionError};

pub type RestResult<T> = Result<T, RestError>;

/// Errors answered with an HTTP error status
#[derive(Debug, Error)]
pub enum RestError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for RestError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.into())
    }
}

impl From<SessionError> for RestError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Store(e) => e.into(),
            _ => Self::Unauthorized,
        }
    }
}

impl From<CredentialError> for RestError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::DuplicateEmail => Self::Conflict(e.to_string()),
            CredentialError::MissingCredentials => Self::BadRequest(e.to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<SubscriptionError> for RestError {
    fn from(e: SubscriptionError) -> Self {
        Self::Internal(e.into())
    }
}

impl From<DelayError> for RestError {
    fn from(e: DelayError) -> Self {
        Self::Internal(e.into())
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingAuthHeader => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            Self::Internal(e) => tracing::error!(error = ?e, "Request failed"),
            Self::BadRequest(_) => tracing::info!(error = %self, "Rejected request"),
            _ => tracing::debug!(error = %self, "Rejected request"),
        }
        // Internal details stay in the logs
        HttpResponse::build(status).json(Envelope::failure(status.as_u16(), self.to_string()))
    }
}

/// Turn body deserialization failures into 400s with the envelope body
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    RestError::BadRequest(err.to_string()).into()
}
