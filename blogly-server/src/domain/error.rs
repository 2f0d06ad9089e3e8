use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(i32),
    #[error("post not found: {0}")]
    PostNotFound(i32),
    #[error("tag not found: {0}")]
    TagNotFound(i32),
    /// Rejected form input. The message is shown to the user as a notice.
    #[error("{0}")]
    Invalid(String),
    #[error("malformed form: {0}")]
    MalformedForm(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        DomainError::Invalid(message.into())
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            DomainError::Invalid(message) => Some(message),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}

impl From<tera::Error> for DomainError {
    fn from(err: tera::Error) -> Self {
        DomainError::Internal(format!("template error: {}", err))
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::TagNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::MalformedForm(_) => StatusCode::BAD_REQUEST,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Storage and template details stay in the log.
        let body = match self {
            DomainError::Internal(details) => {
                error!(details = %details, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}
