use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use tracing::{error, warn};

use super::pages::{ErrorPage, Layout};
use crate::auth::AuthError;
use crate::db::StoreError;
use crate::media::MediaError;

/// Request-level errors that end a request with an error page
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("request payload rejected: {0}")]
    Payload(actix_web::Error),
}

impl ServiceError {
    fn detail(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "The page you requested does not exist.",
            ServiceError::Payload(_) => "The submitted form could not be processed.",
            _ => "Something went wrong. Please try again later.",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Payload(err) => err.as_response_error().status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ServiceError::NotFound(what) => warn!("Not found: {}", what),
            ServiceError::Payload(err) => warn!("Payload rejected: {}", err),
            other => error!("Request failed: {:?}", other),
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        let page = ErrorPage {
            layout: Layout::default(),
            status: status.as_u16(),
            reason: reason.to_string(),
            detail: self.detail().to_string(),
        };
        match page.render() {
            Ok(body) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(err) => {
                error!("Failed to render error page: {}", err);
                HttpResponse::build(status).body(reason)
            }
        }
    }
}
