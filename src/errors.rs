use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Validation(_)
            | DomainError::InsufficientStock { .. }
            | DomainError::InvalidTransition { .. } => AppError::BadRequest(e.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: &str| serde_json::json!({ "error": msg });
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(body("Not found")),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(body(msg)),
            AppError::Unauthorized => HttpResponse::Unauthorized().json(body("Unauthorized")),
            AppError::Forbidden => HttpResponse::Forbidden().json(body("Forbidden")),
            // Diagnostic detail stays in the server logs.
            AppError::Internal(_) => {
                HttpResponse::InternalServerError().json(body("Internal server error"))
            }
        }
    }
}
