use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Request payload failed validation; no upstream calls were made
    Validation(String),
    /// The upstream repository API answered with a non-success status
    Upstream { status: u16, message: String },
    /// No route matched the request
    NotFound(String),
    /// Internal server error
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Upstream { status, message } => {
                write!(f, "Upstream error ({status}): {message}")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        match self {
            Self::Validation(_) => HttpResponse::BadRequest().json(body),
            Self::Upstream { status, .. } => {
                // Mirror the upstream status so callers can tell a missing
                // repository (404) from a rate-limited one (429)
                let code =
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                HttpResponse::build(code).json(body)
            }
            Self::NotFound(_) => HttpResponse::NotFound().json(body),
            Self::Internal(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}
