use actix_web::HttpResponse;

use crate::error::AppError;

pub mod chat;
pub mod repos;


pub use chat::configure_chat_routes;
pub use repos::configure_repo_routes;

/// Fallback handler for unmatched routes
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(
        "The requested resource does not exist".to_string(),
    ))
}
