//! Chat handler
//!
//! `POST /chat` runs the full pipeline for one question: validate, build a
//! repository snapshot, assemble the bounded context, invoke the model, and
//! record the exchange for authenticated callers.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use rand::Rng;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::{ChatRequest, ChatResponse};
use crate::services::conversation::ConversationRecord;
use crate::services::snapshot::SnapshotError;
use crate::services::{caller_id_from_bearer, ContextAssembler, ModelInvoker, SnapshotBuilder};
use crate::AppState;

/// Conversation ids look like `conv_<unix-ts>_<4-digit-number>`
fn generate_conversation_id() -> String {
    format!(
        "conv_{}_{}",
        Utc::now().timestamp(),
        rand::thread_rng().gen_range(1000..=9999)
    )
}

fn map_snapshot_error(e: SnapshotError) -> AppError {
    match e {
        SnapshotError::Upstream { status, message } => AppError::Upstream { status, message },
        SnapshotError::Unreachable(msg) => AppError::Internal(msg),
    }
}

/// POST /chat
pub async fn chat(
    state: web::Data<AppState>,
    request: HttpRequest,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    let ChatRequest {
        repo_path,
        message,
        conversation_id,
    } = body.into_inner();

    // Reject before any network call is made
    if repo_path.is_empty() || message.is_empty() || repo_path.contains("${") {
        return Err(AppError::Validation(
            "Repository path and message are required and must be valid".to_string(),
        ));
    }

    let conversation_id = conversation_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_conversation_id);
    info!(repo_path, conversation_id, "handling chat request");

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());
    let caller_id = caller_id_from_bearer(auth_header);

    let snapshot = SnapshotBuilder::new(state.repo_api.clone())
        .build(&repo_path)
        .await
        .map_err(map_snapshot_error)?;

    let prompt = ContextAssembler::new().assemble(&repo_path, &snapshot, &message);

    let invoker = ModelInvoker::new(state.model_api.clone(), state.config.model_id.clone());
    let answer = invoker.ask(&prompt).await;

    // Persistence is post-hoc; the response is already determined
    if let Some(user_id) = caller_id {
        let record = ConversationRecord {
            user_id,
            conversation_id: conversation_id.clone(),
            repo_path: repo_path.clone(),
            question: message,
            answer: answer.clone(),
            timestamp: Utc::now(),
        };
        if let Err(e) = state.conversations.record(record).await {
            error!(conversation_id, error = %e, "failed to save conversation");
        }
    }

    Ok(HttpResponse::Ok().json(ChatResponse {
        answer,
        conversation_id,
    }))
}

/// Configure chat routes
pub fn configure_chat_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat").route(web::post().to(chat)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_ids_match_the_expected_pattern() {
        let id = generate_conversation_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "conv");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
