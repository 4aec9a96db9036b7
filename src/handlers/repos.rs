//! Repository info handler
//!
//! `POST /repo-info` returns a formatted view of a repository's metadata
//! without running the rest of the pipeline.

use actix_web::{web, HttpResponse};
use tracing::info;

use crate::error::AppError;
use crate::models::{RepoInfoRequest, RepoInfoResponse};
use crate::services::GitHubError;
use crate::AppState;

fn map_github_error(e: GitHubError) -> AppError {
    match e {
        GitHubError::RateLimited => AppError::Upstream {
            status: 429,
            message: "GitHub API rate limit reached".to_string(),
        },
        GitHubError::Status { status, message } => AppError::Upstream { status, message },
        GitHubError::Http(e) => AppError::Internal(e.to_string()),
    }
}

/// POST /repo-info
pub async fn repo_info(
    state: web::Data<AppState>,
    body: web::Json<RepoInfoRequest>,
) -> Result<HttpResponse, AppError> {
    let repo_path = body.into_inner().repo_path;

    if repo_path.is_empty() || repo_path.contains("${") {
        return Err(AppError::Validation(
            "Repository path is required and must be valid".to_string(),
        ));
    }

    info!(repo_path, "handling repo info request");
    let info = state
        .repo_api
        .get_repo(&repo_path)
        .await
        .map_err(map_github_error)?;

    Ok(HttpResponse::Ok().json(RepoInfoResponse {
        name: info.name.unwrap_or_default(),
        full_name: info.full_name.unwrap_or_default(),
        description: info.description.unwrap_or_default(),
        stars: info.stargazers_count,
        forks: info.forks_count,
        issues: info.open_issues_count,
        language: info.language.unwrap_or_default(),
        url: info.html_url.unwrap_or_default(),
        topics: info.topics,
    }))
}

/// Configure repository info routes
pub fn configure_repo_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/repo-info").route(web::post().to(repo_info)));
}
