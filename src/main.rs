use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use gitsage::handlers::{configure_chat_routes, configure_repo_routes, not_found};
use gitsage::services::{AnthropicClient, GitHubClient, InMemoryConversationStore};
use gitsage::{AppState, Config};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gitsage=debug,actix_web=info")),
        )
        .with(fmt::layer())
        .init();

    let config = Config::from_env().expect("failed to load configuration");
    let host = config.host.clone();
    let port = config.port;

    let repo_api = GitHubClient::new(&config).expect("failed to build GitHub client");
    let model_api = AnthropicClient::new(config.model_api_url.clone(), config.model_api_key.clone())
        .expect("failed to build model client");

    let state = web::Data::new(AppState {
        config,
        repo_api: Arc::new(repo_api),
        model_api: Arc::new(model_api),
        conversations: Arc::new(InMemoryConversationStore::new()),
    });

    info!("starting server at http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(health))
            .configure(configure_chat_routes)
            .configure(configure_repo_routes)
            .default_service(web::route().to(not_found))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
