use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod admin;
mod aws_clients;
mod config;
mod detail;
mod domain;
mod errors;
mod handlers;
mod html;
mod identity;
mod listing;
mod models;
mod pages;
mod repositories;
mod routes;
mod sitemap;
mod startup;
#[cfg(test)]
mod test_support;

use crate::config::{Config, SignInConfig, SiteConfig, StoreBackend};
use crate::domain::PromptRepository;
use crate::errors::AppError;
use crate::identity::{AccessPolicy, AllowListPolicy, FirebaseIdentityProvider, IdentityProvider};
use crate::repositories::{DynamoDbPromptRepository, InMemoryPromptRepository};

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub prompt_repo: Arc<dyn PromptRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub policy: Arc<dyn AccessPolicy>,
    pub site: SiteConfig,
    pub sign_in: SignInConfig,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "prompt_gallery=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = Config::load()?;
    tracing::info!(table = %config.prompts_table, site = %config.site.base_url, "Configuration loaded");

    let prompt_repo: Arc<dyn PromptRepository> = match config.store {
        StoreBackend::DynamoDb => {
            // --- AWS Client Initialization ---
            let sdk_config = aws_clients::create_sdk_config(&config).await;
            let db_client = aws_clients::create_dynamodb_client(&sdk_config);

            // --- Resource Creation ---
            startup::init_resources(&db_client, &config.prompts_table).await?;
            Arc::new(DynamoDbPromptRepository::new(db_client, config.prompts_table.clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory prompt store; nothing will persist across restarts");
            Arc::new(InMemoryPromptRepository::new())
        }
    };

    // --- Admin access ---
    let policy = AllowListPolicy::publishers(config.admin_uids.iter().cloned());
    if policy.is_empty() {
        tracing::warn!("ADMIN_UIDS is empty; nobody can publish prompts");
    }
    let identity = FirebaseIdentityProvider::new(&config.identity_endpoint, &config.identity_api_key);

    // --- Application State ---
    let state = Arc::new(AppState {
        prompt_repo,
        identity: Arc::new(identity),
        policy: Arc::new(policy),
        site: config.site.clone(),
        sign_in: config.sign_in(),
    });

    let app = routes::create_router(state);

    // --- Server Startup ---
    tracing::info!("Server listening on http://{}", config.bind_address);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
