use crate::{
    handlers, // Import handlers module
    AppState, // Use the AppState defined in main.rs
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum router and associates routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/categories/{category}", get(handlers::category))
        .route("/prompt/{slug}", get(handlers::prompt_detail))
        .route("/admin", get(handlers::admin_sign_in))
        .route("/admin/session", post(handlers::admin_session))
        .route("/admin/prompts", post(handlers::admin_submit))
        .route("/contact", get(handlers::contact).post(handlers::contact_submit))
        .route("/privacy-policy", get(handlers::privacy_policy))
        .route("/terms-of-service", get(handlers::terms_of_service))
        .route("/sitemap.xml", get(handlers::sitemap_xml))
        // Middleware Layers
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
