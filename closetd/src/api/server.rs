//! Router setup

use super::handlers;
use crate::service::ClosetService;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub service: Arc<ClosetService>,
}

/// Build the application router.
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/wardrobe/:username", post(handlers::add_wardrobe))
        .route("/wardrobe/:username", get(handlers::get_all_wardrobe))
        .route("/wardrobe/:username/:id", get(handlers::get_wardrobe))
        .route("/wardrobe/:username/:id", delete(handlers::delete_wardrobe))
        .route("/file/:filename", get(handlers::get_file))
        .route("/outfit/:username", post(handlers::add_outfit))
        .route("/outfit/:username", get(handlers::get_all_outfits))
        .route("/outfit/:username/:id", get(handlers::get_outfit))
        .route("/outfit/:username/:id", delete(handlers::delete_outfit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
