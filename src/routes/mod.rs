//! API Routes
//!
//! - `/api/upload`, `/api/images` - image upload, listing and deletion
//! - `/api/health` - Health check

pub mod health;
pub mod images;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
///
/// The upload page is usually served from another origin than the API, so
/// every route answers CORS requests from any origin.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(images::router(state.clone()))
        .merge(health::router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
