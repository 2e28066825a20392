pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::VideoStore;
use crate::storage::StorageProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoStore>,
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageProvider>,
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // max_bytes only bounds memory; larger parts are spooled
    let body_limit = match state.config.upload.max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/videos",
            get(handlers::video::list_videos).post(handlers::video::create_video),
        )
        .route("/videos/{video_id}", get(handlers::video::get_video))
        .route(
            "/videos/{video_id}/thumbnail",
            post(handlers::thumbnail::upload_thumbnail).layer(body_limit),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Stored assets are public
    let assets = ServeDir::new(&state.config.storage.assets_root);

    Router::new()
        .nest("/api", protected_routes)
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
