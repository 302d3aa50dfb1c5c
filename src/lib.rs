pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod sweeper;
pub mod token;
pub mod utils;

use axum::{
    middleware::from_fn,
    routing::{any, delete, get, post},
    Router,
};
use handlers::*;
use middleware::cors_middleware;
use models::AppState;

pub async fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/upload", post(upload_audio))
        .route("/api/check/:token", get(check_audio))
        .route("/api/delete", any(delete_missing_token))
        .route(
            "/api/delete/:token",
            delete(delete_audio)
                .post(delete_audio)
                .fallback(method_not_allowed),
        )
        .route("/stream/:token", get(stream_audio))
        .layer(from_fn(cors_middleware))
        .with_state(state)
}
