//! In-memory stand-in for the remote notification store.
//!
//! Serves the same HTTP contract the Herald client speaks, for local
//! development and end-to-end tests. Nothing is persisted.

pub mod book;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use book::NotificationBook;

pub fn router(book: Arc<NotificationBook>) -> Router {
    Router::new()
        .route(
            "/users/{user_id}/notifications",
            get(routes::list_notifications).post(routes::create_notification),
        )
        .route("/users/{user_id}/notifications/read-all", post(routes::mark_all_read))
        .route("/users/{user_id}/notifications/{id}/read", post(routes::mark_read))
        .route("/users/{user_id}/notifications/{id}", delete(routes::delete_notification))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(book)
}
