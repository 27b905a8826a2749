use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use herald_types::api::{
    MAX_PAGE_LIMIT, MarkAllReadRequest, MarkAllReadResponse, NotificationPayload, PageResponse,
};
use herald_types::models::{EngagementContext, NotificationKind};

use crate::book::NotificationBook;

pub type AppState = Arc<NotificationBook>;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNotificationRequest {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority_score: f64,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub engagement_context: Option<EngagementContext>,
    pub optimal_timing: Option<bool>,
}

pub async fn list_notifications(
    State(book): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, StatusCode> {
    if params.page == 0 || params.limit == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let limit = params.limit.min(MAX_PAGE_LIMIT);

    let (items, total) = book.page(user_id, params.page, limit).await;
    Ok(Json(PageResponse { items, total }))
}

/// Dev convenience: the real store creates notifications itself.
pub async fn create_notification(
    State(book): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.action_url.is_some() != req.action_text.is_some() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if !(0.0..=1.0).contains(&req.priority_score) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let payload = NotificationPayload {
        id: Uuid::new_v4(),
        kind: req.kind,
        title: req.title,
        message: req.message,
        created_at: chrono::Utc::now(),
        is_read: false,
        priority_score: req.priority_score,
        action_url: req.action_url,
        action_text: req.action_text,
        engagement_context: req.engagement_context,
        optimal_timing: req.optimal_timing,
    };
    book.insert(user_id, payload.clone()).await;
    info!("Created notification {} for {}", payload.id, user_id);

    Ok((StatusCode::CREATED, Json(payload)))
}

pub async fn mark_read(
    State(book): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> StatusCode {
    if book.should_fail() {
        warn!("Injected failure: mark_read {}", id);
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if book.mark_read(user_id, id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn mark_all_read(
    State(book): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<MarkAllReadRequest>,
) -> Json<MarkAllReadResponse> {
    let (updated, failed) = book.mark_all_read(user_id, &req.ids).await;
    if !failed.is_empty() {
        warn!("mark_all_read for {}: {} of {} failed", user_id, failed.len(), updated.len() + failed.len());
    }
    Json(MarkAllReadResponse { updated, failed })
}

pub async fn delete_notification(
    State(book): State<AppState>,
    Path((user_id, id)): Path<(Uuid, Uuid)>,
) -> StatusCode {
    if book.should_fail() {
        warn!("Injected failure: delete {}", id);
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if book.delete(user_id, id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn health() -> &'static str {
    "ok"
}
