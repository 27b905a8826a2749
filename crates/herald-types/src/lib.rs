//! Notification types shared by the Herald client core and the dev remote store.

pub mod api;
pub mod models;

pub use api::{
    MAX_PAGE_LIMIT, MarkAllReadRequest, MarkAllReadResponse, NotificationPayload, PageQuery,
    PageResponse,
};
pub use models::{
    ActivityLevel, EngagementContext, HIGH_PRIORITY_THRESHOLD, Notification, NotificationAction,
    NotificationKind, PriorityBucket,
};
