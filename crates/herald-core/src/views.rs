//! Read models for the three notification surfaces.
//!
//! Each adapter holds a handle to the shared store plus its own view state
//! (filter, sort, search). None of them keeps a copy of the collection.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use herald_types::models::{ActivityLevel, Notification, NotificationAction, NotificationKind};

use crate::engine::{self, Filter, SearchQuery, SortOrder};
use crate::error::Result;
use crate::fetch::{PageResult, RefreshOutcome};
use crate::mutation::{MarkAllOutcome, MarkReadOutcome};
use crate::store::NotificationStore;

/// Where the dropdown's "see all" link points.
pub const HISTORY_PATH: &str = "/notifications";

/// Unread counts above this show as "9+".
const BADGE_CAP: usize = 9;

/// Render-ready notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationCard {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub time_ago: String,
    pub is_read: bool,
    pub priority: Option<&'static str>,
    pub action: Option<NotificationAction>,
    pub explanation: Option<String>,
}

impl NotificationCard {
    pub fn new(n: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title.clone(),
            message: n.message.clone(),
            time_ago: time_ago(n.created_at, now),
            is_read: n.is_read,
            priority: n.priority_bucket().label(),
            action: n.action.clone(),
            explanation: explain(n),
        }
    }
}

pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 7 * 86_400 => format!("{}d ago", s / 86_400),
        s => format!("{}w ago", s / (7 * 86_400)),
    }
}

pub fn badge_text(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > BADGE_CAP => Some(format!("{}+", BADGE_CAP)),
        n => Some(n.to_string()),
    }
}

/// Why-am-I-seeing-this line for the side panel. Display only.
pub fn explain(n: &Notification) -> Option<String> {
    let mut parts = Vec::new();

    if n.optimal_timing == Some(true) {
        parts.push("Sent at a time you usually check in".to_string());
    }
    if let Some(ctx) = &n.engagement_context {
        match ctx.activity_level {
            Some(ActivityLevel::High) => {
                parts.push("You're very active, so this was delivered right away".to_string())
            }
            Some(ActivityLevel::Moderate) => {
                parts.push("Matched to your regular activity".to_string())
            }
            Some(ActivityLevel::Low) => {
                parts.push("Kept for when you next check in".to_string())
            }
            None => {}
        }
        if !ctx.preferred_times.is_empty() {
            parts.push(format!("You prefer updates in the {}", ctx.preferred_times.join(", ")));
        }
    }

    if parts.is_empty() { None } else { Some(parts.join(" · ")) }
}

fn cards(items: &[Notification], now: DateTime<Utc>) -> Vec<NotificationCard> {
    items.iter().map(|n| NotificationCard::new(n, now)).collect()
}

// -- Dropdown --

#[derive(Debug, Clone)]
pub struct DropdownView {
    pub cards: Vec<NotificationCard>,
    pub unread_count: usize,
    pub badge: Option<String>,
    pub has_high_priority: bool,
    pub loading: bool,
    pub history_link: &'static str,
}

/// Compact header dropdown: the few newest items and the unread badge.
pub struct Dropdown {
    store: NotificationStore,
    limit: usize,
}

impl Dropdown {
    pub fn new(store: NotificationStore) -> Self {
        let limit = store.config().dropdown_limit;
        Self { store, limit }
    }

    pub fn with_limit(store: NotificationStore, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Opening the dropdown refreshes page 1 out of band.
    pub async fn open(&self) -> Result<RefreshOutcome> {
        self.store.refresh().await
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<MarkReadOutcome> {
        self.store.mark_as_read(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.delete_notification(id).await
    }

    pub async fn snapshot(&self) -> DropdownView {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> DropdownView {
        let snap = self.store.snapshot().await;
        let mut recent = engine::project(&snap.notifications, Filter::All, SortOrder::Time);
        recent.truncate(self.limit);

        DropdownView {
            cards: cards(&recent, now),
            unread_count: snap.unread_count,
            badge: badge_text(snap.unread_count),
            has_high_priority: snap.has_high_priority,
            loading: snap.loading,
            history_link: HISTORY_PATH,
        }
    }
}

// -- Slide-in panel --

#[derive(Debug, Clone)]
pub struct PanelView {
    pub cards: Vec<NotificationCard>,
    pub filter: Filter,
    pub sort: SortOrder,
    pub unread_count: usize,
    pub has_high_priority: bool,
    pub loading: bool,
}

/// Side panel with filter and sort controls and "mark all read".
pub struct Panel {
    store: NotificationStore,
    filter: Filter,
    sort: SortOrder,
}

impl Panel {
    pub fn new(store: NotificationStore) -> Self {
        Self { store, filter: Filter::All, sort: SortOrder::Priority }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        self.store.refresh().await
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<MarkReadOutcome> {
        self.store.mark_as_read(id).await
    }

    pub async fn mark_all_as_read(&self) -> Result<MarkAllOutcome> {
        self.store.mark_all_as_read().await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.delete_notification(id).await
    }

    pub async fn snapshot(&self) -> PanelView {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> PanelView {
        let snap = self.store.snapshot().await;
        let projected = engine::project(&snap.notifications, self.filter, self.sort);

        PanelView {
            cards: cards(&projected, now),
            filter: self.filter,
            sort: self.sort,
            unread_count: snap.unread_count,
            has_high_priority: snap.has_high_priority,
            loading: snap.loading,
        }
    }
}

// -- History page --

#[derive(Debug, Clone)]
pub struct HistoryView {
    pub cards: Vec<NotificationCard>,
    /// Items loaded so far, before search
    pub loaded: usize,
    pub unread_count: usize,
    pub can_load_more: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Full paginated history with client-side search over what's loaded.
/// Searching never fetches.
pub struct HistoryPage {
    store: NotificationStore,
    query: SearchQuery,
}

impl HistoryPage {
    pub fn new(store: NotificationStore) -> Self {
        Self { store, query: SearchQuery::default() }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query.text = text.into();
    }

    pub fn set_kind(&mut self, kind: Option<NotificationKind>) {
        self.query.kind = kind;
    }

    pub async fn load_first(&self) -> Result<RefreshOutcome> {
        self.store.refresh().await
    }

    pub async fn load_more(&self) -> Result<Option<PageResult>> {
        self.store.load_more().await
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<MarkReadOutcome> {
        self.store.mark_as_read(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.store.delete_notification(id).await
    }

    pub async fn snapshot(&self) -> HistoryView {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> HistoryView {
        let snap = self.store.snapshot().await;
        let matched = self.query.apply(&snap.notifications);

        HistoryView {
            cards: cards(&matched, now),
            loaded: snap.notifications.len(),
            unread_count: snap.unread_count,
            can_load_more: snap.pagination.page == 0 || snap.pagination.can_load_more(),
            loading: snap.loading,
            error: snap.error.map(|e| e.to_string()),
        }
    }
}
