//! Priority, filtering, sorting and search over the loaded collection.
//!
//! Everything here is a pure function of a slice; the store and the views
//! call in with whatever they currently hold.

use std::cmp::Ordering;

use herald_types::models::{Notification, NotificationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Unread,
    /// Score above the high-priority threshold, read or not
    HighPriority,
}

impl Filter {
    pub fn matches(&self, n: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !n.is_read,
            Self::HighPriority => n.is_high_priority(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Highest score first, newer first on ties
    Priority,
    /// Newest first
    #[default]
    Time,
}

impl SortOrder {
    fn compare(&self, a: &Notification, b: &Notification) -> Ordering {
        match self {
            Self::Priority => b
                .priority_score
                .total_cmp(&a.priority_score)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            Self::Time => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Counted over the whole collection, never over a filtered view.
pub fn unread_count(items: &[Notification]) -> usize {
    items.iter().filter(|n| !n.is_read).count()
}

pub fn has_high_priority(items: &[Notification]) -> bool {
    items.iter().any(|n| !n.is_read && n.is_high_priority())
}

/// Stable sort, so equal keys keep collection order.
pub fn sort(items: &mut [Notification], order: SortOrder) {
    items.sort_by(|a, b| order.compare(a, b));
}

pub fn project(items: &[Notification], filter: Filter, order: SortOrder) -> Vec<Notification> {
    let mut out: Vec<Notification> = items.iter().filter(|n| filter.matches(n)).cloned().collect();
    sort(&mut out, order);
    out
}

/// Free-text search plus optional type filter for the history page.
/// Works on loaded items only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub kind: Option<NotificationKind>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.kind.is_none()
    }

    pub fn matches(&self, n: &Notification) -> bool {
        if let Some(kind) = self.kind {
            if n.kind != kind {
                return false;
            }
        }
        let needle = self.text.trim().to_lowercase();
        needle.is_empty()
            || n.title.to_lowercase().contains(&needle)
            || n.message.to_lowercase().contains(&needle)
    }

    pub fn apply(&self, items: &[Notification]) -> Vec<Notification> {
        items.iter().filter(|n| self.matches(n)).cloned().collect()
    }
}
