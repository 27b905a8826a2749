use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Change notifications broadcast by the store. Views re-read their
/// projection when one arrives; the payload is informational.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum StoreEvent {
    /// A fetch started (`loading` is now true)
    FetchStarted { page: u32 },

    /// A page was merged into the collection
    PageMerged {
        page: u32,
        inserted: usize,
        refreshed: usize,
        total: u64,
    },

    /// A fetch failed; the collection is unchanged
    FetchFailed { page: u32, error: String },

    /// Optimistic mark-read applied
    MarkedRead { id: Uuid },

    /// Mark-all applied optimistically to these ids
    MarkedAllRead { ids: Vec<Uuid> },

    /// A read mutation was rejected and rolled back
    ReadReverted { id: Uuid, error: String },

    /// Optimistic delete applied
    Deleted { id: Uuid },

    /// A delete was rejected; the record is back at `index`
    DeleteReverted { id: Uuid, index: usize, error: String },

    /// The store stopped accepting updates
    Closed,
}

impl StoreEvent {
    /// Whether the event reports a failure that was rolled back or surfaced.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::ReadReverted { .. } | Self::DeleteReverted { .. }
        )
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchStarted { page } => write!(f, "fetch_started page={}", page),
            Self::PageMerged { page, inserted, refreshed, total } => write!(
                f,
                "page_merged page={} inserted={} refreshed={} total={}",
                page, inserted, refreshed, total
            ),
            Self::FetchFailed { page, error } => {
                write!(f, "fetch_failed page={} error: {}", page, error)
            }
            Self::MarkedRead { id } => write!(f, "marked_read id={}", id),
            Self::MarkedAllRead { ids } => write!(f, "marked_all_read count={}", ids.len()),
            Self::ReadReverted { id, error } => {
                write!(f, "read_reverted id={} error: {}", id, error)
            }
            Self::Deleted { id } => write!(f, "deleted id={}", id),
            Self::DeleteReverted { id, index, error } => {
                write!(f, "delete_reverted id={} index={} error: {}", id, index, error)
            }
            Self::Closed => write!(f, "closed"),
        }
    }
}
