//! Herald notification core.
//!
//! One client-resident copy of a user's notifications, shared by the
//! dropdown, the side panel and the history page:
//! - paginated fetch with idempotent, id-keyed merging
//! - background refresh of page 1 on an interval
//! - optimistic mark-read / mark-all-read / delete with rollback
//! - priority buckets, filters, sorts and search over loaded items

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fetch;
pub mod logging;
pub mod mutation;
pub mod poller;
pub mod remote;
pub mod store;
pub mod views;

// Re-export key types for convenience.
pub use config::{MAX_PAGE_LIMIT, StoreConfig};
pub use engine::{Filter, SearchQuery, SortOrder};
pub use error::{RemoteError, StoreError};
pub use events::StoreEvent;
pub use fetch::{PageResult, RefreshOutcome};
pub use logging::{NullLogger, StoreLog, StoreLogger, TracingLogger};
pub use mutation::{MarkAllOutcome, MarkReadOutcome};
pub use poller::Poller;
pub use remote::{BatchOutcome, HttpRemote, NotificationRemote, RemotePage};
pub use store::{NotificationStore, Pagination, StoreSnapshot};
pub use views::{
    Dropdown, DropdownView, HistoryPage, HistoryView, NotificationCard, Panel, PanelView,
};

pub use herald_types::models::{Notification, NotificationKind, PriorityBucket};
