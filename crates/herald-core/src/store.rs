use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, Notify, OwnedMutexGuard, RwLock, RwLockWriteGuard, broadcast};
use uuid::Uuid;

use herald_types::models::Notification;

use crate::config::StoreConfig;
use crate::engine;
use crate::error::{Result, StoreError};
use crate::events::StoreEvent;
use crate::logging::{StoreLog, StoreLogger, TracingLogger};
use crate::remote::NotificationRemote;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Pagination state of the loaded collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Highest page merged so far; 0 before the first successful fetch.
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl Pagination {
    pub fn can_load_more(&self) -> bool {
        (self.page as u64) * (self.limit as u64) < self.total
    }
}

/// Consistent read of everything a view needs, taken under one lock.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub has_high_priority: bool,
    pub pagination: Pagination,
    pub loading: bool,
    pub error: Option<StoreError>,
}

/// The single client-side copy of a user's notifications.
///
/// Cloning is cheap and every clone sees the same collection. Views read
/// through the selectors; only the fetch, poller and mutation paths write.
#[derive(Clone)]
pub struct NotificationStore {
    pub(crate) inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
    pub(crate) remote: Arc<dyn NotificationRemote>,
    pub(crate) config: StoreConfig,
    pub(crate) state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    logger: Arc<dyn StoreLogger>,

    /// Set while a page-1 fetch is running (poller or manual refresh).
    pub(crate) refresh_in_flight: AtomicBool,
    /// Woken whenever `refresh_in_flight` is released
    pub(crate) refresh_done: Notify,
    pub(crate) fetches_in_flight: AtomicUsize,
    closed: AtomicBool,

    /// Serializes mutations per notification id
    id_locks: std::sync::Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

pub(crate) struct StoreState {
    pub(crate) items: Vec<Notification>,
    pub(crate) pagination: Pagination,
    pub(crate) error: Option<StoreError>,
    /// Ids removed locally. A stale page must not bring them back.
    pub(crate) deleted: HashSet<Uuid>,
}

impl NotificationStore {
    pub fn new(remote: Arc<dyn NotificationRemote>, config: StoreConfig) -> Self {
        Self::with_logger(remote, config, Arc::new(TracingLogger))
    }

    pub fn with_logger(
        remote: Arc<dyn NotificationRemote>,
        config: StoreConfig,
        logger: Arc<dyn StoreLogger>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let pagination = Pagination { page: 0, limit: config.page_limit, total: 0 };

        Self {
            inner: Arc::new(StoreInner {
                remote,
                config,
                state: RwLock::new(StoreState {
                    items: Vec::new(),
                    pagination,
                    error: None,
                    deleted: HashSet::new(),
                }),
                events,
                logger,
                refresh_in_flight: AtomicBool::new(false),
                refresh_done: Notify::new(),
                fetches_in_flight: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                id_locks: std::sync::Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Subscribe to change events. Receivers that lag simply miss events
    /// and should re-read a snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    // -- Selectors --

    /// The local collection in server order, unfiltered.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.state.read().await.items.clone()
    }

    pub async fn unread_count(&self) -> usize {
        engine::unread_count(&self.inner.state.read().await.items)
    }

    pub async fn has_high_priority(&self) -> bool {
        engine::has_high_priority(&self.inner.state.read().await.items)
    }

    pub async fn pagination(&self) -> Pagination {
        self.inner.state.read().await.pagination
    }

    pub fn loading(&self) -> bool {
        self.inner.fetches_in_flight.load(Ordering::Acquire) > 0
    }

    /// Last fetch error, cleared by the next successful fetch.
    pub async fn error(&self) -> Option<StoreError> {
        self.inner.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.inner.state.read().await;
        StoreSnapshot {
            notifications: state.items.clone(),
            unread_count: engine::unread_count(&state.items),
            has_high_priority: engine::has_high_priority(&state.items),
            pagination: state.pagination,
            loading: self.loading(),
            error: state.error.clone(),
        }
    }

    // -- Lifecycle --

    /// Stop accepting updates. Responses that arrive afterwards are dropped.
    pub fn shutdown(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            self.emit("store", StoreEvent::Closed);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() { Err(StoreError::Closed) } else { Ok(()) }
    }

    /// Write access, or `None` once the store is shut down.
    pub(crate) async fn write_live(&self) -> Option<RwLockWriteGuard<'_, StoreState>> {
        let state = self.inner.state.write().await;
        if self.is_closed() { None } else { Some(state) }
    }

    pub(crate) fn emit(&self, component: &'static str, event: StoreEvent) {
        self.inner.logger.log(StoreLog { component, event: event.clone() });
        let _ = self.inner.events.send(event);
    }

    // -- Per-id serialization --

    pub(crate) async fn lock_id(&self, id: Uuid) -> IdGuard {
        let lock = {
            let mut locks = self.inner.id_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(id).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        IdGuard { store: self.inner.clone(), id, guard: Some(guard) }
    }

    #[cfg(test)]
    pub(crate) fn id_lock_count(&self) -> usize {
        self.inner.id_locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Exclusive hold on one notification id. The lock entry is dropped from
/// the map once nobody holds or waits on it.
pub(crate) struct IdGuard {
    store: Arc<StoreInner>,
    id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.store.id_locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters clone the Arc under this same mutex, so a count of one
        // means only the map refers to it.
        if locks.get(&self.id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.id);
        }
    }
}
