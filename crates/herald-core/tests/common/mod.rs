#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use herald_core::{
    BatchOutcome, NotificationRemote, NotificationStore, NullLogger, RemoteError, RemotePage,
    StoreConfig,
};
use herald_types::models::{Notification, NotificationKind};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
}

pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn note(n: u128, minutes_ago: i64, score: f64) -> Notification {
    Notification {
        id: id(n),
        kind: NotificationKind::JobMatch,
        title: format!("Job match #{}", n),
        message: format!("Role {} matches your profile", n),
        created_at: base_time() - Duration::minutes(minutes_ago),
        is_read: false,
        priority_score: score,
        action: None,
        engagement_context: None,
        optimal_timing: None,
    }
}

/// `count` notifications, newest first, ids 1..=count.
pub fn inbox(count: u128) -> Vec<Notification> {
    (1..=count).map(|n| note(n, n as i64 * 10, 0.5)).collect()
}

pub fn ids(items: &[Notification]) -> Vec<u128> {
    items.iter().map(|n| n.id.as_u128()).collect()
}

/// Scriptable remote store. Server-side read state never changes, so it
/// behaves like a backend that lags behind confirmed mutations.
#[derive(Default)]
pub struct FakeRemote {
    pub server: Mutex<Vec<Notification>>,
    pub fail_fetch: AtomicBool,
    pub fail_mark: Mutex<HashSet<Uuid>>,
    pub fail_delete: AtomicBool,
    pub fail_batch: AtomicBool,
    pub batch_rejects: Mutex<HashSet<Uuid>>,
    /// Remove deleted ids from `server`; off means a lagging backend
    pub apply_deletes: AtomicBool,

    /// When set, each fetch waits for a permit
    pub fetch_gate: Option<Arc<Semaphore>>,
    /// When set, each mark_read waits for a permit
    pub mark_gate: Option<Arc<Semaphore>>,
    /// When set, each delete waits for a permit
    pub delete_gate: Option<Arc<Semaphore>>,

    pub fetch_calls: AtomicUsize,
    pub mark_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn with(items: Vec<Notification>) -> Self {
        Self { server: Mutex::new(items), ..Default::default() }
    }

    pub fn push_front(&self, n: Notification) {
        self.server.lock().unwrap().insert(0, n);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationRemote for FakeRemote {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<RemotePage, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.fetch_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RemoteError::Status { status: 502, body: "bad gateway".into() });
        }
        let server = self.server.lock().unwrap();
        let start = ((page - 1) * limit) as usize;
        Ok(RemotePage {
            items: server.iter().skip(start).take(limit as usize).cloned().collect(),
            total: server.len() as u64,
        })
    }

    async fn mark_read(&self, id: Uuid) -> Result<(), RemoteError> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.mark_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_mark.lock().unwrap().contains(&id) {
            return Err(RemoteError::Status { status: 503, body: "try later".into() });
        }
        Ok(())
    }

    async fn mark_all_read(&self, ids: &[Uuid]) -> Result<BatchOutcome, RemoteError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_batch.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        let rejects = self.batch_rejects.lock().unwrap();
        Ok(BatchOutcome {
            failed: ids.iter().copied().filter(|id| rejects.contains(id)).collect(),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.delete_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RemoteError::Status { status: 500, body: "boom".into() });
        }
        if self.apply_deletes.load(Ordering::SeqCst) {
            self.server.lock().unwrap().retain(|n| n.id != id);
        }
        Ok(())
    }
}

pub fn store_with(remote: Arc<FakeRemote>, page_limit: u32) -> NotificationStore {
    let config = StoreConfig { page_limit, ..StoreConfig::default() };
    NotificationStore::with_logger(remote, config, Arc::new(NullLogger))
}
