use std::collections::{HashMap, HashSet};
use std::pin::pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Notify;
use tracing::debug;
use uuid::Uuid;

use herald_types::models::Notification;

use crate::config::MAX_PAGE_LIMIT;
use crate::error::{Result, StoreError};
use crate::events::StoreEvent;
use crate::mutation::restore_index;
use crate::store::NotificationStore;

/// Result of one page fetch, as seen after merging.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub items: Vec<Notification>,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Refreshed(PageResult),
    /// Another page-1 fetch was already running
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MergeStats {
    pub inserted: usize,
    pub refreshed: usize,
}

/// Merge a fetched page into `items`.
///
/// Known ids are refreshed in place (read state only moves forward) and
/// ids in `deleted` or repeated within the page are skipped. Unseen ids keep
/// their place relative to the known ids of the page: in front of the next
/// known id, or after the last one. A page with no known id at all goes
/// where its first entry's `created_at` puts it.
pub(crate) fn merge_page(
    items: &mut Vec<Notification>,
    fetched: Vec<Notification>,
    deleted: &HashSet<Uuid>,
) -> MergeStats {
    let index: HashMap<Uuid, usize> = items.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
    let mut seen = HashSet::with_capacity(fetched.len());
    let mut stats = MergeStats::default();

    // Unseen ids keyed by the index of the known entry they precede
    let mut before: HashMap<usize, Vec<Notification>> = HashMap::new();
    let mut pending = Vec::new();
    let mut last_known = None;

    for n in fetched {
        if deleted.contains(&n.id) || !seen.insert(n.id) {
            continue;
        }
        match index.get(&n.id) {
            Some(&i) => {
                items[i].refresh_from(n);
                stats.refreshed += 1;
                if !pending.is_empty() {
                    before.entry(i).or_default().append(&mut pending);
                }
                last_known = Some(i);
            }
            None => pending.push(n),
        }
    }

    stats.inserted = before.values().map(Vec::len).sum::<usize>() + pending.len();
    if stats.inserted == 0 {
        return stats;
    }

    let mut trailing = last_known.map(|i| (i, std::mem::take(&mut pending)));
    let orphans = pending;

    let existing = std::mem::take(items);
    items.reserve(existing.len() + stats.inserted);
    for (i, n) in existing.into_iter().enumerate() {
        if let Some(group) = before.remove(&i) {
            items.extend(group);
        }
        items.push(n);
        if trailing.as_ref().is_some_and(|(last, _)| *last == i) {
            if let Some((_, group)) = trailing.take() {
                items.extend(group);
            }
        }
    }

    if let Some(first) = orphans.first() {
        let at = restore_index(items, first);
        items.splice(at..at, orphans);
    }
    stats
}

/// Holds the store's page-1 flag; released on drop so a cancelled refresh
/// doesn't wedge the poller. Waiters on `done` are woken on release.
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
    done: &'a Notify,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool, done: &'a Notify) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, done })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.done.notify_waiters();
    }
}

/// Counts a fetch as in flight for `loading()` until dropped.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(count)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl NotificationStore {
    /// Fetch one page and merge it into the collection.
    ///
    /// Unseen notifications land next to the known ids they neighbour in the
    /// fetched page. Page 1 is a refresh and only one page-1 fetch runs at a
    /// time (`StoreError::RefreshInFlight` otherwise). On failure the
    /// collection is kept and the error is recorded for `error()`.
    pub async fn fetch_notifications(&self, page: u32, limit: u32) -> Result<PageResult> {
        if page == 0 || limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(StoreError::InvalidPage { page, limit });
        }
        self.ensure_open()?;

        let _refresh = if page == 1 {
            let guard =
                RefreshGuard::acquire(&self.inner.refresh_in_flight, &self.inner.refresh_done);
            Some(guard.ok_or(StoreError::RefreshInFlight)?)
        } else {
            None
        };
        let _loading = LoadingGuard::enter(&self.inner.fetches_in_flight);
        self.emit("fetch", StoreEvent::FetchStarted { page });

        let result = self.inner.remote.fetch_page(page, limit).await;

        let Some(mut state) = self.write_live().await else {
            debug!("Dropping page {} response, store is closed", page);
            return Err(StoreError::Closed);
        };

        let remote_page = match result {
            Ok(p) => p,
            Err(e) => {
                state.error = Some(StoreError::Remote(e.clone()));
                drop(state);
                self.emit("fetch", StoreEvent::FetchFailed { page, error: e.to_string() });
                return Err(e.into());
            }
        };

        let fetched_ids: Vec<Uuid> = remote_page.items.iter().map(|n| n.id).collect();

        let state = &mut *state;
        let stats = merge_page(&mut state.items, remote_page.items, &state.deleted);

        // A page only counts as loaded when it extends the run from page 1
        // at the same limit. Anything else is merged but leaves `page` alone.
        let pagination = &mut state.pagination;
        if page == pagination.page + 1 && (pagination.page == 0 || limit == pagination.limit) {
            pagination.page = page;
            pagination.limit = limit;
        } else if page == 1 && pagination.page == 1 {
            pagination.limit = limit;
        } else if page > pagination.page || limit != pagination.limit {
            debug!(
                "Page {} (limit {}) merged out of sequence, pagination stays at page {} (limit {})",
                page, limit, pagination.page, pagination.limit
            );
        }
        pagination.total = remote_page.total;
        state.error = None;

        let items = fetched_ids
            .iter()
            .filter_map(|id| state.items.iter().find(|n| n.id == *id).cloned())
            .collect();
        let result = PageResult {
            items,
            total: remote_page.total,
            has_more: (page as u64) * (limit as u64) < remote_page.total,
        };

        self.emit(
            "fetch",
            StoreEvent::PageMerged {
                page,
                inserted: stats.inserted,
                refreshed: stats.refreshed,
                total: remote_page.total,
            },
        );
        Ok(result)
    }

    /// Re-fetch page 1 out of band with the current page size.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let limit = self.pagination().await.limit;
        match self.fetch_notifications(1, limit).await {
            Ok(page) => Ok(RefreshOutcome::Refreshed(page)),
            Err(StoreError::RefreshInFlight) => {
                debug!("Refresh already in flight, skipping");
                Ok(RefreshOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the page after the last loaded one. `None` when everything the
    /// remote reported is loaded.
    ///
    /// On an empty store this loads page 1. If a page-1 fetch is already
    /// running it waits for that one and then continues from its result.
    pub async fn load_more(&self) -> Result<Option<PageResult>> {
        loop {
            let pagination = self.pagination().await;
            if pagination.page == 0 {
                match self.fetch_notifications(1, pagination.limit).await {
                    Ok(page) => return Ok(Some(page)),
                    Err(StoreError::RefreshInFlight) => {
                        self.wait_for_refresh().await;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            if !pagination.can_load_more() {
                return Ok(None);
            }
            return self
                .fetch_notifications(pagination.page + 1, pagination.limit)
                .await
                .map(Some);
        }
    }

    /// Load further pages until `id` is in the collection. `false` when the
    /// remote ran out of pages first.
    pub async fn load_until(&self, id: Uuid) -> Result<bool> {
        loop {
            if self.inner.state.read().await.items.iter().any(|n| n.id == id) {
                return Ok(true);
            }
            if self.load_more().await?.is_none() {
                return Ok(false);
            }
        }
    }

    /// Resolve once no page-1 fetch is running.
    async fn wait_for_refresh(&self) {
        let mut released = pin!(self.inner.refresh_done.notified());
        released.as_mut().enable();
        if self.inner.refresh_in_flight.load(Ordering::Acquire) {
            released.await;
        }
    }
}
