use std::collections::HashSet;

use uuid::Uuid;

use herald_types::models::Notification;

use crate::error::{RemoteError, Result, StoreError};
use crate::events::StoreEvent;
use crate::store::NotificationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    Marked,
    /// Nothing to do, the notification was already read
    AlreadyRead,
}

/// Per-id result of `mark_all_as_read`. Failed ids are unread again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkAllOutcome {
    pub marked: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

/// Index a restored record goes back to: in front of the first entry
/// strictly older than it, so equal timestamps keep their relative order.
pub(crate) fn restore_index(items: &[Notification], record: &Notification) -> usize {
    items
        .iter()
        .position(|n| n.created_at < record.created_at)
        .unwrap_or(items.len())
}

impl NotificationStore {
    /// Mark one notification read, optimistically.
    ///
    /// The local flag flips before the remote call; if the remote rejects it
    /// the flag goes back to unread and the error is returned.
    pub async fn mark_as_read(&self, id: Uuid) -> Result<MarkReadOutcome> {
        self.ensure_open()?;
        let _id_guard = self.lock_id(id).await;

        {
            let mut state = self.write_live().await.ok_or(StoreError::Closed)?;
            let n = state
                .items
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(StoreError::NotFound(id))?;
            if n.is_read {
                return Ok(MarkReadOutcome::AlreadyRead);
            }
            n.is_read = true;
        }
        self.emit("mutation", StoreEvent::MarkedRead { id });

        match self.inner.remote.mark_read(id).await {
            Ok(()) => Ok(MarkReadOutcome::Marked),
            Err(e) => {
                let error = StoreError::from(e);
                self.revert_read(&[id], &error).await;
                Err(error)
            }
        }
    }

    /// Mark every loaded unread notification read with one batch call.
    ///
    /// Only the ids the remote reports as failed are rolled back. If the
    /// whole call fails, all of them are and the error is returned.
    pub async fn mark_all_as_read(&self) -> Result<MarkAllOutcome> {
        self.ensure_open()?;

        let mut candidates: Vec<Uuid> = {
            let state = self.inner.state.read().await;
            state.items.iter().filter(|n| !n.is_read).map(|n| n.id).collect()
        };
        if candidates.is_empty() {
            return Ok(MarkAllOutcome::default());
        }

        // Sorted so two batches can't deadlock on each other's ids.
        candidates.sort();
        let mut guards = Vec::with_capacity(candidates.len());
        for id in &candidates {
            guards.push(self.lock_id(*id).await);
        }

        let ids: Vec<Uuid> = {
            let mut state = self.write_live().await.ok_or(StoreError::Closed)?;
            let wanted: HashSet<Uuid> = candidates.into_iter().collect();
            state
                .items
                .iter_mut()
                .filter(|n| !n.is_read && wanted.contains(&n.id))
                .map(|n| {
                    n.is_read = true;
                    n.id
                })
                .collect()
        };
        if ids.is_empty() {
            return Ok(MarkAllOutcome::default());
        }
        self.emit("mutation", StoreEvent::MarkedAllRead { ids: ids.clone() });

        match self.inner.remote.mark_all_read(&ids).await {
            Ok(batch) => {
                let failed_set: HashSet<Uuid> = batch.failed.into_iter().collect();
                let (failed, marked): (Vec<Uuid>, Vec<Uuid>) =
                    ids.into_iter().partition(|id| failed_set.contains(id));

                if !failed.is_empty() {
                    let error = StoreError::Remote(RemoteError::Rejected(format!(
                        "{} of {} notifications could not be marked read",
                        failed.len(),
                        failed.len() + marked.len()
                    )));
                    self.revert_read(&failed, &error).await;
                }
                Ok(MarkAllOutcome { marked, failed })
            }
            Err(e) => {
                let error = StoreError::from(e);
                self.revert_read(&ids, &error).await;
                Err(error)
            }
        }
    }

    /// Remove a notification, optimistically.
    ///
    /// On remote failure the record is put back where its `created_at`
    /// places it and the error is returned.
    pub async fn delete_notification(&self, id: Uuid) -> Result<()> {
        self.ensure_open()?;
        let _id_guard = self.lock_id(id).await;

        let removed = {
            let mut state = self.write_live().await.ok_or(StoreError::Closed)?;
            let pos = state
                .items
                .iter()
                .position(|n| n.id == id)
                .ok_or(StoreError::NotFound(id))?;
            let removed = state.items.remove(pos);
            state.deleted.insert(id);
            state.pagination.total = state.pagination.total.saturating_sub(1);
            removed
        };
        self.emit("mutation", StoreEvent::Deleted { id });

        match self.inner.remote.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let error = StoreError::from(e);
                let Some(mut state) = self.write_live().await else {
                    return Err(error);
                };
                state.deleted.remove(&id);
                let index = restore_index(&state.items, &removed);
                if !state.items.iter().any(|n| n.id == id) {
                    state.items.insert(index, removed);
                    state.pagination.total += 1;
                }
                drop(state);

                self.emit(
                    "mutation",
                    StoreEvent::DeleteReverted { id, index, error: error.to_string() },
                );
                Err(error)
            }
        }
    }

    async fn revert_read(&self, ids: &[Uuid], error: &StoreError) {
        let Some(mut state) = self.write_live().await else {
            return;
        };
        let ids: HashSet<Uuid> = ids.iter().copied().collect();
        let mut reverted = Vec::new();
        for n in state.items.iter_mut().filter(|n| ids.contains(&n.id)) {
            n.is_read = false;
            reverted.push(n.id);
        }
        drop(state);

        for id in reverted {
            self.emit("mutation", StoreEvent::ReadReverted { id, error: error.to_string() });
        }
    }
}
