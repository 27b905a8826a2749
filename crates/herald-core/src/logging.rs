//! Store activity logging.
//!
//! The store reports every state change through a `StoreLogger` so
//! embedders can route it to `tracing`, to their own sink, or nowhere.

use crate::events::StoreEvent;

/// Structured log entry for one store change.
#[derive(Debug, Clone)]
pub struct StoreLog {
    pub component: &'static str,
    pub event: StoreEvent,
}

pub trait StoreLogger: Send + Sync {
    fn log(&self, entry: StoreLog);
}

/// Logger that uses the `tracing` crate.
pub struct TracingLogger;

impl StoreLogger for TracingLogger {
    fn log(&self, entry: StoreLog) {
        // warn for rollbacks, debug for routine fetch chatter
        match &entry.event {
            StoreEvent::FetchFailed { .. }
            | StoreEvent::ReadReverted { .. }
            | StoreEvent::DeleteReverted { .. } => {
                tracing::warn!(component = entry.component, "{}", entry.event);
            }
            StoreEvent::FetchStarted { .. } | StoreEvent::PageMerged { .. } => {
                tracing::debug!(component = entry.component, "{}", entry.event);
            }
            _ => {
                tracing::info!(component = entry.component, "{}", entry.event);
            }
        }
    }
}

/// No-op logger that discards all log entries.
pub struct NullLogger;

impl StoreLogger for NullLogger {
    fn log(&self, _entry: StoreLog) {}
}
