//! Running a search on a background thread with streamed progress.

use crate::multilevel::IndexSnapshot;
use crate::search::{SearchEvent, SearchResult};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strata_common::{RecordId, Result, StrataError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Events buffered between the search thread and the consumer.
///
/// Kept at one so the search advances only as fast as events are read.
const EVENT_BUFFER: usize = 1;

/// A search running on tokio's blocking pool.
///
/// The task owns its snapshot, so later inserts, deletes, or rebuilds on the
/// index never affect it. Dropping the event receiver or calling `cancel`
/// stops event delivery; the search then ends with `SearchOutcome::Cancelled`.
pub struct SearchTask {
    events: mpsc::Receiver<SearchEvent>,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<SearchResult>,
}

/// Starts searching `snapshot` for `id` on a blocking thread.
///
/// Must be called from within a tokio runtime.
pub fn spawn_search(snapshot: Arc<IndexSnapshot>, id: RecordId) -> SearchTask {
    let (tx, events) = mpsc::channel(EVENT_BUFFER);
    let cancelled = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&cancelled);
    let handle = tokio::task::spawn_blocking(move || {
        let mut sink = |event: &SearchEvent| {
            if flag.load(Ordering::Acquire) {
                return ControlFlow::Break(());
            }
            match tx.blocking_send(event.clone()) {
                Ok(()) => ControlFlow::Continue(()),
                // Receiver gone: nobody is watching.
                Err(_) => ControlFlow::Break(()),
            }
        };
        let result = snapshot.search_with_progress(id, &mut sink);
        trace!(id, outcome = ?result.outcome, "background search finished");
        result
    });

    SearchTask {
        events,
        cancelled,
        handle,
    }
}

impl SearchTask {
    /// Waits for the next progress event. Returns None once the search has ended.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        self.events.recv().await
    }

    /// Requests cancellation. Events already buffered may still be received.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Drains remaining events and waits for the result.
    pub async fn join(mut self) -> Result<SearchResult> {
        while self.events.recv().await.is_some() {}
        self.handle
            .await
            .map_err(|e| StrataError::Internal(format!("search task failed: {e}")))
    }
}
