//! Debounced remote search and the in-memory filter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ModelApi, SEARCH_LIMIT, search_records};
use crate::resource::Resource;

/// Delays values and only lets the last one of a burst through.
///
/// Every [`push`](Debouncer::push) aborts the pending timer; a value is
/// delivered on the [`Settled`] receiver once `delay` passes without a newer
/// push. Each value is stamped with the push generation, so a value that
/// already fired but was superseded or cancelled before being received is
/// dropped. Dropping the debouncer cancels the timer.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<(u64, T)>,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

/// Receiving half of a [`Debouncer`]; yields only the latest live value.
pub struct Settled<T> {
    rx: mpsc::UnboundedReceiver<(u64, T)>,
    generation: Arc<AtomicU64>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, Settled<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        (
            Self {
                delay,
                tx,
                generation: generation.clone(),
                pending: None,
            },
            Settled { rx, generation },
        )
    }

    pub fn push(&mut self, value: T) {
        self.cancel();
        let stamp = self.generation.load(Ordering::SeqCst);
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send((stamp, value));
        }));
    }

    /// Stops the timer and invalidates anything already delivered but not
    /// yet received.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Settled<T> {
    fn is_live(&self, stamp: u64) -> bool {
        stamp == self.generation.load(Ordering::SeqCst)
    }

    /// Waits for the next live value. Returns `None` once the debouncer is
    /// gone.
    pub async fn recv(&mut self) -> Option<T> {
        while let Some((stamp, value)) = self.rx.recv().await {
            if self.is_live(stamp) {
                return Some(value);
            }
        }
        None
    }

    /// Takes a live value if one is queued, discarding stale ones.
    pub fn try_recv(&mut self) -> Option<T> {
        while let Ok((stamp, value)) = self.rx.try_recv() {
            if self.is_live(stamp) {
                return Some(value);
            }
        }
        None
    }
}

/// Waits for the next debounced value, or returns `None` at once when no
/// timer is running and nothing live is queued.
pub async fn next_settled<T: Send + 'static>(
    debouncer: &Debouncer<T>,
    rx: &mut Settled<T>,
) -> Option<T> {
    if !debouncer.is_pending() {
        return rx.try_recv();
    }
    rx.recv().await
}

pub type ResultsCallback<R> = Box<dyn FnMut(Vec<R>) + Send>;

/// Search box backed by `search_model`.
///
/// A blank query cancels the pending timer and delivers nothing; the caller
/// keeps showing its unfiltered rows. A failed search delivers an empty list
/// and keeps the error for display.
pub struct RemoteSearch<R: Resource> {
    api: Arc<dyn ModelApi>,
    debouncer: Debouncer<String>,
    rx: Settled<String>,
    on_results: ResultsCallback<R>,
    last_error: Option<String>,
}

impl<R: Resource> RemoteSearch<R> {
    pub fn new(api: Arc<dyn ModelApi>, delay: Duration, on_results: ResultsCallback<R>) -> Self {
        let (debouncer, rx) = Debouncer::new(delay);
        Self {
            api,
            debouncer,
            rx,
            on_results,
            last_error: None,
        }
    }

    pub fn input(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.debouncer.cancel();
            return;
        }
        self.debouncer.push(query.trim().to_string());
    }

    /// Runs the search for the settled query, if any. Returns whether a
    /// search was issued.
    pub async fn settle(&mut self) -> bool {
        let Some(query) = next_settled(&self.debouncer, &mut self.rx).await else {
            return false;
        };
        self.run(&query).await;
        true
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    async fn run(&mut self, query: &str) {
        debug!("Searching {} for {:?}", R::MODEL, query);
        match search_records::<R>(self.api.as_ref(), query, SEARCH_LIMIT).await {
            Ok(results) => {
                self.last_error = None;
                (self.on_results)(results);
            }
            Err(e) => {
                warn!("Search in {} failed: {}", R::MODEL, e);
                self.last_error = Some(e.to_string());
                (self.on_results)(Vec::new());
            }
        }
    }
}

/// Case-insensitive substring filter over each row's search fields. An empty
/// query keeps every row.
pub fn local_filter<R: Resource>(rows: &[R], query: &str) -> Vec<R> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| {
            row.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}
