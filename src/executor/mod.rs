//! Callback-style previews on a caller-owned tokio runtime.
//!
//! Each call runs fetch + extract on its own task and hands the outcome to a
//! [`Deliver`] implementation, which decides where the listener runs.

pub mod delivery;

pub use delivery::{channel, ChannelDelivery, Deliver, DeliveryQueue, InlineDelivery, Job};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::models::PreviewResult;
use crate::preview::LinkPreview;

/// Receives the outcome of one preview call. Exactly one method is called,
/// unless the call is cancelled first, in which case neither is.
pub trait PreviewListener: Send + 'static {
    fn on_success(self, result: PreviewResult);
    fn on_failure(self, error: FetchError);
}

/// [`PreviewListener`] built from a pair of closures.
pub struct FnListener<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> FnListener<S, F>
where
    S: FnOnce(PreviewResult) + Send + 'static,
    F: FnOnce(FetchError) + Send + 'static,
{
    pub fn new(on_success: S, on_failure: F) -> Self {
        Self {
            on_success,
            on_failure,
        }
    }
}

impl<S, F> PreviewListener for FnListener<S, F>
where
    S: FnOnce(PreviewResult) + Send + 'static,
    F: FnOnce(FetchError) + Send + 'static,
{
    fn on_success(self, result: PreviewResult) {
        (self.on_success)(result)
    }

    fn on_failure(self, error: FetchError) {
        (self.on_failure)(error)
    }
}

/// Handle to one in-flight preview.
#[derive(Debug, Clone)]
pub struct PreviewTask {
    token: CancellationToken,
    abort: AbortHandle,
}

impl PreviewTask {
    /// Stop the request and withdraw the callback if it has not run yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the worker task has ended. The callback may still be queued
    /// with the delivery.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Runs previews in the background and reports back through listeners.
///
/// The runtime is supplied by the caller; the executor never creates threads
/// of its own. Cancelling the executor is final.
pub struct PreviewExecutor {
    preview: Arc<LinkPreview>,
    runtime: Handle,
    delivery: Arc<dyn Deliver>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PreviewExecutor {
    /// Listeners run inline on the worker task.
    pub fn new(preview: LinkPreview, runtime: Handle) -> Self {
        Self::with_delivery(preview, runtime, Arc::new(InlineDelivery))
    }

    pub fn with_delivery(preview: LinkPreview, runtime: Handle, delivery: Arc<dyn Deliver>) -> Self {
        Self {
            preview: Arc::new(preview),
            runtime,
            delivery,
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start previewing `url`. Returns `None` if the executor was cancelled,
    /// in which case the listener is dropped uncalled.
    pub fn load_preview<L: PreviewListener>(&self, url: &str, listener: L) -> Option<PreviewTask> {
        if self.shutdown.is_cancelled() {
            tracing::warn!(url = %url, "Preview executor is cancelled; ignoring request");
            return None;
        }

        let token = self.shutdown.child_token();
        let task_token = token.clone();
        let preview = Arc::clone(&self.preview);
        let delivery = Arc::clone(&self.delivery);
        let url = url.to_string();

        let handle = self.runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = task_token.cancelled() => {
                    tracing::debug!(url = %url, "Preview cancelled before completion");
                    return;
                }
                outcome = preview.load_preview(&url) => outcome,
            };

            delivery.deliver(Box::new(move || {
                if task_token.is_cancelled() {
                    tracing::debug!(url = %url, "Withdrawing preview callback after cancellation");
                    return;
                }
                match outcome {
                    Ok(result) => listener.on_success(result),
                    Err(error) => listener.on_failure(error),
                }
            }));
        });

        let task = PreviewTask {
            token,
            abort: handle.abort_handle(),
        };

        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);

        Some(task)
    }

    /// Closure form of [`load_preview`](Self::load_preview).
    pub fn load_preview_with<S, F>(&self, url: &str, on_success: S, on_failure: F) -> Option<PreviewTask>
    where
        S: FnOnce(PreviewResult) + Send + 'static,
        F: FnOnce(FetchError) + Send + 'static,
    {
        self.load_preview(url, FnListener::new(on_success, on_failure))
    }

    /// Number of worker tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel every pending preview and refuse new ones. Callbacks that have
    /// not run yet are withdrawn.
    pub fn cancel(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(pending = self.pending(), "Cancelling link previews");
        }
        self.shutdown.cancel();
    }

    /// Cancel, then wait up to `grace` for workers to stop before aborting
    /// the stragglers.
    pub async fn shutdown(&self, grace: Duration) {
        self.cancel();

        let handles = std::mem::take(&mut *self.tasks.lock().unwrap());
        let deadline = tokio::time::Instant::now() + grace;
        let mut forced = 0;

        for handle in handles {
            let abort = handle.abort_handle();
            if tokio::time::timeout_at(deadline, handle).await.is_err() {
                abort.abort();
                forced += 1;
            }
        }

        if forced > 0 {
            tracing::warn!(forced, "Aborted preview tasks that outlived the grace period");
        } else {
            tracing::info!("Preview executor shut down");
        }
    }
}
