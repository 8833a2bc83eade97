use tokio::sync::mpsc;

/// A unit of result delivery: invokes one listener callback.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Decides where preview callbacks run.
///
/// The executor hands every finished preview to `deliver`; implementations
/// choose the thread (or event loop) that runs the job.
pub trait Deliver: Send + Sync {
    fn deliver(&self, job: Job);
}

/// Runs callbacks directly on the worker task that produced the result.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineDelivery;

impl Deliver for InlineDelivery {
    fn deliver(&self, job: Job) {
        job();
    }
}

/// Queues callbacks for a [`DeliveryQueue`] drained by the caller.
#[derive(Clone)]
pub struct ChannelDelivery {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half of a [`ChannelDelivery`]. Whoever owns it decides which
/// thread the callbacks run on.
pub struct DeliveryQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

/// Create a connected delivery/queue pair.
pub fn channel() -> (ChannelDelivery, DeliveryQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelDelivery { tx }, DeliveryQueue { rx })
}

impl Deliver for ChannelDelivery {
    fn deliver(&self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::debug!("Delivery queue dropped; discarding preview callback");
        }
    }
}

impl DeliveryQueue {
    /// Run every callback queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next callback and run it.
    ///
    /// Returns `false` once every [`ChannelDelivery`] has been dropped and the
    /// queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}
