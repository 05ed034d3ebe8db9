//! Hand-off of work from network tasks to the consumer loop.
//!
//! The receive loop never touches consumer state directly. It schedules a
//! job through a [`Scheduler`] and the consumer runs queued jobs from its
//! [`Mailbox`] in its own turn, one at a time, in the order they were
//! scheduled.

use thiserror::Error;
use tokio::sync::mpsc;

/// Deferred unit of work against consumer state `S`.
pub type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

/// The consumer side of the mailbox has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mailbox closed")]
pub struct MailboxClosed;

/// Producer half. Cheap to clone and usable from any thread.
pub struct Scheduler<S> {
    tx: mpsc::UnboundedSender<Job<S>>,
}

impl<S> Clone for Scheduler<S> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<S> Scheduler<S> {
    /// Queue `job` to run on the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`MailboxClosed`] if the consumer is gone.
    pub fn schedule<F>(&self, job: F) -> Result<(), MailboxClosed>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx.send(Box::new(job)).map_err(|_| MailboxClosed)
    }
}

/// Consumer half.
pub struct Mailbox<S> {
    rx: mpsc::UnboundedReceiver<Job<S>>,
}

impl<S> Mailbox<S> {
    /// Wait for the next job. `None` once every scheduler is dropped.
    ///
    /// Cancel-safe: a job is never lost if the future is dropped.
    pub async fn recv(&mut self) -> Option<Job<S>> {
        self.rx.recv().await
    }

    /// Next job if one is queued.
    pub fn try_recv(&mut self) -> Option<Job<S>> {
        self.rx.try_recv().ok()
    }

    /// Run every queued job against `state`. Returns how many ran.
    pub fn run_pending(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Some(job) = self.try_recv() {
            job(state);
            ran += 1;
        }
        ran
    }
}

/// Create a connected scheduler/mailbox pair.
pub fn mailbox<S>() -> (Scheduler<S>, Mailbox<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Scheduler { tx }, Mailbox { rx })
}
