//! Fan-out/fan-in coordinator: launch N tasks at once, wait for all of them,
//! and return their outcomes in submission order.
//!
//! Every task gets its own tokio task, a sender on a channel sized to the
//! batch (so sends never wait) and a [`CompletionGuard`]. The coordinator
//! waits on the [`CompletionSignal`], closes the channel, then drains it into
//! index-addressed slots. Completion order never leaks into the result.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::sync::{CompletionGuard, CompletionSignal};
use crate::types::{Batch, Outcome};

/// Optional guards applied to every task of a batch.
///
/// Both are off by default, so a batch launches all tasks at once and lets
/// each run to completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of tasks running at the same time (None = unbounded)
    pub max_in_flight: Option<usize>,
    /// Deadline per task; an expired task records [`TaskError::Timeout`]
    pub task_timeout: Option<Duration>,
}

/// Runs batches of independent tasks and gathers their outcomes.
#[derive(Clone, Debug, Default)]
pub struct Coordinator {
    options: BatchOptions,
}

impl Coordinator {
    /// Create a coordinator with the given guards
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// The guards this coordinator applies
    pub fn options(&self) -> BatchOptions {
        self.options
    }

    /// Run `count` tasks concurrently and return every outcome in index order.
    ///
    /// `factory` is called once per index, in order, on the caller's task;
    /// the futures it returns run on the runtime's worker threads. The call
    /// returns only after every task has reported. Task failures are recorded
    /// in the batch; this method itself cannot fail.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`MAX_BATCH_SIZE`], the largest capacity a
    /// tokio channel supports.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fanout_facts::{Coordinator, TaskError};
    ///
    /// # async fn example() {
    /// let batch = Coordinator::default()
    ///     .run(3, |index| async move { Ok::<_, TaskError>(index * 2) })
    ///     .await;
    ///
    /// assert_eq!(batch.len(), 3);
    /// assert_eq!(batch[2].value(), Some(&4));
    /// # }
    /// ```
    pub async fn run<T, F, Fut>(&self, count: usize, factory: F) -> Batch<T>
    where
        T: Send + 'static,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        self.run_until_cancelled(count, factory, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but tasks still running when `cancel` fires
    /// record [`TaskError::Cancelled`]. The batch is still complete: one
    /// outcome per index.
    pub async fn run_until_cancelled<T, F, Fut>(
        &self,
        count: usize,
        mut factory: F,
        cancel: CancellationToken,
    ) -> Batch<T>
    where
        T: Send + 'static,
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        if count == 0 {
            tracing::debug!("Empty batch, nothing to spawn");
            return Batch::empty();
        }

        let started = std::time::Instant::now();
        tracing::info!(
            count,
            max_in_flight = ?self.options.max_in_flight,
            task_timeout_ms = ?self.options.task_timeout.map(|d| d.as_millis()),
            "Starting batch"
        );

        let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome<T>>(count);
        let signal = CompletionSignal::new(count);
        // A limit at or above `count` bounds nothing
        let limiter = self
            .options
            .max_in_flight
            .filter(|&limit| limit < count)
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        for index in 0..count {
            let worker = Worker {
                index,
                outcome_tx: outcome_tx.clone(),
                done: signal.guard(),
                limiter: limiter.clone(),
                task_timeout: self.options.task_timeout,
                cancel: cancel.clone(),
            };
            tokio::spawn(worker.run(factory(index)));
        }
        // Only workers hold senders from here on
        drop(outcome_tx);

        signal.wait().await;
        outcome_rx.close();

        let mut received = Vec::with_capacity(count);
        while let Some(outcome) = outcome_rx.recv().await {
            received.push(outcome);
        }
        let outcomes = assemble_slots(count, received);
        let batch = Batch::from_ordered(outcomes);

        tracing::info!(
            count,
            succeeded = batch.success_count(),
            failed = batch.failure_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );
        batch
    }
}

/// Run `count` tasks with default options.
///
/// Shorthand for `Coordinator::default().run(count, factory)`.
pub async fn run_batch<T, F, Fut>(count: usize, factory: F) -> Batch<T>
where
    T: Send + 'static,
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    Coordinator::default().run(count, factory).await
}

/// Largest batch [`Coordinator::run`] accepts
pub const MAX_BATCH_SIZE: usize = Semaphore::MAX_PERMITS;

/// Place each outcome at its own index. Duplicates and out-of-range indices
/// are dropped; a slot nobody filled records [`TaskError::Lost`].
fn assemble_slots<T>(count: usize, received: Vec<Outcome<T>>) -> Vec<Outcome<T>> {
    let mut slots: Vec<Option<Outcome<T>>> = std::iter::repeat_with(|| None).take(count).collect();
    for outcome in received {
        match slots.get_mut(outcome.index()) {
            Some(slot @ None) => *slot = Some(outcome),
            Some(Some(_)) => {
                tracing::warn!(index = outcome.index(), "Duplicate outcome ignored");
            }
            None => {
                tracing::warn!(index = outcome.index(), count, "Outcome index out of range");
            }
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                tracing::error!(index, "No outcome recorded for task");
                Outcome::failure(index, TaskError::Lost)
            })
        })
        .collect()
}

/// Everything one spawned task needs besides its future.
struct Worker<T> {
    index: usize,
    outcome_tx: mpsc::Sender<Outcome<T>>,
    done: CompletionGuard,
    limiter: Option<Arc<Semaphore>>,
    task_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> Worker<T> {
    /// Execute the task, publish its outcome, then count it as finished.
    async fn run<Fut>(self, task: Fut)
    where
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let Worker {
            index,
            outcome_tx,
            done,
            limiter,
            task_timeout,
            cancel,
        } = self;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TaskError::Cancelled),
            result = execute(task, limiter, task_timeout) => result,
        };

        match &result {
            Ok(_) => tracing::debug!(index, "Task succeeded"),
            Err(e) => tracing::warn!(index, error = %e, "Task failed"),
        }

        // Capacity equals the batch size and each worker sends once, so this
        // never sees a full channel.
        match outcome_tx.try_send(Outcome::new(index, result)) {
            Ok(()) => {}
            // The caller stopped waiting for the batch
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(index, "Batch receiver gone, outcome discarded");
            }
            Err(TrySendError::Full(_)) => {
                tracing::error!(index, "Outcome channel full, outcome discarded");
            }
        }

        // Sent first, then counted
        drop(outcome_tx);
        drop(done);
    }
}

/// Wait for a permit if the batch is bounded, then run the task under its
/// deadline with panics turned into failures.
async fn execute<T, Fut>(
    task: Fut,
    limiter: Option<Arc<Semaphore>>,
    task_timeout: Option<Duration>,
) -> Result<T, TaskError>
where
    Fut: Future<Output = Result<T, TaskError>>,
{
    let _permit = match limiter {
        Some(semaphore) => Some(
            semaphore
                .acquire_owned()
                .await
                .map_err(|_| TaskError::Cancelled)?,
        ),
        None => None,
    };

    let caught = AssertUnwindSafe(task).catch_unwind();
    let joined = match task_timeout {
        Some(limit) => match tokio::time::timeout(limit, caught).await {
            Ok(joined) => joined,
            Err(_) => return Err(TaskError::Timeout { after: limit }),
        },
        None => caught.await,
    };

    joined.unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
