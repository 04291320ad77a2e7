//! Bounded, concurrently processing pipeline stages.
//!
//! A [`Stage`] owns a bounded input queue and a driver task that runs up to
//! `parallelism` items through its [`StageHandler`] at once. Outputs are
//! forwarded through an optional [`StageLink`] to the next stage's
//! [`StageTarget`]. Completion flows downstream: a stage completes once its
//! input is closed and every in-flight item has been forwarded, and then it
//! completes the stage it links to.
//!
//! ```text
//!  submit ──▶ [queue] ──▶ driver ──▶ handler × N ──▶ link(filter) ──▶ next stage
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::PipelineConfig;
use crate::core::errors::{Result, TestforgeError};

/// Work performed by one stage on one item.
#[async_trait]
pub trait StageHandler: Send + Sync + 'static {
    /// Item accepted by the stage
    type Input: Send + 'static;
    /// Item forwarded downstream
    type Output: Send + 'static;

    /// Short label identifying an item in failure records and logs
    fn describe(&self, input: &Self::Input) -> String;

    /// Process one item. `Ok(None)` consumes the item without forwarding.
    async fn process(&self, input: Self::Input) -> Result<Option<Self::Output>>;
}

/// Lifecycle of a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageState {
    /// Accepting or processing items
    Running,
    /// Input closed and fully drained
    Completed,
    /// Stopped by a fault; carries the reason
    Faulted(String),
}

impl StageState {
    /// True once the stage will not change state again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StageState::Running)
    }
}

/// A failure of one item in one stage
#[derive(Debug)]
pub struct ItemFailure {
    /// Stage that failed the item
    pub stage: String,
    /// Label of the failed item
    pub item: String,
    /// What went wrong
    pub error: TestforgeError,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.item, self.error)
    }
}

/// Shared, append-only record of item failures
#[derive(Debug, Clone, Default)]
pub struct FailureLog {
    entries: Arc<Mutex<Vec<ItemFailure>>>,
}

impl FailureLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn record(&self, failure: ItemFailure) {
        warn!(stage = %failure.stage, item = %failure.item, error = %failure.error, "item failed");
        self.entries.lock().push(failure);
    }

    /// Number of failures recorded so far
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing has failed
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove and return every recorded failure
    pub fn take(&self) -> Vec<ItemFailure> {
        std::mem::take(&mut *self.entries.lock())
    }
}

/// Scheduling options for one stage
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Items processed at once
    pub parallelism: usize,
    /// Capacity of the input queue
    pub capacity: usize,
    /// Keep processing queued items after a fault
    pub drain_on_fault: bool,
    /// Where item failures are recorded
    pub failures: FailureLog,
}

impl StageOptions {
    /// Options derived from pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            parallelism: config.effective_parallelism().max(1),
            capacity: config.queue_capacity.max(1),
            drain_on_fault: config.drain_on_fault,
            failures: FailureLog::new(),
        }
    }

    /// Record failures into an existing log
    pub fn with_failures(mut self, failures: FailureLog) -> Self {
        self.failures = failures;
        self
    }
}

impl Default for StageOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

struct TargetShared<I> {
    name: Arc<str>,
    sender: Mutex<Option<mpsc::Sender<I>>>,
    fault_reason: Mutex<Option<String>>,
    cancel: CancellationToken,
    state: watch::Receiver<StageState>,
}

/// Cloneable handle used to feed a stage and observe its completion
pub struct StageTarget<I> {
    shared: Arc<TargetShared<I>>,
}

impl<I> Clone for StageTarget<I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<I> fmt::Debug for StageTarget<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageTarget")
            .field("name", &self.shared.name)
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}

impl<I: Send + 'static> StageTarget<I> {
    /// Stage name
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Queue an item, waiting for room. Returns `false` once the stage no
    /// longer accepts input.
    pub async fn submit(&self, item: I) -> bool {
        let sender = self.shared.sender.lock().clone();
        match sender {
            Some(sender) => sender.send(item).await.is_ok(),
            None => false,
        }
    }

    /// Queue an item without waiting. Returns `false` when the queue is
    /// full or closed.
    pub fn try_submit(&self, item: I) -> bool {
        match self.shared.sender.lock().as_ref() {
            Some(sender) => sender.try_send(item).is_ok(),
            None => false,
        }
    }

    /// Signal that no more items will be submitted
    pub fn complete(&self) {
        if self.shared.sender.lock().take().is_some() {
            debug!(stage = %self.shared.name, "input completed");
        }
    }

    /// Stop accepting input and fail the stage's completion.
    ///
    /// Items already running finish; queued items are processed or
    /// discarded depending on [`StageOptions::drain_on_fault`].
    pub fn fault(&self, reason: impl Into<String>) {
        let reason = reason.into();
        {
            let mut slot = self.shared.fault_reason.lock();
            if slot.is_none() {
                warn!(stage = %self.shared.name, %reason, "stage faulted");
                *slot = Some(reason);
            }
        }
        self.shared.sender.lock().take();
        self.shared.cancel.cancel();
    }

    /// Current lifecycle state
    pub fn state(&self) -> StageState {
        self.shared.state.borrow().clone()
    }

    /// Wait until the stage has drained. Resolves to an error if the stage
    /// (or any stage upstream of it) was faulted.
    pub async fn completion(&self) -> Result<()> {
        let mut state = self.shared.state.clone();
        let terminal: StageState = {
            let current = state.wait_for(StageState::is_terminal).await.map_err(|_| {
                TestforgeError::pipeline(self.name(), "stage driver stopped unexpectedly")
            })?;
            (*current).clone()
        };

        match terminal {
            StageState::Faulted(reason) => Err(TestforgeError::pipeline(self.name(), reason)),
            _ => Ok(()),
        }
    }
}

type LinkFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Connection from a stage's output to the next stage's input
pub struct StageLink<T> {
    target: StageTarget<T>,
    filter: Option<LinkFilter<T>>,
    dropped: Arc<AtomicUsize>,
}

impl<T> Clone for StageLink<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            filter: self.filter.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }
}

/// What happened to an item handed to a [`StageLink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarded {
    /// Accepted by the next stage
    Accepted,
    /// Dropped by the link's filter
    Filtered,
    /// The next stage no longer accepts input
    Rejected,
}

impl<T: Send + 'static> StageLink<T> {
    /// Forward every item to `target`
    pub fn new(target: StageTarget<T>) -> Self {
        Self {
            target,
            filter: None,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Forward only items matching `predicate`; the rest are counted and dropped
    pub fn filtered<F>(target: StageTarget<T>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            filter: Some(Arc::new(predicate)),
            ..Self::new(target)
        }
    }

    /// Shared counter of filtered items
    pub fn dropped_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.dropped)
    }

    /// Downstream target
    pub fn target(&self) -> &StageTarget<T> {
        &self.target
    }

    /// Pass an item downstream
    pub async fn forward(&self, item: T) -> Forwarded {
        if let Some(filter) = &self.filter {
            if !filter(&item) {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return Forwarded::Filtered;
            }
        }

        if self.target.submit(item).await {
            Forwarded::Accepted
        } else {
            Forwarded::Rejected
        }
    }
}

/// A running stage.
///
/// Dropping the handle does not stop the stage; call
/// [`complete`](StageTarget::complete) or [`fault`](StageTarget::fault).
pub struct Stage<I> {
    target: StageTarget<I>,
    failures: FailureLog,
}

impl<I: Send + 'static> Stage<I> {
    /// Start a stage driving `handler`, forwarding outputs through `link`.
    ///
    /// Must be called within a Tokio runtime.
    pub fn spawn<H>(
        name: impl Into<String>,
        handler: H,
        options: StageOptions,
        link: Option<StageLink<H::Output>>,
    ) -> Self
    where
        H: StageHandler<Input = I>,
    {
        let name: Arc<str> = Arc::from(name.into());
        let (sender, receiver) = mpsc::channel(options.capacity.max(1));
        let (state_tx, state_rx) = watch::channel(StageState::Running);
        let cancel = CancellationToken::new();

        let shared = Arc::new(TargetShared {
            name: Arc::clone(&name),
            sender: Mutex::new(Some(sender)),
            fault_reason: Mutex::new(None),
            cancel: cancel.clone(),
            state: state_rx,
        });
        let target = StageTarget { shared };

        let driver = Driver {
            name,
            handler: Arc::new(handler),
            parallelism: options.parallelism.max(1),
            drain_on_fault: options.drain_on_fault,
            failures: options.failures.clone(),
            link,
            target: target.clone(),
            state: state_tx,
            cancel,
        };
        tokio::spawn(driver.run(receiver));

        Self {
            target,
            failures: options.failures,
        }
    }

    /// Handle for feeding this stage
    pub fn target(&self) -> StageTarget<I> {
        self.target.clone()
    }

    /// Failures recorded by this stage
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }
}

impl<I> std::ops::Deref for Stage<I> {
    type Target = StageTarget<I>;

    fn deref(&self) -> &Self::Target {
        &self.target
    }
}

struct Driver<H: StageHandler> {
    name: Arc<str>,
    handler: Arc<H>,
    parallelism: usize,
    drain_on_fault: bool,
    failures: FailureLog,
    link: Option<StageLink<H::Output>>,
    target: StageTarget<H::Input>,
    state: watch::Sender<StageState>,
    cancel: CancellationToken,
}

impl<H: StageHandler> Driver<H> {
    async fn run(self, mut receiver: mpsc::Receiver<H::Input>) {
        let mut in_flight: JoinSet<()> = JoinSet::new();
        let mut input_closed = false;
        let mut faulted = false;
        let mut processed = 0usize;

        loop {
            if input_closed && in_flight.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled(), if !faulted => {
                    faulted = true;
                    receiver.close();
                    if !self.drain_on_fault {
                        let mut discarded = 0usize;
                        while receiver.try_recv().is_ok() {
                            discarded += 1;
                        }
                        if discarded > 0 {
                            warn!(stage = %self.name, discarded, "discarded queued items after fault");
                        }
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    processed += 1;
                    if let Err(err) = joined {
                        self.failures.record(ItemFailure {
                            stage: self.name.to_string(),
                            item: "<unknown>".to_string(),
                            error: TestforgeError::from(err),
                        });
                    }
                }

                received = receiver.recv(), if !input_closed && in_flight.len() < self.parallelism => {
                    match received {
                        Some(item) => {
                            in_flight.spawn(process_item(
                                Arc::clone(&self.name),
                                Arc::clone(&self.handler),
                                self.link.clone(),
                                self.failures.clone(),
                                item,
                            ));
                        }
                        None => input_closed = true,
                    }
                }
            }
        }

        let fault_reason = self.target.shared.fault_reason.lock().clone();
        match fault_reason {
            Some(reason) => {
                if let Some(link) = &self.link {
                    link.target()
                        .fault(format!("upstream stage '{}' faulted: {reason}", self.name));
                }
                self.state.send_replace(StageState::Faulted(reason));
            }
            None => {
                info!(stage = %self.name, processed, "stage completed");
                if let Some(link) = &self.link {
                    link.target().complete();
                }
                self.state.send_replace(StageState::Completed);
            }
        }
    }
}

async fn process_item<H: StageHandler>(
    stage: Arc<str>,
    handler: Arc<H>,
    link: Option<StageLink<H::Output>>,
    failures: FailureLog,
    item: H::Input,
) {
    let label = handler.describe(&item);
    let fail = |error: TestforgeError| {
        failures.record(ItemFailure {
            stage: stage.to_string(),
            item: label.clone(),
            error,
        })
    };

    let output = match handler.process(item).await {
        Ok(Some(output)) => output,
        Ok(None) => return,
        Err(error) => return fail(error),
    };

    let Some(link) = link else {
        return;
    };

    match link.forward(output).await {
        Forwarded::Accepted => {}
        Forwarded::Filtered => debug!(stage = %stage, item = %label, "item filtered by link"),
        Forwarded::Rejected => fail(TestforgeError::pipeline(
            link.target().name(),
            "stage no longer accepts input",
        )),
    }
}
