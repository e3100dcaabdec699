//! Fetch-with-polling primitive.
//!
//! A [`Fetcher`] owns one [`FetchState`] and runs *cycles*: each cycle marks
//! the state as loading, invokes the producer, and writes the outcome back
//! only if it is still the newest cycle when it settles. Completion order of
//! the underlying requests is irrelevant; start order decides.
//!
//! ```text
//!  activate(deps) ──changed?──▶ start ──▶ producer ──▶ settle ─┬─ current ─▶ write
//!        ▲                        ▲                            └─ stale ───▶ drop
//!        │                        │
//!   new deps / teardown      poll timer tick
//! ```
//!
//! Superseded cycles are not aborted; their requests run to completion and
//! the result is discarded.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::deps::DependencySet;
use super::state::{error_message, FetchState};

/// Boxed future returned by a [`Producer`]; failures are already rendered.
pub type ProducerFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send + 'static>>;

/// Zero-argument async operation driven by a [`Fetcher`].
///
/// Implemented for any `Fn() -> impl Future<Output = Result<T, E>>` where
/// `E: Display`, so closures over an `Arc<AnalyticsClient>` work directly.
pub trait Producer<T>: Send + Sync + 'static {
    fn produce(&self) -> ProducerFuture<T>;
}

impl<T, E, F, Fut> Producer<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Display,
{
    fn produce(&self) -> ProducerFuture<T> {
        let future = self();
        Box::pin(async move { future.await.map_err(|reason| error_message(&reason)) })
    }
}

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    Dependencies,
    Timer,
}

impl CycleTrigger {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::Timer => "timer",
        }
    }
}

/// Ownership token held by exactly one cycle.
///
/// A cycle may write to the shared state only while its token matches the
/// fetcher's current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleToken {
    generation: u64,
}

impl CycleToken {
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

struct Shared<T> {
    state: watch::Sender<FetchState<T>>,
    /// Id of the newest cycle. Only changed while the state lock is held.
    generation: AtomicU64,
    /// Id of the live activation; timers from older activations may not start cycles.
    activation: AtomicU64,
}

impl<T> Shared<T>
where
    T: Send + Sync + 'static,
{
    fn new() -> Self {
        let (state, _) = watch::channel(FetchState::pending());
        Self {
            state,
            generation: AtomicU64::new(0),
            activation: AtomicU64::new(0),
        }
    }

    /// Opens a new activation and invalidates every outstanding cycle.
    fn next_activation(&self) -> u64 {
        let mut activation = 0;
        self.state.send_if_modified(|_| {
            activation = self.activation.fetch_add(1, Ordering::SeqCst) + 1;
            self.generation.fetch_add(1, Ordering::SeqCst);
            false
        });
        activation
    }

    /// Marks the start of a cycle for `activation`. Returns `None` when the
    /// activation has ended in the meantime.
    fn begin_cycle(&self, activation: u64) -> Option<CycleToken> {
        let mut token = None;
        self.state.send_if_modified(|state| {
            if self.activation.load(Ordering::SeqCst) != activation {
                return false;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            token = Some(CycleToken { generation });
            state.begin();
            true
        });
        token
    }

    fn settle(&self, label: &'static str, token: CycleToken, outcome: Result<T, String>) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != token.generation {
                return false;
            }
            match outcome {
                Ok(data) => state.settle_success(data),
                Err(message) => {
                    warn!(
                        event = "core.sync.fetch_failed",
                        fetcher = label,
                        generation = token.generation,
                        error = %message
                    );
                    state.settle_failure(message);
                }
            }
            true
        });

        if applied {
            debug!(
                event = "core.sync.cycle_settled",
                fetcher = label,
                generation = token.generation
            );
        } else {
            debug!(
                event = "core.sync.cycle_discarded",
                fetcher = label,
                generation = token.generation,
                current = self.generation.load(Ordering::SeqCst)
            );
        }
        applied
    }
}

fn start_cycle<T>(
    label: &'static str,
    shared: &Arc<Shared<T>>,
    producer: &Arc<dyn Producer<T>>,
    activation: u64,
    trigger: CycleTrigger,
) -> Option<CycleToken>
where
    T: Send + Sync + 'static,
{
    let token = shared.begin_cycle(activation)?;
    debug!(
        event = "core.sync.cycle_started",
        fetcher = label,
        generation = token.generation,
        trigger = trigger.as_str()
    );

    let future = producer.produce();
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let outcome = future.await;
        shared.settle(label, token, outcome);
    });

    Some(token)
}

/// Repeating timer owned by one activation. Aborted when dropped.
struct PollTimer {
    handle: JoinHandle<()>,
}

impl PollTimer {
    fn spawn<T>(
        label: &'static str,
        shared: Arc<Shared<T>>,
        producer: Arc<dyn Producer<T>>,
        activation: u64,
        period: Duration,
    ) -> Self
    where
        T: Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if start_cycle(label, &shared, &producer, activation, CycleTrigger::Timer).is_none() {
                    break;
                }
            }
        });
        Self { handle }
    }

    fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Keeps a [`FetchState`] in sync with an async producer.
///
/// Must be driven from within a Tokio runtime: [`activate`](Self::activate)
/// spawns the producer and the poll timer.
///
/// Dropping the fetcher tears it down.
pub struct Fetcher<T> {
    label: &'static str,
    shared: Arc<Shared<T>>,
    refresh_interval: Option<Duration>,
    deps: Option<DependencySet>,
    timer: Option<PollTimer>,
}

impl<T> Fetcher<T>
where
    T: Send + Sync + 'static,
{
    /// A zero interval disables polling.
    pub fn new(refresh_interval: Option<Duration>) -> Self {
        Self {
            label: "fetch",
            shared: Arc::new(Shared::new()),
            refresh_interval: refresh_interval.filter(|interval| !interval.is_zero()),
            deps: None,
            timer: None,
        }
    }

    pub fn polling(refresh_interval: Duration) -> Self {
        Self::new(Some(refresh_interval))
    }

    /// Names this fetcher in log events. Cycles already running keep the
    /// name they started with.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    /// Starts a new cycle if `deps` differs from the last activation.
    ///
    /// With unchanged dependencies nothing happens and `producer` is dropped.
    /// Otherwise the previous activation ends (its timer is cancelled and
    /// its pending cycles become stale) and `producer` is invoked
    /// immediately, then on every timer tick.
    pub fn activate<P>(&mut self, deps: DependencySet, producer: P) -> bool
    where
        P: Producer<T>,
    {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }

        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }

        let activation = self.shared.next_activation();
        let producer: Arc<dyn Producer<T>> = Arc::new(producer);
        start_cycle(
            self.label,
            &self.shared,
            &producer,
            activation,
            CycleTrigger::Dependencies,
        );

        self.timer = self.refresh_interval.map(|period| {
            PollTimer::spawn(self.label, Arc::clone(&self.shared), producer, activation, period)
        });
        self.deps = Some(deps);
        true
    }

    /// Ends the current activation. Later settlements are discarded and the
    /// timer stops. A subsequent [`activate`](Self::activate) starts afresh.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if self.deps.take().is_some() {
            self.shared.next_activation();
            debug!(event = "core.sync.teardown", fetcher = self.label);
        }
    }

    pub fn is_active(&self) -> bool {
        self.deps.is_some()
    }

    /// Generation of the newest cycle (or invalidation).
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> FetchState<T>
    where
        T: Clone,
    {
        self.shared.state.borrow().clone()
    }

    /// Reads the state without cloning it.
    pub fn inspect<R>(&self, f: impl FnOnce(&FetchState<T>) -> R) -> R {
        f(&self.shared.state.borrow())
    }
}

impl<T> Drop for Fetcher<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
        if self.deps.take().is_some() {
            // Same invalidation as `teardown`, without the `T` bounds.
            self.shared.state.send_if_modified(|_| {
                self.shared.activation.fetch_add(1, Ordering::SeqCst);
                self.shared.generation.fetch_add(1, Ordering::SeqCst);
                false
            });
        }
    }
}
