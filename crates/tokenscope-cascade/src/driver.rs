//! Tokio binding for the cascade scheduler.
//!
//! One sleeping task per planned tier plus one frame task for the leverage
//! counter. Reselection and reset abort the old tasks, but abort is only a
//! best effort: a task may already be waiting on the lock. The generation
//! check inside the scheduler is what keeps a stale run from painting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::Result;
use crate::graph::CascadeGraph;
use crate::node::Tier;
use crate::scheduler::{
    AnimationSnapshot, CascadePlan, CascadeScheduler, CounterTick, Generation, SchedulerConfig,
};
use crate::tokens::TokenSet;

/// Default counter frame interval (~60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

struct DriverInner {
    scheduler: CascadeScheduler,
    tasks: Vec<JoinHandle<()>>,
}

impl DriverInner {
    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Shared handle driving a [`CascadeScheduler`] on tokio timers.
///
/// Cloning is cheap; all clones drive the same scheduler.
#[derive(Clone)]
pub struct CascadeDriver {
    inner: Arc<Mutex<DriverInner>>,
    updates: Arc<watch::Sender<AnimationSnapshot>>,
    frame_interval: Duration,
}

impl CascadeDriver {
    /// Create a driver over a graph built from `tokens`.
    pub fn new(tokens: &TokenSet, config: SchedulerConfig, frame_interval: Duration) -> Self {
        let graph = Arc::new(CascadeGraph::build(tokens));
        Self::with_scheduler(CascadeScheduler::new(graph, config), frame_interval)
    }

    /// Wrap an existing scheduler.
    pub fn with_scheduler(scheduler: CascadeScheduler, frame_interval: Duration) -> Self {
        let (updates, _) = watch::channel(scheduler.snapshot());
        Self {
            inner: Arc::new(Mutex::new(DriverInner {
                scheduler,
                tasks: Vec::new(),
            })),
            updates: Arc::new(updates),
            frame_interval,
        }
    }

    /// Receive a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<AnimationSnapshot> {
        self.updates.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> AnimationSnapshot {
        self.updates.borrow().clone()
    }

    /// Graph currently being animated.
    pub async fn graph(&self) -> Arc<CascadeGraph> {
        Arc::clone(self.inner.lock().await.scheduler.graph())
    }

    /// Select a core node and start its reveal.
    ///
    /// Unknown ids are rejected and leave the current run untouched.
    pub async fn activate(&self, core_id: &str) -> Result<CascadePlan> {
        let mut inner = self.inner.lock().await;
        let plan = inner.scheduler.activate(core_id)?;
        inner.abort_tasks();

        let started = Instant::now();
        for step in &plan.steps {
            if step.delay.is_zero() {
                inner.scheduler.fire_tier(plan.generation, step.tier);
            } else {
                let task = tokio::spawn(self.clone().fire_at(plan.generation, step.tier, started + step.delay));
                inner.tasks.push(task);
            }
        }
        inner.tasks.push(tokio::spawn(self.clone().run_counter(plan.generation, started)));

        self.publish(&inner.scheduler);
        tracing::info!(core = core_id, reach = plan.closure.len(), "cascade started");
        Ok(plan)
    }

    /// Stop any run and return to idle.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.abort_tasks();
        inner.scheduler.reset();
        self.publish(&inner.scheduler);
        tracing::debug!("cascade reset");
    }

    /// Rebuild the graph for a new token set and return to idle.
    pub async fn rebuild(&self, tokens: &TokenSet) -> Arc<CascadeGraph> {
        let graph = Arc::new(CascadeGraph::build(tokens));
        let mut inner = self.inner.lock().await;
        inner.abort_tasks();
        inner.scheduler.replace_graph(Arc::clone(&graph));
        self.publish(&inner.scheduler);
        tracing::info!(mode = %tokens.mode, brand = %tokens.brand, "cascade graph rebuilt");
        graph
    }

    fn publish(&self, scheduler: &CascadeScheduler) {
        self.updates.send_replace(scheduler.snapshot());
    }

    async fn fire_at(self, generation: Generation, tier: Tier, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
        let mut inner = self.inner.lock().await;
        if inner.scheduler.fire_tier(generation, tier) {
            self.publish(&inner.scheduler);
        }
    }

    async fn run_counter(self, generation: Generation, started: Instant) {
        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            frames.tick().await;
            let mut inner = self.inner.lock().await;
            match inner.scheduler.tick_counter(generation, started.elapsed()) {
                CounterTick::Advanced(_) => self.publish(&inner.scheduler),
                CounterTick::Finished(value) => {
                    self.publish(&inner.scheduler);
                    tracing::debug!(value, "leverage counter settled");
                    break;
                }
                CounterTick::Stale => break,
            }
        }
    }
}
