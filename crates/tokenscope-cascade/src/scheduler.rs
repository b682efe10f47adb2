//! Tier-by-tier reveal of a core token's downstream cascade.
//!
//! The scheduler owns the [`AnimationState`] and knows nothing about clocks.
//! [`CascadeScheduler::activate`] returns a [`CascadePlan`] describing when
//! each tier should light up and how long the leverage counter runs; whoever
//! owns the timers feeds the events back through [`CascadeScheduler::fire_tier`]
//! and [`CascadeScheduler::tick_counter`].
//!
//! Every plan carries the generation it was made for. Selecting another core
//! or resetting bumps the generation, and anything still tagged with an older
//! one is ignored.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::CascadeGraph;
use crate::node::{AnimationState, EdgeKey, NodeId, Tier};

/// Delay between successive tiers.
pub const TIER_DELAY: Duration = Duration::from_millis(400);

/// Extra counter time after the last tier could have fired.
pub const SETTLE_TAIL: Duration = Duration::from_millis(600);

/// Value the leverage counter animates toward.
pub const LEVERAGE_TARGET: f64 = 240.0;

/// Timing and target knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub tier_delay: Duration,
    pub settle_tail: Duration,
    pub leverage_target: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tier_delay: TIER_DELAY,
            settle_tail: SETTLE_TAIL,
            leverage_target: LEVERAGE_TARGET,
        }
    }
}

impl SchedulerConfig {
    /// Total counter duration: one delay per tier plus the settle tail.
    pub fn counter_duration(&self) -> Duration {
        self.tier_delay * Tier::COUNT as u32 + self.settle_tail
    }
}

/// Where the scheduler is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing selected
    Idle,
    /// Tier activations are still pending
    Running,
    /// All tiers fired; the counter may still be moving
    Settling,
}

/// Run token. Only the current generation may mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

/// One planned tier activation.
#[derive(Debug, Clone, PartialEq)]
pub struct TierStep {
    pub tier: Tier,
    /// Offset from the start of the run
    pub delay: Duration,
    pub nodes: Vec<NodeId>,
    /// Edges lit alongside this tier; always empty for the core tier
    pub edges: Vec<EdgeKey>,
}

/// Counter animation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterPlan {
    pub duration: Duration,
    pub target: f64,
}

impl CounterPlan {
    /// Counter value `elapsed` into the animation.
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        if progress >= 1.0 {
            self.target
        } else {
            ease_out_cubic(progress) * self.target
        }
    }
}

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Everything a timer owner needs to drive one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadePlan {
    pub generation: Generation,
    pub core: NodeId,
    pub closure: HashSet<NodeId>,
    /// Populated tiers, ascending
    pub steps: Vec<TierStep>,
    pub counter: CounterPlan,
}

/// Result of advancing the counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterTick {
    /// Counter moved; keep ticking
    Advanced(f64),
    /// Counter reached its target; stop ticking
    Finished(f64),
    /// Generation is no longer current; stop ticking
    Stale,
}

/// Read-only view of the scheduler for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSnapshot {
    pub generation: Generation,
    pub phase: Phase,
    pub selected_core: Option<NodeId>,
    /// Sorted for stable rendering
    pub activated_nodes: Vec<NodeId>,
    /// Sorted for stable rendering
    pub activated_edges: Vec<EdgeKey>,
    pub leverage: f64,
    pub leverage_display: u32,
    pub counter_done: bool,
}

impl Default for AnimationSnapshot {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            phase: Phase::Idle,
            selected_core: None,
            activated_nodes: Vec::new(),
            activated_edges: Vec::new(),
            leverage: 0.0,
            leverage_display: 0,
            counter_done: false,
        }
    }
}

/// Owns the animation state for one viewing session.
pub struct CascadeScheduler {
    graph: Arc<CascadeGraph>,
    config: SchedulerConfig,
    state: AnimationState,
    phase: Phase,
    generation: Generation,
    pending: BTreeMap<Tier, TierStep>,
    counter: Option<CounterPlan>,
    counter_done: bool,
}

impl CascadeScheduler {
    /// Create an idle scheduler over `graph`.
    pub fn new(graph: Arc<CascadeGraph>, config: SchedulerConfig) -> Self {
        Self {
            graph,
            config,
            state: AnimationState::default(),
            phase: Phase::Idle,
            generation: Generation::default(),
            pending: BTreeMap::new(),
            counter: None,
            counter_done: false,
        }
    }

    pub fn graph(&self) -> &Arc<CascadeGraph> {
        &self.graph
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether `generation` still owns the state.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// Swap in a rebuilt graph. Any run in progress is discarded.
    pub fn replace_graph(&mut self, graph: Arc<CascadeGraph>) {
        self.graph = graph;
        self.reset();
    }

    /// Start a reveal from `core_id`.
    ///
    /// An id that is not in the graph is rejected before anything is reset.
    pub fn activate(&mut self, core_id: &str) -> Result<CascadePlan> {
        if !self.graph.contains(core_id) {
            return Err(Error::UnknownNode(core_id.to_string()));
        }

        self.reset();

        let core = NodeId::from(core_id);
        let closure = self.graph.downstream_closure(core_id)?;
        let tiers = self.graph.group_by_tier(&closure);

        let steps: Vec<TierStep> = tiers
            .into_iter()
            .map(|(tier, nodes)| {
                let edges = if tier == Tier::Core {
                    Vec::new()
                } else {
                    self.graph.edges_into(&closure, &nodes)
                };
                TierStep {
                    tier,
                    delay: self.config.tier_delay * tier.index() as u32,
                    nodes,
                    edges,
                }
            })
            .collect();

        let counter = CounterPlan {
            duration: self.config.counter_duration(),
            target: self.config.leverage_target,
        };

        self.state.selected_core = Some(core.clone());
        self.pending = steps.iter().map(|s| (s.tier, s.clone())).collect();
        self.counter = Some(counter);
        self.phase = Phase::Running;

        tracing::debug!(
            core = %core,
            generation = self.generation.0,
            reach = closure.len(),
            tiers = steps.len(),
            "cascade activated"
        );

        Ok(CascadePlan {
            generation: self.generation,
            core,
            closure,
            steps,
            counter,
        })
    }

    /// Clear everything and invalidate all outstanding events.
    pub fn reset(&mut self) {
        self.generation = Generation(self.generation.0 + 1);
        self.state.clear();
        self.pending.clear();
        self.counter = None;
        self.counter_done = false;
        self.phase = Phase::Idle;
    }

    /// Apply the activation for `tier` if `generation` is current and the
    /// tier has not fired yet. Returns whether anything changed.
    pub fn fire_tier(&mut self, generation: Generation, tier: Tier) -> bool {
        if !self.is_current(generation) {
            tracing::trace!(stale = generation.0, current = self.generation.0, ?tier, "dropping stale tier event");
            return false;
        }
        let Some(step) = self.pending.remove(&tier) else {
            return false;
        };

        self.state.activated_nodes.extend(step.nodes);
        self.state.activated_edges.extend(step.edges);

        if self.pending.is_empty() {
            self.phase = Phase::Settling;
        }
        tracing::trace!(?tier, phase = ?self.phase, "tier activated");
        true
    }

    /// Move the counter to its value `elapsed` after activation.
    pub fn tick_counter(&mut self, generation: Generation, elapsed: Duration) -> CounterTick {
        if !self.is_current(generation) || self.counter_done {
            return CounterTick::Stale;
        }
        let Some(counter) = self.counter else {
            return CounterTick::Stale;
        };

        let value = counter.value_at(elapsed).max(self.state.leverage);
        self.state.leverage = value;

        if elapsed >= counter.duration {
            self.counter_done = true;
            CounterTick::Finished(value)
        } else {
            CounterTick::Advanced(value)
        }
    }

    /// Whether the counter reached its target in the current run.
    pub fn counter_done(&self) -> bool {
        self.counter_done
    }

    /// Apply everything due `elapsed` after activation in one go.
    ///
    /// For callers that drive the animation from their own frame loop rather
    /// than per-event timers.
    pub fn advance_to(&mut self, generation: Generation, elapsed: Duration) {
        let due: Vec<Tier> = self
            .pending
            .values()
            .filter(|s| s.delay <= elapsed)
            .map(|s| s.tier)
            .collect();
        for tier in due {
            self.fire_tier(generation, tier);
        }
        self.tick_counter(generation, elapsed);
    }

    /// Snapshot for rendering.
    pub fn snapshot(&self) -> AnimationSnapshot {
        let mut activated_nodes: Vec<_> = self.state.activated_nodes.iter().cloned().collect();
        activated_nodes.sort();
        let mut activated_edges: Vec<_> = self.state.activated_edges.iter().cloned().collect();
        activated_edges.sort();

        AnimationSnapshot {
            generation: self.generation,
            phase: self.phase,
            selected_core: self.state.selected_core.clone(),
            activated_nodes,
            activated_edges,
            leverage: self.state.leverage,
            leverage_display: self.state.leverage_display(),
            counter_done: self.counter_done,
        }
    }
}
