//! Tokenscope Cascade
//!
//! Dependency graph of design tokens and the tiered animation that reveals
//! how far one core token reaches.
//!
//! # Tiers
//!
//! ```text
//! Core Tokens -> Semantic Aliases -> Component Styles -> Platform Outputs
//!  brand-300        sem-primary        comp-btnFill        plat-web / ios / android
//! ```
//!
//! Selecting a core token computes its downstream closure, groups it by tier
//! and lights each tier `TIER_DELAY` after the previous one, while a leverage
//! counter eases up to its target.
//!
//! # Usage
//!
//! ```ignore
//! let driver = CascadeDriver::new(&TokenSet::default(), SchedulerConfig::default(), FRAME_INTERVAL);
//! let mut updates = driver.subscribe();
//! driver.activate("brand-300").await?;
//! while updates.changed().await.is_ok() {
//!     render(&updates.borrow());
//! }
//! ```

mod driver;
mod error;
mod graph;
mod node;
mod scheduler;
mod tokens;

pub use driver::{CascadeDriver, FRAME_INTERVAL};
pub use error::{Error, Result};
pub use graph::CascadeGraph;
pub use node::{AnimationState, CascadeEdge, CascadeNode, EdgeKey, GridPosition, NodeId, Tier};
pub use scheduler::{
    ease_out_cubic, AnimationSnapshot, CascadePlan, CascadeScheduler, CounterPlan, CounterTick, Generation,
    Phase, SchedulerConfig, TierStep, LEVERAGE_TARGET, SETTLE_TAIL, TIER_DELAY,
};
pub use tokens::{Brand, BrandScale, ColorMode, CorePalette, NeutralScale, SemanticColors, StatusColors, TokenSet};
