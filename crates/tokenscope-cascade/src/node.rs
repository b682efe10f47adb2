//! Cascade nodes, edges and the per-run animation state.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a cascade node, e.g. `brand-300`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The four fixed layers of derivation, least specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Raw palette values
    Core,
    /// Role-based aliases
    Semantic,
    /// Per-component styles
    Component,
    /// Generated platform outputs
    Platform,
}

impl Tier {
    /// Number of tiers.
    pub const COUNT: usize = 4;

    /// All tiers in propagation order.
    pub const ALL: [Tier; Tier::COUNT] = [Tier::Core, Tier::Semantic, Tier::Component, Tier::Platform];

    /// Column index, 0..=3.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Tier for a column index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Tier::Core),
            1 => Some(Tier::Semantic),
            2 => Some(Tier::Component),
            3 => Some(Tier::Platform),
            _ => None,
        }
    }

    /// Column heading.
    pub const fn label(self) -> &'static str {
        match self {
            Tier::Core => "Core Tokens",
            Tier::Semantic => "Semantic Aliases",
            Tier::Component => "Component Styles",
            Tier::Platform => "Platform Outputs",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Layout slot. Has no bearing on graph semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    /// Tier index
    pub column: usize,
    /// Rank within the tier
    pub row: usize,
}

/// A token in the cascade diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeNode {
    pub id: NodeId,
    pub label: String,
    pub tier: Tier,
    /// Representative swatch color
    pub color: String,
    pub position: GridPosition,
}

/// Key identifying an edge as `from->to`.
///
/// Consumers test membership on the string form, so it must stay exactly
/// `from + "->" + to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeKey(pub String);

impl EdgeKey {
    pub fn new(from: &str, to: &str) -> Self {
        Self(format!("{from}->{to}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for EdgeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// `to` is derived from `from`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CascadeEdge {
    pub from: NodeId,
    pub to: NodeId,
}

impl CascadeEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: NodeId(from.into()),
            to: NodeId(to.into()),
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from.as_str(), self.to.as_str())
    }
}

/// Mutable state of one reveal run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    pub activated_nodes: HashSet<NodeId>,
    pub activated_edges: HashSet<EdgeKey>,
    pub selected_core: Option<NodeId>,
    /// Leverage counter, interpolated toward its target
    pub leverage: f64,
}

impl AnimationState {
    /// Return to the empty state.
    pub fn clear(&mut self) {
        self.activated_nodes.clear();
        self.activated_edges.clear();
        self.selected_core = None;
        self.leverage = 0.0;
    }

    pub fn is_node_active(&self, id: &str) -> bool {
        self.activated_nodes.contains(id)
    }

    pub fn is_edge_active(&self, key: &str) -> bool {
        self.activated_edges.contains(key)
    }

    /// Counter value as displayed.
    pub fn leverage_display(&self) -> u32 {
        self.leverage.round().max(0.0) as u32
    }
}
