//! The token dependency graph.
//!
//! A small layered DAG: core tokens feed semantic aliases, which feed
//! component styles, which feed platform outputs. The topology is fixed;
//! only node colors change with the active [`TokenSet`], and a changed token
//! set means a whole new graph rather than a patched one.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::node::{CascadeEdge, CascadeNode, EdgeKey, GridPosition, NodeId, Tier};
use crate::tokens::TokenSet;

/// Reference edges, tier `t` to tier `t + 1` only.
const REFERENCE_EDGES: &[(&str, &str)] = &[
    // core -> semantic
    ("brand-300", "sem-primary"),
    ("brand-500", "sem-primaryHover"),
    ("brand-500", "sem-focusRing"),
    ("neutral-100", "sem-surface"),
    ("neutral-900", "sem-text"),
    ("neutral-900", "sem-border"),
    ("success-500", "sem-success"),
    ("error-500", "sem-error"),
    // semantic -> component
    ("sem-primary", "comp-btnFill"),
    ("sem-primaryHover", "comp-btnHover"),
    ("sem-focusRing", "comp-inputFocus"),
    ("sem-surface", "comp-cardBg"),
    ("sem-text", "comp-cardText"),
    ("sem-border", "comp-inputBorder"),
    ("sem-success", "comp-toastSuccess"),
    ("sem-error", "comp-toastError"),
    // component -> platform
    ("comp-btnFill", "plat-web"),
    ("comp-btnFill", "plat-ios"),
    ("comp-btnFill", "plat-android"),
    ("comp-btnHover", "plat-web"),
    ("comp-inputFocus", "plat-web"),
    ("comp-inputFocus", "plat-android"),
    ("comp-cardBg", "plat-web"),
    ("comp-cardBg", "plat-ios"),
    ("comp-cardBg", "plat-android"),
    ("comp-cardText", "plat-web"),
    ("comp-cardText", "plat-ios"),
    ("comp-cardText", "plat-android"),
    ("comp-inputBorder", "plat-web"),
    ("comp-inputBorder", "plat-ios"),
    ("comp-toastSuccess", "plat-ios"),
    ("comp-toastSuccess", "plat-android"),
    ("comp-toastError", "plat-ios"),
    ("comp-toastError", "plat-android"),
];

/// Immutable node and edge lists with adjacency for traversal.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeGraph {
    nodes: Vec<CascadeNode>,
    edges: Vec<CascadeEdge>,
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
    #[serde(skip)]
    outgoing: Vec<Vec<usize>>,
}

impl CascadeGraph {
    /// Build the reference graph, coloring nodes from `tokens`.
    pub fn build(tokens: &TokenSet) -> Self {
        let b = &tokens.core.brand;
        let n = &tokens.core.neutral;
        let st = &tokens.core.status;
        let s = &tokens.semantic;

        let columns: [&[(&str, &str, &str)]; Tier::COUNT] = [
            &[
                ("brand-300", "Brand 300", b.s300),
                ("brand-500", "Brand 500", b.s500),
                ("neutral-100", "Neutral 100", n.n100),
                ("neutral-900", "Neutral 900", n.n900),
                ("success-500", "Success 500", st.success),
                ("error-500", "Error 500", st.error),
            ],
            &[
                ("sem-primary", "Primary", s.primary),
                ("sem-primaryHover", "Primary Hover", s.primary_hover),
                ("sem-focusRing", "Focus Ring", s.focus_ring),
                ("sem-surface", "Surface", s.surface),
                ("sem-text", "Text", s.text),
                ("sem-border", "Border", s.border),
                ("sem-success", "Success", s.success),
                ("sem-error", "Error", s.error),
            ],
            &[
                ("comp-btnFill", "Button Fill", s.primary),
                ("comp-btnHover", "Button Hover", s.primary_hover),
                ("comp-inputFocus", "Input Focus", s.focus_ring),
                ("comp-cardBg", "Card Background", s.surface),
                ("comp-cardText", "Card Text", s.text),
                ("comp-inputBorder", "Input Border", s.border),
                ("comp-toastSuccess", "Toast Success", s.success),
                ("comp-toastError", "Toast Error", s.error),
            ],
            &[
                ("plat-web", "Web (CSS)", s.text),
                ("plat-ios", "iOS (Swift)", s.text),
                ("plat-android", "Android (XML)", s.text),
            ],
        ];

        let nodes = Tier::ALL
            .iter()
            .zip(columns)
            .flat_map(|(&tier, column)| {
                column.iter().enumerate().map(move |(row, &(id, label, color))| CascadeNode {
                    id: NodeId::from(id),
                    label: label.to_string(),
                    tier,
                    color: color.to_string(),
                    position: GridPosition { column: tier.index(), row },
                })
            })
            .collect();

        let edges = REFERENCE_EDGES
            .iter()
            .map(|&(from, to)| CascadeEdge::new(from, to))
            .collect();

        Self::from_parts(nodes, edges)
    }

    /// Assemble a graph from explicit lists.
    ///
    /// Tier layering is not checked. Edges naming unknown nodes are kept in
    /// the edge list but take no part in traversal.
    pub fn from_parts(nodes: Vec<CascadeNode>, edges: Vec<CascadeEdge>) -> Self {
        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        let mut outgoing = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            match (index.get(&edge.from), index.get(&edge.to)) {
                (Some(&from), Some(&to)) => outgoing[from].push(to),
                _ => tracing::debug!(edge = %edge.key(), "edge references a missing node"),
            }
        }

        Self {
            nodes,
            edges,
            index,
            outgoing,
        }
    }

    pub fn nodes(&self) -> &[CascadeNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CascadeEdge] {
        &self.edges
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&CascadeNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in the core tier, i.e. the ones a viewer may select.
    pub fn core_nodes(&self) -> impl Iterator<Item = &CascadeNode> {
        self.nodes.iter().filter(|n| n.tier == Tier::Core)
    }

    /// Number of nodes per tier.
    pub fn tier_counts(&self) -> [usize; Tier::COUNT] {
        let mut counts = [0; Tier::COUNT];
        for node in &self.nodes {
            counts[node.tier.index()] += 1;
        }
        counts
    }

    /// Every node reachable from `start` along edges, `start` included.
    ///
    /// Breadth-first with a visited set, so each node and edge is examined
    /// at most once even if the graph were to contain a cycle.
    pub fn downstream_closure(&self, start: &str) -> Result<HashSet<NodeId>> {
        let &root = self
            .index
            .get(start)
            .ok_or_else(|| Error::UnknownNode(start.to_string()))?;

        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([root]);
        visited[root] = true;

        while let Some(current) = queue.pop_front() {
            for &next in &self.outgoing[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        Ok(visited
            .iter()
            .enumerate()
            .filter(|&(_, &seen)| seen)
            .map(|(i, _)| self.nodes[i].id.clone())
            .collect())
    }

    /// Partition `ids` by tier. Lists follow node declaration order; ids
    /// that are not in the graph are skipped.
    pub fn group_by_tier(&self, ids: &HashSet<NodeId>) -> BTreeMap<Tier, Vec<NodeId>> {
        let mut groups: BTreeMap<Tier, Vec<NodeId>> = BTreeMap::new();
        for node in self.nodes.iter().filter(|n| ids.contains(&n.id)) {
            groups.entry(node.tier).or_default().push(node.id.clone());
        }
        groups
    }

    /// Keys of every edge whose source is in `sources` and whose target is
    /// in `targets`.
    pub fn edges_into(&self, sources: &HashSet<NodeId>, targets: &[NodeId]) -> Vec<EdgeKey> {
        let targets: HashSet<&NodeId> = targets.iter().collect();
        self.edges
            .iter()
            .filter(|e| sources.contains(&e.from) && targets.contains(&e.to))
            .map(CascadeEdge::key)
            .collect()
    }
}
