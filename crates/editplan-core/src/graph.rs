//! # Dependency Graph
//!
//! The ordered graph store behind the planning pipeline.
//!
//! Every container here is a `BTreeMap` or `BTreeSet`: node iteration,
//! successor iteration and component discovery are all lexicographic by
//! key, which is what makes the emitted plan byte-stable across runs and
//! platforms.
//!
//! Nodes materialize on first mention. Every registration is a set
//! insertion, so duplicate input lines coalesce silently.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::directive::Directive;
use crate::frontier::FrontierRule;
use crate::types::{Availability, Component, ComponentId, Node, NodeKey};

// =============================================================================
// GRAPH
// =============================================================================

/// The dependency graph built by the Ingestor and consumed by the
/// analysis passes.
///
/// Holds the node map, the source and sink registries, the global
/// frontier rule set and, after partitioning, the component table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepGraph {
    nodes: BTreeMap<NodeKey, Node>,
    sources: BTreeSet<NodeKey>,
    sinks: BTreeSet<NodeKey>,
    frontier: BTreeSet<FrontierRule>,
    components: Vec<Component>,
}

impl DepGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize a node for `key` if it does not exist yet.
    pub fn ensure_node(&mut self, key: &NodeKey) {
        if !self.nodes.contains_key(key) {
            self.nodes.insert(key.clone(), Node::new(key.clone()));
        }
    }

    /// Register `key` as a source node, materializing it first.
    pub fn mark_source(&mut self, key: NodeKey) {
        self.ensure_node(&key);
        self.sources.insert(key);
    }

    /// Register `key` as a sink node, materializing it first.
    pub fn mark_sink(&mut self, key: NodeKey) {
        self.ensure_node(&key);
        self.sinks.insert(key);
    }

    /// Add the directed edge `lhs -> rhs`, materializing both endpoints.
    ///
    /// Also records the undirected adjacency on both nodes; partitioning
    /// reads only that view.
    pub fn add_edge(&mut self, lhs: NodeKey, rhs: NodeKey) {
        self.ensure_node(&lhs);
        self.ensure_node(&rhs);
        if let Some(node) = self.nodes.get_mut(&lhs) {
            node.outgoing.insert(rhs.clone());
            node.neighbors.insert(rhs.clone());
        }
        if let Some(node) = self.nodes.get_mut(&rhs) {
            node.neighbors.insert(lhs);
        }
    }

    /// Attach a replacement directive to `key`, materializing it first.
    pub fn add_replacement(&mut self, key: NodeKey, directive: Directive) {
        self.ensure_node(&key);
        if let Some(node) = self.nodes.get_mut(&key) {
            node.replacements.insert(directive);
        }
    }

    /// Record a frontier rule, materializing both endpoints.
    pub fn add_frontier_rule(&mut self, rule: FrontierRule) {
        self.ensure_node(&rule.lhs);
        self.ensure_node(&rule.rhs);
        self.frontier.insert(rule);
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Look up a node by key.
    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub(crate) fn node_mut(&mut self, key: &NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// All nodes in lexicographic key order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.nodes.keys()
    }

    /// Number of materialized nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.outgoing.len()).sum()
    }

    /// The source key registry.
    #[must_use]
    pub fn sources(&self) -> &BTreeSet<NodeKey> {
        &self.sources
    }

    /// The sink key registry.
    #[must_use]
    pub fn sinks(&self) -> &BTreeSet<NodeKey> {
        &self.sinks
    }

    /// Whether `key` was declared a sink.
    #[must_use]
    pub fn is_sink(&self, key: &NodeKey) -> bool {
        self.sinks.contains(key)
    }

    /// The global frontier rule set.
    #[must_use]
    pub fn frontier_rules(&self) -> &BTreeSet<FrontierRule> {
        &self.frontier
    }

    /// Availability of `key`; `Unknown` for unmaterialized keys.
    #[must_use]
    pub fn availability_of(&self, key: &NodeKey) -> Availability {
        self.nodes
            .get(key)
            .map_or(Availability::Unknown, |node| node.availability)
    }

    // =========================================================================
    // COMPONENT PARTITIONING
    // =========================================================================

    /// Partition the graph into connected components of the undirected
    /// view, in lexicographic discovery order.
    ///
    /// Assigns every node exactly one dense `ComponentId` starting at 0
    /// and rebuilds the component table from scratch. Returns the number
    /// of components.
    pub fn partition_components(&mut self) -> usize {
        self.components.clear();
        for node in self.nodes.values_mut() {
            node.component = None;
        }

        let keys: Vec<NodeKey> = self.nodes.keys().cloned().collect();
        for key in keys {
            if self.component_of(&key).is_some() {
                continue;
            }
            let id = ComponentId::new(self.components.len());
            self.components.push(Component::new(id));
            self.flood_assign(&key, id);
        }
        self.components.len()
    }

    /// Breadth-first flood over `neighbors`, assigning `id` to every node
    /// connected to `start`.
    fn flood_assign(&mut self, start: &NodeKey, id: ComponentId) {
        let mut queue = VecDeque::new();
        queue.push_back(start.clone());

        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get_mut(&current) else {
                continue;
            };
            if node.component.is_some() {
                continue;
            }
            node.component = Some(id);
            let neighbors: Vec<NodeKey> = node.neighbors.iter().cloned().collect();
            for neighbor in neighbors {
                if self.component_of(&neighbor).is_none() {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    /// Component assignment of `key`, if partitioning has run.
    #[must_use]
    pub fn component_of(&self, key: &NodeKey) -> Option<ComponentId> {
        self.nodes.get(key).and_then(|node| node.component)
    }

    /// Look up a component by id.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id.index())
    }

    /// The component table in discovery order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Aggregate counters over the graph.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            source_count: self.sources.len(),
            sink_count: self.sinks.len(),
            replacement_count: self
                .nodes
                .values()
                .map(|node| node.replacements.len())
                .sum(),
            frontier_rule_count: self.frontier.len(),
            component_count: self.components.len(),
        }
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Aggregate counters reported by `editplan check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Materialized nodes.
    pub node_count: usize,
    /// Directed edges.
    pub edge_count: usize,
    /// Declared sources.
    pub source_count: usize,
    /// Declared sinks.
    pub sink_count: usize,
    /// Attached replacement directives, summed over nodes.
    pub replacement_count: usize,
    /// Frontier rules after dedup.
    pub frontier_rule_count: usize,
    /// Components; 0 before partitioning.
    pub component_count: usize,
}

// =============================================================================
// TESTS
// =============================================================================
