//! # Frontier Resolution
//!
//! Frontier rules gate a directive on the visited state of an edge's
//! endpoints: the directive applies when the rule's `rhs` was visited and
//! its `lhs` was not, i.e. the edge crosses from the unplanned region
//! into the planned one.
//!
//! Each rule files its directive into the accepted or rejected set of the
//! `lhs` node's component. A component where the same directive lands on
//! both sides is contradictory and is dropped whole: its changes are
//! cleared and nothing is emitted for it. That is a planning outcome, not
//! an error.

use serde::{Deserialize, Serialize};

use crate::directive::Directive;
use crate::graph::DepGraph;
use crate::types::{ComponentId, NodeKey};

// =============================================================================
// FRONTIER RULE
// =============================================================================

/// A frontier rule attached via an `f` line.
///
/// Ordered by `(lhs, rhs, directive)` so the global rule set iterates
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrontierRule {
    /// The edge tail; the directive files into this node's component.
    pub lhs: NodeKey,
    /// The edge head; its visited state decides acceptance.
    pub rhs: NodeKey,
    /// The gated directive.
    pub directive: Directive,
}

impl FrontierRule {
    /// Create a new frontier rule.
    #[must_use]
    pub fn new(lhs: NodeKey, rhs: NodeKey, directive: Directive) -> Self {
        Self {
            lhs,
            rhs,
            directive,
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Classify every frontier rule, then settle each component.
///
/// Requires visited marks and component assignments; run reachability
/// first.
pub fn resolve(graph: &mut DepGraph) {
    let rules: Vec<FrontierRule> = graph.frontier_rules().iter().cloned().collect();
    for rule in rules {
        let lhs_visited = graph.node(&rule.lhs).is_some_and(|node| node.visited);
        let rhs_visited = graph.node(&rule.rhs).is_some_and(|node| node.visited);
        let applies = rhs_visited && !lhs_visited;

        let Some(id) = graph.component_of(&rule.lhs) else {
            continue;
        };
        let Some(component) = graph.component_mut(id) else {
            continue;
        };
        if applies {
            component.frontier_accepted.insert(rule.directive);
        } else {
            component.frontier_rejected.insert(rule.directive);
        }
    }

    for index in 0..graph.components().len() {
        let Some(component) = graph.component_mut(ComponentId::new(index)) else {
            continue;
        };
        if component.has_conflict() {
            component.changes.clear();
        } else {
            let accepted: Vec<Directive> = component.frontier_accepted.iter().cloned().collect();
            component.changes.extend(accepted);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKey;

    fn key(s: &str) -> NodeKey {
        NodeKey::new(s)
    }

    fn directive(raw: &str) -> Directive {
        Directive::parse(raw).expect("directive parses")
    }

    fn set_visited(graph: &mut DepGraph, s: &str) {
        graph
            .node_mut(&key(s))
            .expect("node exists")
            .visited = true;
    }

    fn component_of<'a>(graph: &'a DepGraph, s: &str) -> &'a crate::types::Component {
        let id = graph.component_of(&key(s)).expect("component assigned");
        graph.component(id).expect("component exists")
    }

    #[test]
    fn crossing_rule_is_accepted_into_changes() {
        let mut graph = DepGraph::new();
        graph.add_edge(key("a"), key("b"));
        graph.add_frontier_rule(FrontierRule::new(
            key("a"),
            key("b"),
            directive("r:::f.cc:::1:::0:::0:::x"),
        ));
        graph.partition_components();
        set_visited(&mut graph, "b");

        resolve(&mut graph);

        let component = component_of(&graph, "a");
        assert_eq!(component.frontier_accepted.len(), 1);
        assert!(component.frontier_rejected.is_empty());
        assert_eq!(component.changes.len(), 1);
    }

    #[test]
    fn non_crossing_rules_are_rejected() {
        let mut graph = DepGraph::new();
        graph.add_edge(key("a"), key("b"));
        graph.add_frontier_rule(FrontierRule::new(
            key("a"),
            key("b"),
            directive("r:::f.cc:::1:::0:::0:::x"),
        ));
        graph.partition_components();
        // neither endpoint visited: rhs.visited is false, rule cannot apply

        resolve(&mut graph);

        let component = component_of(&graph, "a");
        assert!(component.frontier_accepted.is_empty());
        assert_eq!(component.frontier_rejected.len(), 1);
        assert!(component.changes.is_empty());
    }

    #[test]
    fn both_visited_rejects() {
        let mut graph = DepGraph::new();
        graph.add_edge(key("a"), key("b"));
        graph.add_frontier_rule(FrontierRule::new(
            key("a"),
            key("b"),
            directive("r:::f.cc:::1:::0:::0:::x"),
        ));
        graph.partition_components();
        set_visited(&mut graph, "a");
        set_visited(&mut graph, "b");

        resolve(&mut graph);

        let component = component_of(&graph, "a");
        assert_eq!(component.frontier_rejected.len(), 1);
    }

    #[test]
    fn conflicting_component_is_emptied() {
        let mut graph = DepGraph::new();
        graph.add_edge(key("a"), key("b"));
        graph.add_edge(key("c"), key("a"));
        let gated = directive("r:::f.cc:::1:::0:::0:::x");
        // accepted via (a, b): b visited, a not
        graph.add_frontier_rule(FrontierRule::new(key("a"), key("b"), gated.clone()));
        // rejected via (c, a): a not visited
        graph.add_frontier_rule(FrontierRule::new(key("c"), key("a"), gated));
        graph.partition_components();
        set_visited(&mut graph, "b");
        graph
            .component_mut(graph.component_of(&key("a")).expect("component"))
            .expect("component")
            .changes
            .insert(directive("r:::g.cc:::9:::0:::0:::y"));

        resolve(&mut graph);

        let component = component_of(&graph, "a");
        assert!(component.has_conflict());
        assert!(component.changes.is_empty());
    }

    #[test]
    fn repeated_rejection_of_one_directive_is_no_conflict() {
        let mut graph = DepGraph::new();
        graph.add_edge(key("a"), key("b"));
        graph.add_edge(key("a"), key("c"));
        let gated = directive("r:::f.cc:::1:::0:::0:::x");
        graph.add_frontier_rule(FrontierRule::new(key("a"), key("b"), gated.clone()));
        graph.add_frontier_rule(FrontierRule::new(key("a"), key("c"), gated));
        graph.partition_components();
        graph
            .component_mut(graph.component_of(&key("a")).expect("component"))
            .expect("component")
            .changes
            .insert(directive("r:::g.cc:::9:::0:::0:::y"));

        resolve(&mut graph);

        // both rules rejected the same directive; the rejected set dedups
        let component = component_of(&graph, "a");
        assert_eq!(component.frontier_rejected.len(), 1);
        assert!(!component.has_conflict());
        assert_eq!(component.changes.len(), 1);
    }

    #[test]
    fn duplicate_rules_coalesce() {
        let mut graph = DepGraph::new();
        let rule = FrontierRule::new(key("a"), key("b"), directive("r:::f.cc:::1:::0:::0:::x"));
        graph.add_frontier_rule(rule.clone());
        graph.add_frontier_rule(rule);

        assert_eq!(graph.frontier_rules().len(), 1);
    }

    #[test]
    fn directive_files_into_lhs_component() {
        let mut graph = DepGraph::new();
        // two islands: rule spans them, directive lands on the lhs side
        graph.ensure_node(&key("a"));
        graph.add_edge(key("m"), key("n"));
        graph.add_frontier_rule(FrontierRule::new(
            key("a"),
            key("n"),
            directive("r:::f.cc:::1:::0:::0:::x"),
        ));
        graph.partition_components();
        set_visited(&mut graph, "n");

        resolve(&mut graph);

        let lhs_component = component_of(&graph, "a");
        assert_eq!(lhs_component.frontier_accepted.len(), 1);
        let rhs_component = component_of(&graph, "n");
        assert!(rhs_component.frontier_accepted.is_empty());
        assert!(rhs_component.frontier_rejected.is_empty());
    }

    #[test]
    fn frontier_endpoints_materialize_nodes() {
        let mut graph = DepGraph::new();
        graph.add_frontier_rule(FrontierRule::new(
            key("p"),
            key("q"),
            directive("r:::f.cc:::1:::0:::0:::x"),
        ));

        assert_eq!(graph.node_count(), 2);
    }
}
