//! # Reachability Traversal
//!
//! Directed DFS from every source whose availability survived the size
//! analysis. First visits mark the node and contribute its replacement
//! directives to the change set of the node's component.
//!
//! Visited state persists across traversals: a node reached from one
//! source is not re-entered from a later one. Only the source itself is
//! gated on availability; intermediate nodes are traversed regardless.

use crate::graph::DepGraph;
use crate::types::NodeKey;

/// Walk from every usable source, in lexicographic key order.
///
/// Requires component assignments; run partitioning first.
pub fn traverse(graph: &mut DepGraph) {
    let sources: Vec<NodeKey> = graph.sources().iter().cloned().collect();
    for source in sources {
        if !graph.availability_of(&source).is_usable() {
            continue;
        }
        visit_from(graph, &source);
    }
}

fn visit_from(graph: &mut DepGraph, root: &NodeKey) {
    let mut stack = vec![root.clone()];
    while let Some(key) = stack.pop() {
        let Some(node) = graph.node_mut(&key) else {
            continue;
        };
        if node.visited {
            continue;
        }
        node.visited = true;

        let component = node.component;
        let replacements: Vec<_> = node.replacements.iter().cloned().collect();
        // reversed push so the pop order is lexicographic
        let successors: Vec<NodeKey> = node.outgoing.iter().rev().cloned().collect();

        if let Some(id) = component {
            if let Some(target) = graph.component_mut(id) {
                target.changes.extend(replacements);
            }
        }
        for successor in successors {
            stack.push(successor);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
