//! # Size-Availability Analysis
//!
//! Tri-state propagation deciding, per node, whether size information is
//! available along its outgoing paths.
//!
//! Sinks are resolved `Available` before any traversal. Each source then
//! drives a post-order walk over `outgoing`:
//!
//! 1. A node already resolved returns immediately.
//! 2. A node currently on the traversal stack (cycle back-edge) is
//!    skipped without change.
//! 3. A non-sink without outgoing edges resolves `Unavailable`.
//! 4. Otherwise a node resolves `Available` iff no successor resolved
//!    `Unavailable`; still-unknown successors count in favor.
//!
//! Rule 4 makes the analysis available-biased on cycles: a cycle member
//! can conclude before its ancestors do, and the verdict is not revisited.
//! Nodes the analysis never reaches stay `Unknown` and are treated as
//! available downstream.
//!
//! The walk uses an explicit frame stack, never recursion, so input depth
//! cannot exhaust the call stack.

use std::collections::BTreeSet;

use crate::graph::DepGraph;
use crate::types::{Availability, NodeKey};

/// Run the analysis over every source, in lexicographic key order.
pub fn propagate(graph: &mut DepGraph) {
    let sinks: Vec<NodeKey> = graph.sinks().iter().cloned().collect();
    for key in sinks {
        if let Some(node) = graph.node_mut(&key) {
            node.availability = Availability::Available;
        }
    }

    let sources: Vec<NodeKey> = graph.sources().iter().cloned().collect();
    for source in sources {
        resolve_from(graph, &source);
    }
}

struct Frame {
    key: NodeKey,
    successors: Vec<NodeKey>,
    next: usize,
}

impl Frame {
    fn enter(graph: &DepGraph, key: &NodeKey) -> Self {
        let successors = graph
            .node(key)
            .map(|node| node.outgoing.iter().cloned().collect())
            .unwrap_or_default();
        Self {
            key: key.clone(),
            successors,
            next: 0,
        }
    }
}

fn resolve_from(graph: &mut DepGraph, root: &NodeKey) {
    if graph.availability_of(root).is_resolved() {
        return;
    }

    let mut stack = vec![Frame::enter(graph, root)];
    let mut on_stack: BTreeSet<NodeKey> = BTreeSet::new();
    on_stack.insert(root.clone());

    while let Some(frame) = stack.last_mut() {
        if frame.successors.is_empty() {
            // sinks are resolved before any traversal, so a node landing
            // here is a non-sink dead end
            let key = frame.key.clone();
            conclude(graph, &key, Availability::Unavailable);
            on_stack.remove(&key);
            stack.pop();
            continue;
        }

        if frame.next < frame.successors.len() {
            let child = frame.successors[frame.next].clone();
            frame.next += 1;
            if graph.availability_of(&child).is_resolved() || on_stack.contains(&child) {
                continue;
            }
            on_stack.insert(child.clone());
            let child_frame = Frame::enter(graph, &child);
            stack.push(child_frame);
        } else {
            let verdict = if frame
                .successors
                .iter()
                .all(|successor| graph.availability_of(successor) != Availability::Unavailable)
            {
                Availability::Available
            } else {
                Availability::Unavailable
            };
            let key = frame.key.clone();
            conclude(graph, &key, verdict);
            on_stack.remove(&key);
            stack.pop();
        }
    }
}

fn conclude(graph: &mut DepGraph, key: &NodeKey, verdict: Availability) {
    if let Some(node) = graph.node_mut(key) {
        node.availability = verdict;
    }
}

// =============================================================================
// TESTS
// =============================================================================
