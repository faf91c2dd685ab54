//! # Property-Based Tests
//!
//! Verification tests using proptest.
//!
//! These tests ensure determinism and the planner's structural invariants
//! over generated inputs. The size-propagation soundness property is
//! asserted on generated DAGs; the cycle policy is pinned by unit tests in
//! `availability.rs`.

use editplan_core::{Availability, DepGraph, Planner};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// INPUT GENERATION
// =============================================================================

const KEY_SPACE: usize = 8;

fn key_name(index: usize) -> String {
    format!("k{index}")
}

/// A generated, always-valid input stream over a small key space.
#[derive(Debug, Clone)]
struct GenInput {
    sources: Vec<usize>,
    sinks: Vec<usize>,
    edges: Vec<(usize, usize)>,
    replacements: Vec<(usize, u8, u8, i8, u8)>,
}

impl GenInput {
    fn render(&self) -> String {
        let mut out = String::new();
        for &index in &self.sources {
            out.push_str(&format!("s {}\n", key_name(index)));
        }
        for &index in &self.sinks {
            out.push_str(&format!("i {}\n", key_name(index)));
        }
        for &(lhs, rhs) in &self.edges {
            out.push_str(&format!("e {} {}\n", key_name(lhs), key_name(rhs)));
        }
        for &(node, offset, length, precedence, text) in &self.replacements {
            out.push_str(&format!(
                "r {} r:::f{}.cc:::{}:::{}:::{}:::t{}\n",
                key_name(node),
                text % 2,
                offset,
                length,
                precedence,
                text
            ));
        }
        out
    }

    fn mentioned_keys(&self) -> BTreeSet<usize> {
        let mut keys = BTreeSet::new();
        keys.extend(self.sources.iter().copied());
        keys.extend(self.sinks.iter().copied());
        for &(lhs, rhs) in &self.edges {
            keys.insert(lhs);
            keys.insert(rhs);
        }
        keys.extend(self.replacements.iter().map(|r| r.0));
        keys
    }
}

fn gen_input() -> impl Strategy<Value = GenInput> {
    (
        vec(0..KEY_SPACE, 0..4),
        vec(0..KEY_SPACE, 0..4),
        vec((0..KEY_SPACE, 0..KEY_SPACE), 0..12),
        vec(
            (0..KEY_SPACE, 0u8..20, 0u8..3, -3i8..4, 0u8..6),
            0..8,
        ),
    )
        .prop_map(|(sources, sinks, edges, replacements)| GenInput {
            sources,
            sinks,
            edges,
            replacements,
        })
}

/// Edges only from lower to higher key index: acyclic by construction.
fn gen_dag_input() -> impl Strategy<Value = GenInput> {
    gen_input().prop_map(|mut input| {
        input.edges = input
            .edges
            .into_iter()
            .filter(|(lhs, rhs)| lhs < rhs)
            .collect();
        input
    })
}

/// Build the analyzed graph without merging, so structural invariants are
/// checkable even when a merge would fail on duplicate precedences.
fn analyzed_graph(input: &GenInput) -> DepGraph {
    let mut planner = Planner::new();
    planner
        .ingest(input.render().as_bytes())
        .expect("generated input is valid");
    planner.partition().expect("partition");
    planner.analyze().expect("analyze");
    planner.traverse().expect("traverse");
    planner.resolve_frontier().expect("resolve");
    planner.graph().clone()
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Same input bytes produce byte-identical outputs (or the same error).
    #[test]
    fn determinism_identical_input_identical_output(input in gen_input()) {
        let rendered = input.render();
        let first = Planner::run(rendered.as_bytes());
        let second = Planner::run(rendered.as_bytes());

        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.plan.stdout_stream(), b.plan.stdout_stream());
                prop_assert_eq!(a.plan.summary(), b.plan.summary());
                prop_assert_eq!(a.plan.patches.len(), b.plan.patches.len());
                for (pa, pb) in a.plan.patches.iter().zip(&b.plan.patches) {
                    prop_assert_eq!(pa.body(), pb.body());
                }
            }
            (Err(a), Err(b)) => prop_assert_eq!(format!("{a}"), format!("{b}")),
            (a, b) => prop_assert!(false, "one run failed: {a:?} vs {b:?}"),
        }
    }

    /// The node count equals the number of distinct keys mentioned.
    #[test]
    fn node_identity_counts_distinct_keys(input in gen_input()) {
        let graph = analyzed_graph(&input);
        prop_assert_eq!(graph.node_count(), input.mentioned_keys().len());
    }

    /// Components partition the node set along undirected reachability.
    #[test]
    fn partition_is_an_equivalence_on_undirected_reachability(input in gen_input()) {
        let graph = analyzed_graph(&input);

        // reference partition: union-find over the undirected edge set
        let keys: Vec<_> = graph.keys().cloned().collect();
        let index_of: BTreeMap<_, _> =
            keys.iter().cloned().zip(0usize..).collect();
        let mut parent: Vec<usize> = (0..keys.len()).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for node in graph.nodes() {
            let from = index_of[&node.key];
            for to in &node.outgoing {
                let to = index_of[to];
                let (a, b) = (find(&mut parent, from), find(&mut parent, to));
                parent[a] = b;
            }
        }

        for left in graph.nodes() {
            prop_assert!(left.component.is_some());
            for right in graph.nodes() {
                let same_component = left.component == right.component;
                let same_set = find(&mut parent, index_of[&left.key])
                    == find(&mut parent, index_of[&right.key]);
                prop_assert_eq!(same_component, same_set);
            }
        }
    }

    /// Every sink ends the analysis available.
    #[test]
    fn sinks_stay_available(input in gen_input()) {
        let graph = analyzed_graph(&input);
        for key in graph.sinks() {
            prop_assert_eq!(graph.availability_of(key), Availability::Available);
        }
    }

    /// On DAGs, every available node's resolved successors are available
    /// and an available dead end is a sink.
    #[test]
    fn size_propagation_is_sound_on_dags(input in gen_dag_input()) {
        let graph = analyzed_graph(&input);
        for node in graph.nodes() {
            if node.availability != Availability::Available {
                continue;
            }
            if node.outgoing.is_empty() {
                prop_assert!(graph.is_sink(&node.key));
            }
            for successor in &node.outgoing {
                prop_assert!(graph.availability_of(successor) != Availability::Unavailable);
            }
        }
    }

    /// Declaring additional sources never unvisits a node.
    #[test]
    fn extra_sources_only_grow_the_visited_set(
        input in gen_input(),
        promoted in vec(0..KEY_SPACE, 0..4),
    ) {
        let base = analyzed_graph(&input);

        let mut extended_input = input.clone();
        extended_input.sources.extend(promoted);
        let extended = analyzed_graph(&extended_input);

        for node in base.nodes() {
            if node.visited {
                let counterpart = extended.node(&node.key).expect("same key set");
                prop_assert!(counterpart.visited);
            }
        }
    }

    /// A node's replacements land in its component's change set iff the
    /// node was visited.
    #[test]
    fn reachability_gates_change_contribution(input in gen_input()) {
        let graph = analyzed_graph(&input);
        for node in graph.nodes() {
            let id = node.component.expect("partitioned");
            let component = graph.component(id).expect("component");
            if component.has_conflict() {
                continue; // change set cleared wholesale
            }
            for directive in &node.replacements {
                if node.visited {
                    prop_assert!(component.changes.contains(directive));
                }
            }
            if !node.visited {
                // an unvisited node's directives only appear if some
                // visited sibling carries the identical directive
                for directive in &node.replacements {
                    let carried_elsewhere = graph.nodes().any(|other| {
                        other.visited
                            && other.component == node.component
                            && other.replacements.contains(directive)
                    });
                    let accepted = component.frontier_accepted.contains(directive);
                    prop_assert_eq!(
                        component.changes.contains(directive),
                        carried_elsewhere || accepted
                    );
                }
            }
        }
    }

    /// Every emitted replacement line has exactly five segments and no
    /// parseable precedence field.
    #[test]
    fn emitted_replacements_have_five_segments(input in gen_input()) {
        if let Ok(outcome) = Planner::run(input.render().as_bytes()) {
            for line in &outcome.plan.edits {
                if line.starts_with("r:::") {
                    prop_assert_eq!(line.split(":::").count(), 5);
                }
            }
        }
    }

    /// Feeding emitted edits back as isolated islands reproduces them.
    #[test]
    fn emission_is_idempotent(input in gen_input()) {
        let Ok(outcome) = Planner::run(input.render().as_bytes()) else {
            return Ok(());
        };

        let mut second_input = String::new();
        for (index, edit) in outcome.plan.edits.iter().enumerate() {
            let directive = match edit.splitn(5, ":::").collect::<Vec<_>>().as_slice() {
                ["r", file, offset, length, text] => {
                    format!("r:::{file}:::{offset}:::{length}:::0:::{text}")
                }
                _ => edit.clone(),
            };
            second_input.push_str(&format!(
                "s w{index}\ni w{index}x\ne w{index} w{index}x\nr w{index} {directive}\n"
            ));
        }

        let second = Planner::run(second_input.as_bytes()).expect("replan");
        prop_assert_eq!(second.plan.edits, outcome.plan.edits);
    }
}
