//! # Insertion Merger
//!
//! Turns a component's final change set into its emitted edits.
//!
//! Replacement directives are grouped by `(file, offset, length)`:
//!
//! - A group of one emits with the precedence field stripped.
//! - Co-located insertions (`length == 0`, two or more members) merge
//!   into a single edit whose text concatenates the member texts in
//!   ascending precedence order. Precedences in such a group must be
//!   distinct; a duplicate is fatal, because the merge order of the two
//!   texts would be arbitrary.
//! - Co-located non-insertions (`length > 0`) emit separately, precedence
//!   stripped. They rewrite the same bytes; picking a winner is the
//!   caller's business, not the planner's.
//!
//! Header includes pass through ungrouped and unchanged.

use std::collections::{BTreeMap, BTreeSet};

use crate::directive::{Directive, Edit, Replacement};
use crate::types::PlanError;

type GroupKey = (String, u64, u64);

/// Merge one component's change set into its emitted edits.
///
/// The result order is the grouping order; the emitter applies the final
/// lexicographic line sort.
pub fn merge_changes(changes: &BTreeSet<Directive>) -> Result<Vec<Edit>, PlanError> {
    let mut edits: Vec<Edit> = Vec::new();
    let mut groups: BTreeMap<GroupKey, Vec<&Replacement>> = BTreeMap::new();

    for directive in changes {
        match directive {
            Directive::Include(_) => edits.push(directive.to_edit()),
            Directive::Replace(r) => groups
                .entry((r.file.clone(), r.offset, r.length))
                .or_default()
                .push(r),
        }
    }

    for ((file, offset, length), members) in groups {
        if members.len() == 1 {
            edits.push(members[0].to_edit());
        } else if length == 0 {
            edits.push(merge_insertions(&file, offset, &members)?);
        } else {
            for member in members {
                edits.push(member.to_edit());
            }
        }
    }
    Ok(edits)
}

/// Concatenate co-located insertions in ascending precedence order.
fn merge_insertions(file: &str, offset: u64, members: &[&Replacement]) -> Result<Edit, PlanError> {
    let mut ordered: Vec<&Replacement> = members.to_vec();
    ordered.sort_by_key(|member| member.precedence);

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for member in &ordered {
        let count = counts.entry(member.precedence).or_insert(0);
        *count = count.saturating_add(1);
    }
    if counts.values().any(|&count| count > 1) {
        let directives: Vec<String> = ordered
            .iter()
            .filter(|member| counts.get(&member.precedence).copied().unwrap_or(0) > 1)
            .map(|member| Directive::Replace((*member).clone()).to_string())
            .collect();
        return Err(PlanError::DuplicatePrecedence {
            file: file.to_string(),
            offset,
            directives,
        });
    }

    let mut text = String::new();
    for member in &ordered {
        text.push_str(&member.text);
    }
    Ok(Edit::Replace {
        file: file.to_string(),
        offset,
        length: 0,
        text,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(raws: &[&str]) -> BTreeSet<Directive> {
        raws.iter()
            .map(|raw| Directive::parse(raw).expect("directive parses"))
            .collect()
    }

    fn lines(edits: &[Edit]) -> Vec<String> {
        let mut rendered: Vec<String> = edits.iter().map(ToString::to_string).collect();
        rendered.sort();
        rendered
    }

    #[test]
    fn empty_change_set_emits_nothing() {
        let edits = merge_changes(&BTreeSet::new()).expect("merges");
        assert!(edits.is_empty());
    }

    #[test]
    fn lone_insertion_loses_its_precedence() {
        let edits = merge_changes(&changes(&["r:::a.cc:::10:::0:::7:::X"])).expect("merges");
        assert_eq!(lines(&edits), vec!["r:::a.cc:::10:::0:::X"]);
    }

    #[test]
    fn co_located_insertions_merge_ascending() {
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::1:::>",
            "r:::a.cc:::5:::0:::-1:::<",
        ]))
        .expect("merges");
        assert_eq!(lines(&edits), vec!["r:::a.cc:::5:::0:::<>"]);
    }

    #[test]
    fn precedence_orders_numerically_not_textually() {
        // "10" < "2" as text; 2 < 10 as integers
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::10:::b",
            "r:::a.cc:::5:::0:::2:::a",
        ]))
        .expect("merges");
        assert_eq!(lines(&edits), vec!["r:::a.cc:::5:::0:::ab"]);
    }

    #[test]
    fn three_way_merge_keeps_full_order() {
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::0:::m",
            "r:::a.cc:::5:::0:::-2:::l",
            "r:::a.cc:::5:::0:::9:::r",
        ]))
        .expect("merges");
        assert_eq!(lines(&edits), vec!["r:::a.cc:::5:::0:::lmr"]);
    }

    #[test]
    fn duplicate_precedence_is_fatal() {
        let result = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::0:::X",
            "r:::a.cc:::5:::0:::0:::Y",
        ]));
        match result {
            Err(PlanError::DuplicatePrecedence {
                file,
                offset,
                directives,
            }) => {
                assert_eq!(file, "a.cc");
                assert_eq!(offset, 5);
                assert_eq!(directives.len(), 2);
                assert!(directives.contains(&"r:::a.cc:::5:::0:::0:::X".to_string()));
                assert!(directives.contains(&"r:::a.cc:::5:::0:::0:::Y".to_string()));
            }
            other => unreachable!("expected duplicate precedence, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_report_names_only_the_colliding_members() {
        let result = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::0:::X",
            "r:::a.cc:::5:::0:::0:::Y",
            "r:::a.cc:::5:::0:::3:::Z",
        ]));
        match result {
            Err(PlanError::DuplicatePrecedence { directives, .. }) => {
                assert_eq!(directives.len(), 2);
                assert!(!directives.iter().any(|d| d.contains(":::Z")));
            }
            other => unreachable!("expected duplicate precedence, got {other:?}"),
        }
    }

    #[test]
    fn distinct_offsets_do_not_merge() {
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::0:::X",
            "r:::a.cc:::6:::0:::0:::Y",
        ]))
        .expect("merges");
        assert_eq!(
            lines(&edits),
            vec!["r:::a.cc:::5:::0:::X", "r:::a.cc:::6:::0:::Y"]
        );
    }

    #[test]
    fn distinct_files_do_not_merge() {
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::0:::X",
            "r:::b.cc:::5:::0:::0:::Y",
        ]))
        .expect("merges");
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn overlapping_rewrites_stay_separate() {
        // same span, nonzero length: both emit, precedence dropped
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::3:::0:::X",
            "r:::a.cc:::5:::3:::1:::Y",
        ]))
        .expect("merges");
        assert_eq!(
            lines(&edits),
            vec!["r:::a.cc:::5:::3:::X", "r:::a.cc:::5:::3:::Y"]
        );
    }

    #[test]
    fn same_precedence_on_nonzero_length_span_is_not_fatal() {
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::3:::0:::X",
            "r:::a.cc:::5:::3:::0:::Y",
        ]))
        .expect("merges");
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn includes_pass_through_ungrouped() {
        let edits = merge_changes(&changes(&[
            "include-user-header:::a.cc:::-1:::-1:::one.h",
            "include-user-header:::a.cc:::-1:::-1:::two.h",
            "r:::a.cc:::5:::0:::0:::X",
        ]))
        .expect("merges");
        assert_eq!(
            lines(&edits),
            vec![
                "include-user-header:::a.cc:::-1:::-1:::one.h",
                "include-user-header:::a.cc:::-1:::-1:::two.h",
                "r:::a.cc:::5:::0:::X",
            ]
        );
    }

    #[test]
    fn set_semantics_collapse_identical_directives_before_merging() {
        let mut set = BTreeSet::new();
        let d = Directive::parse("r:::a.cc:::5:::0:::0:::X").expect("directive parses");
        set.insert(d.clone());
        set.insert(d);
        let edits = merge_changes(&set).expect("merges");
        assert_eq!(lines(&edits), vec!["r:::a.cc:::5:::0:::X"]);
    }

    #[test]
    fn merged_text_may_collapse_empty_pieces() {
        let edits = merge_changes(&changes(&[
            "r:::a.cc:::5:::0:::0:::",
            "r:::a.cc:::5:::0:::1:::tail",
        ]))
        .expect("merges");
        assert_eq!(lines(&edits), vec!["r:::a.cc:::5:::0:::tail"]);
    }
}
