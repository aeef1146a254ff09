//! Property-based tests for resource group sorting
//!
//! These tests verify that:
//! - Sorting is idempotent
//! - Sorting only reorders entries inside their own group
//! - A sorted file validates without diagnostics
//! - Sorting one group leaves every other group untouched

use proptest::prelude::*;
use linkki_lsp::properties::{parse_groups, sort_all, sort_group, validate};
use linkki_lsp::types::Range;

/// One entry: optional comment line plus a `key=value` line
fn entry_strategy() -> impl Strategy<Value = String> {
    (
        proptest::option::of("[a-z ]{1,10}"),
        "[A-Za-z][A-Za-z_]{0,10}",
        "[a-z0-9 ]{0,8}",
    )
        .prop_map(|(comment, key, value)| match comment {
            Some(comment) => format!("# {}\n{}={}", comment.trim(), key, value),
            None => format!("{}={}", key, value),
        })
}

/// A file of one to four groups separated by blank lines
fn file_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::collection::vec(entry_strategy(), 1..6), 1..5).prop_map(|groups| {
        let groups: Vec<String> = groups.into_iter().map(|entries| entries.join("\n")).collect();
        format!("{}\n", groups.join("\n\n"))
    })
}

fn sorted_group_contents(text: &str) -> Vec<Vec<(String, Vec<String>)>> {
    parse_groups(text)
        .into_iter()
        .map(|group| {
            let mut entries: Vec<(String, Vec<String>)> = group
                .entries
                .into_iter()
                .map(|entry| (entry.key, entry.leading_lines))
                .collect();
            entries.sort();
            entries
        })
        .collect()
}

/// Property 1: sorting twice equals sorting once
#[test]
fn prop_sort_all_is_idempotent() {
    proptest!(|(text in file_strategy())| {
        let once = sort_all(&text);
        prop_assert_eq!(sort_all(&once), once);
    });
}

/// Property 2: entries stay in their group with their comments
#[test]
fn prop_sort_all_preserves_entries() {
    proptest!(|(text in file_strategy())| {
        prop_assert_eq!(sorted_group_contents(&sort_all(&text)), sorted_group_contents(&text));
    });
}

/// Property 3: a sorted file has nothing to report
#[test]
fn prop_sorted_file_validates_clean() {
    proptest!(|(text in file_strategy())| {
        prop_assert!(validate(&sort_all(&text)).is_empty());
    });
}

/// Property 4: canonical input already sorted comes back byte-for-byte
#[test]
fn prop_sorted_text_is_stable() {
    proptest!(|(text in file_strategy())| {
        let sorted = sort_all(&text);
        if validate(&text).is_empty() {
            prop_assert_eq!(sorted, text);
        }
    });
}

/// Property 5: sorting the second group leaves the first untouched
#[test]
fn prop_sort_group_isolates_groups() {
    proptest!(|(first in file_strategy(), second in file_strategy())| {
        let first_group = first.split("\n\n").next().unwrap_or_default().trim_end().to_string();
        let text = format!("{}\n\n{}", first_group, second);

        let groups = parse_groups(&text);
        prop_assume!(groups.len() >= 2);
        let target = groups[1].entries[0].key_range;
        let result = sort_group(&text, &Range::new(target.start, target.start));

        let result_first = result.split("\n\n").next().unwrap_or_default();
        prop_assert_eq!(result_first, first_group.as_str());
    });
}

#[test]
fn test_unsorted_pair_reports_second_key() {
    let diagnostics = validate("b=1\na=2\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].range.start.line, 1);
    assert!(validate("a=1\nb=2\n").is_empty());
}
