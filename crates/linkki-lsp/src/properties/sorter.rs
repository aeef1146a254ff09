//! Ordering checks and sorting for resource groups

use tracing::debug;

use super::parser::{parse_groups, ResourceEntry, ResourceGroup};
use crate::types::{Diagnostic, DiagnosticSeverity, Range};

/// Diagnostic code for a key that breaks the ordering of its group
pub const UNSORTED_KEY_CODE: &str = "LINKKI_UNSORTED_KEY";

/// Message attached to unsorted-key diagnostics
pub const UNSORTED_KEY_MESSAGE: &str = "Key is not sorted lexicographically within its group.";

/// Source attached to unsorted-key diagnostics
pub const SORTER_SOURCE: &str = "Linkki Properties Sorter";

/// Report every key that is smaller than its predecessor in the same group
pub fn validate(text: &str) -> Vec<Diagnostic> {
    let diagnostics: Vec<Diagnostic> = parse_groups(text)
        .iter()
        .flat_map(|group| {
            group.entries.windows(2).filter_map(|pair| {
                let (previous, current) = (&pair[0], &pair[1]);
                (current.key < previous.key).then(|| unsorted_key_diagnostic(current))
            })
        })
        .collect();

    debug!("Found {} unsorted keys", diagnostics.len());
    diagnostics
}

fn unsorted_key_diagnostic(entry: &ResourceEntry) -> Diagnostic {
    Diagnostic::new(entry.key_range, DiagnosticSeverity::Warning, UNSORTED_KEY_MESSAGE)
        .with_code(UNSORTED_KEY_CODE)
        .with_source(SORTER_SOURCE)
}

/// Sort every group by key
pub fn sort_all(text: &str) -> String {
    render(parse_groups(text), |_| true)
}

/// Sort only the groups that have a key line inside `range`
pub fn sort_group(text: &str, range: &Range) -> String {
    render(parse_groups(text), |group| group.overlaps(range))
}

fn render(groups: Vec<ResourceGroup>, should_sort: impl Fn(&ResourceGroup) -> bool) -> String {
    let mut output = String::new();
    let count = groups.len();

    for (idx, mut group) in groups.into_iter().enumerate() {
        if should_sort(&group) {
            // stable, so duplicate keys keep their relative order
            group.entries.sort_by(|a, b| a.key.cmp(&b.key));
        }
        for entry in &group.entries {
            output.push_str(&entry.render());
            output.push('\n');
        }
        if idx + 1 < count {
            output.push('\n');
        }
    }
    output
}
