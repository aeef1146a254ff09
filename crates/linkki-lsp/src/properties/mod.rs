//! Resource bundle model
//!
//! Parses `.properties` files into groups of entries and keeps keys sorted
//! within each group. Everything here is a pure function of the file text.

pub mod parser;
pub mod sorter;

pub use parser::{entries, entry_on_line, parse_groups, ResourceEntry, ResourceGroup};
pub use sorter::{
    sort_all, sort_group, validate, SORTER_SOURCE, UNSORTED_KEY_CODE, UNSORTED_KEY_MESSAGE,
};

/// Whether `key` names `prefix` itself or one of its `prefix_` sub-keys
pub fn key_matches(key: &str, prefix: &str) -> bool {
    key == prefix
        || key
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('_'))
}
