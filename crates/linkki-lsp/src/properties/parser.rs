//! Line-oriented parser for resource bundle files
//!
//! A file is a sequence of groups separated by blank lines. Each group holds
//! entries in file order; comment lines directly above an entry travel with
//! it, and backslash-continued lines belong to the entry they continue.

use crate::text::utf16_len;
use crate::types::Range;

/// One key/value entry together with its attached lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Trimmed key text before the first unescaped separator
    pub key: String,
    /// Attached comment lines followed by the entry's own physical lines
    pub leading_lines: Vec<String>,
    /// Range of the key inside the entry's first physical line
    pub key_range: Range,
    /// UTF-16 column of the separator, if the first line has one
    pub separator: Option<u32>,
}

impl ResourceEntry {
    /// Line the key is declared on
    pub fn line(&self) -> u32 {
        self.key_range.start.line
    }

    /// The entry's lines joined for output, without a terminating newline
    pub fn render(&self) -> String {
        self.leading_lines.join("\n")
    }

    /// Whether `character` lies on the key side of the separator
    pub fn is_key_column(&self, character: u32) -> bool {
        match self.separator {
            Some(separator) => character <= separator,
            None => true,
        }
    }
}

/// Entries between two blank lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGroup {
    /// Entries in file order
    pub entries: Vec<ResourceEntry>,
}

impl ResourceGroup {
    /// Whether any entry's key line falls inside `range`
    pub fn overlaps(&self, range: &Range) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.key_range.overlaps_lines(range))
    }
}

/// Whether a line is a comment line
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('#') || trimmed.starts_with('!')
}

/// Whether a line ends with an odd number of backslashes
pub fn is_continued(line: &str) -> bool {
    let backslashes = line.bytes().rev().take_while(|b| *b == b'\\').count();
    backslashes % 2 == 1
}

/// Byte index of the first `=` or `:` not directly preceded by a backslash
pub fn separator_index(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    bytes
        .iter()
        .enumerate()
        .find(|(idx, b)| (**b == b'=' || **b == b':') && (*idx == 0 || bytes[idx - 1] != b'\\'))
        .map(|(idx, _)| idx)
}

/// Parse a resource file into ordered groups
pub fn parse_groups(text: &str) -> Vec<ResourceGroup> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut groups = Vec::new();
    let mut current = ResourceGroup::default();
    let mut comments: Vec<String> = Vec::new();

    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx];

        if line.trim().is_empty() {
            if !current.entries.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            comments.clear();
            idx += 1;
            continue;
        }

        if is_comment(line) {
            comments.push(line.to_string());
            idx += 1;
            continue;
        }

        let key_line = idx;
        let mut leading_lines = std::mem::take(&mut comments);
        leading_lines.push(line.to_string());
        while is_continued(lines[idx]) && idx + 1 < lines.len() {
            idx += 1;
            leading_lines.push(lines[idx].to_string());
        }

        current.entries.push(parse_entry(line, key_line as u32, leading_lines));
        idx += 1;
    }

    if !current.entries.is_empty() {
        groups.push(current);
    }
    groups
}

fn parse_entry(first_line: &str, line: u32, leading_lines: Vec<String>) -> ResourceEntry {
    let separator = separator_index(first_line);
    let key = match separator {
        Some(sep) => first_line[..sep].trim(),
        None => first_line.trim(),
    };
    let key_start = first_line.find(key).unwrap_or(0);
    let start = utf16_len(&first_line[..key_start]) as u32;

    ResourceEntry {
        key: key.to_string(),
        leading_lines,
        key_range: Range::on_line(line, start, utf16_len(key) as u32),
        separator: separator.map(|sep| utf16_len(&first_line[..sep]) as u32),
    }
}

/// All entries of a file, flattened across groups
pub fn entries(text: &str) -> Vec<ResourceEntry> {
    parse_groups(text)
        .into_iter()
        .flat_map(|group| group.entries)
        .collect()
}

/// Entry whose key is declared on `line`
pub fn entry_on_line(text: &str, line: u32) -> Option<ResourceEntry> {
    entries(text).into_iter().find(|entry| entry.line() == line)
}
