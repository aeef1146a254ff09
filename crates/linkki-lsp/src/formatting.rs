//! Whole-document formatting
//!
//! Resource files are sorted group by group. In source files the methods of
//! every top-level type are moved below the other members, bound methods
//! first, each group ordered by name. Methods keep their own text, including
//! comments on the lines directly above them.

use tracing::debug;

use crate::java::{Annotated, JavaFile, MethodDecl, TypeDecl};
use crate::properties;
use crate::text::LineIndex;
use crate::types::{DocumentKind, TextEdit};
use crate::AnalysisContext;

/// Produces formatting edits
pub struct FormattingEngine<'a> {
    context: AnalysisContext<'a>,
}

impl<'a> FormattingEngine<'a> {
    /// Create an engine over the given context
    pub fn new(context: AnalysisContext<'a>) -> Self {
        Self { context }
    }

    /// A single edit replacing the whole document, or nothing
    pub fn format(&self, uri: &str) -> Vec<TextEdit> {
        let Some(text) = self.context.store.read_uri(uri) else {
            return Vec::new();
        };

        let formatted = match self.context.config.document_kind(uri) {
            DocumentKind::Resource => Some(properties::sort_all(&text)),
            DocumentKind::Source => {
                format_source(&text, &self.context.config.binding_annotation_prefix)
            }
            DocumentKind::Other => None,
        };

        match formatted {
            Some(formatted) => vec![TextEdit::new(LineIndex::new(&text).full_range(), formatted)],
            None => {
                debug!("Nothing to format in {}", uri);
                Vec::new()
            }
        }
    }
}

/// Reorder the methods of every top-level type; `None` if the text does not parse
pub fn format_source(text: &str, prefix: &str) -> Option<String> {
    let file = match JavaFile::parse(text) {
        Ok(file) => file,
        Err(e) => {
            debug!("Not formatting source: {}", e);
            return None;
        }
    };

    let mut output = text.to_string();
    // back to front, so earlier offsets stay valid
    for decl in file.types.iter().rev() {
        if let Some(splice) = reorder_methods(text, decl, prefix) {
            output.replace_range(splice.start..splice.end, &splice.text);
        }
    }
    Some(output)
}

struct Splice {
    start: usize,
    end: usize,
    text: String,
}

/// Rewrite the text between a type's braces: other members keep their
/// place, methods follow them in order
fn reorder_methods(text: &str, decl: &TypeDecl, prefix: &str) -> Option<Splice> {
    let body = decl.body?;
    if decl.methods.is_empty() {
        return None;
    }
    let interior_start = body.start + 1;
    let interior_end = body.end.checked_sub(1)?;
    let interior = &text[interior_start..interior_end];

    let mut remaining = String::new();
    let mut cursor = interior_start;
    for method in &decl.methods {
        remaining.push_str(&text[cursor..method.leading_start]);
        cursor = skip_whitespace(text, method.span.end, interior_end);
    }
    remaining.push_str(&text[cursor..interior_end]);
    let remaining = remaining.trim_end();

    let mut methods: Vec<&MethodDecl> = decl.methods.iter().collect();
    methods.sort_by(|a, b| {
        let a_bound = a.has_annotation_with_prefix(prefix);
        let b_bound = b.has_annotation_with_prefix(prefix);
        b_bound.cmp(&a_bound).then_with(|| a.name.cmp(&b.name))
    });
    let chunks: Vec<&str> = methods
        .iter()
        .map(|method| &text[method.leading_start..method.span.end])
        .collect();

    let mut rewritten = String::new();
    if interior.contains('\n') {
        let indent = member_indent(interior);
        if remaining.trim().is_empty() {
            rewritten.push('\n');
        } else {
            rewritten.push_str(remaining);
            rewritten.push_str("\n\n");
        }
        rewritten.push_str(indent);
        rewritten.push_str(&chunks.join(&format!("\n\n{}", indent)));
        rewritten.push_str(closing_line(interior));
    } else {
        rewritten.push(' ');
        if !remaining.trim().is_empty() {
            rewritten.push_str(remaining.trim_start());
            rewritten.push(' ');
        }
        rewritten.push_str(&chunks.join(" "));
        rewritten.push(' ');
    }

    Some(Splice {
        start: interior_start,
        end: interior_end,
        text: rewritten,
    })
}

fn skip_whitespace(text: &str, offset: usize, limit: usize) -> usize {
    let skipped = text[offset..limit].len() - text[offset..limit].trim_start().len();
    offset + skipped
}

/// Indentation of the first member line below the opening brace
fn member_indent(interior: &str) -> &str {
    interior
        .split('\n')
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .unwrap_or(DEFAULT_INDENT)
}

/// Line break and indentation in front of the closing brace
fn closing_line(interior: &str) -> &str {
    let trailing = &interior[interior.trim_end().len()..];
    match trailing.rfind('\n') {
        Some(idx) => &trailing[idx..],
        None => "\n",
    }
}

const DEFAULT_INDENT: &str = "    ";
