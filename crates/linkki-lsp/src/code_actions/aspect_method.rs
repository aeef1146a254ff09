//! Quick fix for aspect methods reported missing by the annotation processor
//!
//! The processor reports `Method "isNoteVisible()" is missing` on the bound
//! method that needs it. The fix inserts a boolean stub right after that
//! method through the client-side `linkki.applySnippet` command, so the
//! editor can offer the snippet's tab stops.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::debug;

use crate::java::JavaFile;
use crate::text::LineIndex;
use crate::types::{CodeAction, CodeActionKind, Command, Diagnostic, Range};

/// Processor code for a missing aspect method
pub const MISSING_METHOD: &str = "MISSING_METHOD";

/// Processor code for a missing aspect method on an abstract type
pub const MISSING_METHOD_ABSTRACT_TYPE: &str = "MISSING_METHOD_ABSTRACT_TYPE";

/// Client command that inserts a snippet at a range
pub const APPLY_SNIPPET_COMMAND: &str = "linkki.applySnippet";

static MISSING_METHOD_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"Method "(\w+)\(\)" is missing"#).ok());

/// Whether a diagnostic reports a missing aspect method
pub fn is_missing_method(diagnostic: &Diagnostic) -> bool {
    diagnostic.has_code(MISSING_METHOD) || diagnostic.has_code(MISSING_METHOD_ABSTRACT_TYPE)
}

/// Name of the missing method in a processor message
pub fn missing_method_name(message: &str) -> Option<String> {
    let captures = MISSING_METHOD_NAME.as_ref()?.captures(message)?;
    Some(captures.get(1)?.as_str().to_string())
}

/// One "create missing aspect method" action per matching diagnostic
pub fn missing_method_actions(uri: &str, text: &str, diagnostics: &[Diagnostic]) -> Vec<CodeAction> {
    let candidates: Vec<&Diagnostic> = diagnostics.iter().filter(|d| is_missing_method(d)).collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let file = match JavaFile::parse(text) {
        Ok(file) => file,
        Err(e) => {
            debug!("No aspect method actions for {}: {}", uri, e);
            return Vec::new();
        }
    };
    let index = LineIndex::new(text);

    candidates
        .into_iter()
        .filter_map(|diagnostic| {
            let name = missing_method_name(&diagnostic.message)?;
            let (_, method) = file.method_at(index.offset(diagnostic.range.start))?;

            let insert_at = index.position(method.span.end);
            let line_start = index.line_start(index.position(method.span.start).line as usize);
            let indentation: String = text[line_start..]
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();

            let command = Command {
                title: "Insert Snippet".to_string(),
                command: APPLY_SNIPPET_COMMAND.to_string(),
                arguments: vec![
                    json!(uri),
                    json!(Range::new(insert_at, insert_at)),
                    json!(stub_snippet(&name, &indentation)),
                ],
            };

            let mut action = CodeAction::with_command(
                format!("Create missing aspect method '{}'", name),
                CodeActionKind::QuickFix,
                command,
            );
            action.diagnostics = Some(vec![diagnostic.clone()]);
            Some(action)
        })
        .collect()
}

/// Boolean method stub placed after an existing method
pub fn stub_snippet(name: &str, indentation: &str) -> String {
    format!(
        "\n\n{indent}public ${{1:boolean}} {name}() {{\n{indent}    return ${{2:true}};\n{indent}}}",
        indent = indentation,
        name = name
    )
}
