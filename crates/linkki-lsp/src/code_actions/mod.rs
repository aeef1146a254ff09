//! Code Actions Engine Module
//!
//! Resource files get sorting actions; source files get quick fixes for
//! aspect methods reported missing by the annotation processor.

pub mod aspect_method;

pub use aspect_method::{missing_method_actions, APPLY_SNIPPET_COMMAND};

use tracing::debug;

use crate::properties::{self, UNSORTED_KEY_CODE};
use crate::text::LineIndex;
use crate::types::{CodeAction, CodeActionKind, Diagnostic, DocumentKind, Range, TextEdit, WorkspaceEdit};
use crate::AnalysisContext;

/// Title of the action sorting the group of an unsorted key
pub const SORT_GROUP_TITLE: &str = "Sort properties in this group";

/// Title of the action sorting every group
pub const SORT_ALL_TITLE: &str = "Sort all property groups";

/// Builds code actions for a document
pub struct CodeActionsEngine<'a> {
    context: AnalysisContext<'a>,
}

impl<'a> CodeActionsEngine<'a> {
    /// Create an engine over the given context
    pub fn new(context: AnalysisContext<'a>) -> Self {
        Self { context }
    }

    /// Actions for `range` in `uri`, given the diagnostics the client reports there
    pub fn code_actions(&self, uri: &str, range: Range, diagnostics: &[Diagnostic]) -> Vec<CodeAction> {
        let Some(text) = self.context.store.read_uri(uri) else {
            return Vec::new();
        };

        let actions = match self.context.config.document_kind(uri) {
            DocumentKind::Resource => sort_actions(uri, &text, range, diagnostics),
            DocumentKind::Source => missing_method_actions(uri, &text, diagnostics),
            DocumentKind::Other => Vec::new(),
        };
        debug!("Offering {} code actions for {}", actions.len(), uri);
        actions
    }
}

fn sort_actions(uri: &str, text: &str, range: Range, diagnostics: &[Diagnostic]) -> Vec<CodeAction> {
    let mut actions = Vec::new();
    let whole_document = LineIndex::new(text).full_range();

    if let Some(unsorted) = diagnostics.iter().find(|d| d.has_code(UNSORTED_KEY_CODE)) {
        let target = unsorted.range;
        let mut action = CodeAction::with_edit(
            SORT_GROUP_TITLE,
            CodeActionKind::QuickFix,
            WorkspaceEdit::single(
                uri,
                TextEdit::new(whole_document, properties::sort_group(text, &target)),
            ),
        );
        action.diagnostics = Some(vec![unsorted.clone()]);
        actions.push(action);
    } else {
        debug!("No unsorted key reported in range {:?}", range);
    }

    actions.push(CodeAction::with_edit(
        SORT_ALL_TITLE,
        CodeActionKind::SourceOrganizeImports,
        WorkspaceEdit::single(uri, TextEdit::new(whole_document, properties::sort_all(text))),
    ));
    actions
}
