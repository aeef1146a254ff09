//! Diagnostics Engine Module
//!
//! Resource files are checked for keys out of order within their group.
//! Source files are handed to a [`Compiler`] with the linkki annotation
//! processor attached, and its findings are mapped to protocol diagnostics.

pub mod compiler;

pub use compiler::{CompileError, CompileResult, Compiler, JavacCompiler, RawDiagnostic, RawSpan};

use tracing::{debug, warn};

use crate::properties;
use crate::text::LineIndex;
use crate::types::{Diagnostic, DiagnosticSeverity, DocumentKind, Range};
use crate::AnalysisContext;

/// Source attached to compiler diagnostics
pub const PROCESSOR_SOURCE: &str = "Linkki Processor";

/// Builds the diagnostics published for a document
pub struct DiagnosticsEngine<'a> {
    context: AnalysisContext<'a>,
    compiler: &'a dyn Compiler,
}

impl<'a> DiagnosticsEngine<'a> {
    /// Create an engine over the given context and compile capability
    pub fn new(context: AnalysisContext<'a>, compiler: &'a dyn Compiler) -> Self {
        Self { context, compiler }
    }

    /// Diagnostics for the current text of `uri`
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        let Some(text) = self.context.store.read_uri(uri) else {
            return Vec::new();
        };

        let diagnostics = match self.context.config.document_kind(uri) {
            DocumentKind::Resource => properties::validate(&text),
            DocumentKind::Source => self.compile(uri, &text),
            DocumentKind::Other => Vec::new(),
        };
        debug!("Generated {} diagnostics for {}", diagnostics.len(), uri);
        diagnostics
    }

    fn compile(&self, uri: &str, text: &str) -> Vec<Diagnostic> {
        match self.compiler.compile(uri, text) {
            Ok(raw) => {
                let index = LineIndex::new(text);
                raw.into_iter()
                    .filter(|raw| {
                        !raw.code
                            .as_deref()
                            .map_or(false, |code| self.context.config.compiler.is_suppressed(code))
                    })
                    .map(|raw| to_diagnostic(raw, &index))
                    .collect()
            }
            Err(e) => {
                warn!("Compilation of {} failed: {}", uri, e);
                vec![Diagnostic::new(
                    Range::on_line(0, 0, 0),
                    DiagnosticSeverity::Error,
                    format!("Annotation processing failed: {}", e),
                )
                .with_source(PROCESSOR_SOURCE)]
            }
        }
    }
}

fn to_diagnostic(raw: RawDiagnostic, index: &LineIndex<'_>) -> Diagnostic {
    let range = match raw.span {
        RawSpan::Offsets { start, end } => index.range(start, end.max(start)),
        RawSpan::LineColumn { line, column } => {
            Range::on_line(line.saturating_sub(1), column.saturating_sub(1), 1)
        }
    };

    let code = bracketed_code(&raw.message).or(raw.code);
    let mut diagnostic = Diagnostic::new(range, raw.severity, raw.message).with_source(PROCESSOR_SOURCE);
    diagnostic.code = code;
    diagnostic
}

/// Code from a trailing `[CODE]` in a processor message
pub fn bracketed_code(message: &str) -> Option<String> {
    let trimmed = message.trim();
    let inner = trimmed.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    Some(inner[open + 1..].to_string())
}
