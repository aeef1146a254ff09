//! Outline of bound types, components and their aspect methods
//!
//! Each annotated type becomes a class symbol. Its annotated fields and
//! methods are the components (named by property), and methods such as
//! `isAgeEditable` for component `age` are listed below their component.

use tracing::debug;

use crate::java::{capitalize, Annotated, JavaFile, Span, TypeDecl};
use crate::text::LineIndex;
use crate::types::{DocumentKind, DocumentSymbol, SymbolKind};
use crate::AnalysisContext;

/// Builds the document outline
pub struct SymbolsBuilder<'a> {
    context: AnalysisContext<'a>,
}

impl<'a> SymbolsBuilder<'a> {
    pub fn new(context: AnalysisContext<'a>) -> Self {
        Self { context }
    }

    /// Outline of `uri`; only source files have one
    pub fn document_symbols(&self, uri: &str) -> Vec<DocumentSymbol> {
        if self.context.config.document_kind(uri) != DocumentKind::Source {
            return Vec::new();
        }
        let Some(text) = self.context.store.read_uri(uri) else {
            return Vec::new();
        };
        match JavaFile::parse(&text) {
            Ok(file) => outline(&file, &text, &self.context.config.binding_annotation_prefix),
            Err(e) => {
                debug!("No outline for {}: {}", uri, e);
                Vec::new()
            }
        }
    }
}

/// Outline of a parsed file
pub fn outline(file: &JavaFile, text: &str, prefix: &str) -> Vec<DocumentSymbol> {
    let index = LineIndex::new(text);
    file.all_types()
        .into_iter()
        .filter(|decl| decl.has_annotation_with_prefix(prefix))
        .map(|decl| type_symbol(decl, &index, prefix))
        .collect()
}

fn symbol(index: &LineIndex<'_>, name: String, kind: SymbolKind, span: Span, name_span: Span) -> DocumentSymbol {
    DocumentSymbol::new(
        name,
        kind,
        index.range(span.start, span.end),
        index.range(name_span.start, name_span.end),
    )
}

fn type_symbol(decl: &TypeDecl, index: &LineIndex<'_>, prefix: &str) -> DocumentSymbol {
    let mut class = symbol(index, decl.name.clone(), SymbolKind::Class, decl.span, decl.name_span);

    let fields = decl
        .fields
        .iter()
        .filter(|field| field.has_annotation_with_prefix(prefix))
        .map(|field| (field.name.clone(), field.span, field.name_span, None));
    let methods = decl
        .methods
        .iter()
        .filter(|method| method.has_annotation_with_prefix(prefix))
        .map(|method| (method.property_name(), method.span, method.name_span, Some(method.span)));

    for (name, span, name_span, own_method) in fields.chain(methods) {
        let mut component = symbol(index, name.clone(), SymbolKind::Property, span, name_span);
        let aspect_prefix = format!("is{}", capitalize(&name));
        component.children = decl
            .methods
            .iter()
            .filter(|method| Some(method.span) != own_method)
            .filter(|method| method.name.len() > aspect_prefix.len() && method.name.starts_with(&aspect_prefix))
            .map(|method| symbol(index, method.name.clone(), SymbolKind::Method, method.span, method.name_span))
            .collect();
        class.children.push(component);
    }
    class
}
