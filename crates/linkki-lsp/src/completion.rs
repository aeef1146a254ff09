//! Code completion for bound methods and bundle keys
//!
//! In a source file the only item is a snippet for a new `@UITextField`
//! method. In a bundle file every bound method of the mirrored source
//! package is offered as a `ClassName_propertyName` key.

use std::path::Path;

use tracing::debug;

use crate::java::{Annotated, JavaFile};
use crate::store::uri_to_path;
use crate::types::{CompletionItem, CompletionItemKind, DocumentKind, Position};
use crate::AnalysisContext;

/// Label of the method stub snippet
pub const TEXT_FIELD_LABEL: &str = "Linkki TextField";

const TEXT_FIELD_SNIPPET: &str = "@UITextField(position = ${1:10}, label = \"${2:Label}\")\n\
public void ${3:propertyName}() {\n    // TODO bind field\n}";

/// Builds completion items
pub struct CompletionEngine<'a> {
    context: AnalysisContext<'a>,
}

impl<'a> CompletionEngine<'a> {
    /// Create an engine over the given context
    pub fn new(context: AnalysisContext<'a>) -> Self {
        Self { context }
    }

    /// Completion items for `uri`; the position does not narrow the result
    pub fn completions(&self, uri: &str, position: Position) -> Vec<CompletionItem> {
        debug!(
            "Handling completion request for {} at line={}, character={}",
            uri, position.line, position.character
        );

        let items = match self.context.config.document_kind(uri) {
            DocumentKind::Source => vec![text_field_item()],
            DocumentKind::Resource => uri_to_path(uri)
                .filter(|path| self.context.layout().is_bundle_file(path))
                .map(|path| self.bundle_keys(&path))
                .unwrap_or_default(),
            DocumentKind::Other => Vec::new(),
        };

        debug!("Generated {} completions", items.len());
        items
    }

    fn bundle_keys(&self, resource_path: &Path) -> Vec<CompletionItem> {
        let layout = self.context.layout();
        let Some(source_dir) = layout
            .mirrored_source_dir(resource_path)
            .or_else(|| resource_path.parent().map(Path::to_path_buf))
        else {
            return Vec::new();
        };

        let prefix = &self.context.config.binding_annotation_prefix;
        let mut items = Vec::new();
        for source_path in layout.source_files(&source_dir) {
            let Some(text) = self.context.store.read_path(&source_path) else {
                continue;
            };
            let file = match JavaFile::parse(&text) {
                Ok(file) => file,
                Err(e) => {
                    debug!("Skipping {}: {}", source_path.display(), e);
                    continue;
                }
            };

            for decl in file.all_types() {
                items.extend(
                    decl.methods
                        .iter()
                        .filter(|method| method.has_annotation_with_prefix(prefix))
                        .map(|method| {
                            CompletionItem::new(
                                format!("{}_{}", decl.name, method.property_name()),
                                CompletionItemKind::Property,
                            )
                            .with_detail(format!("{}.{}", decl.name, method.name))
                        }),
                );
            }
        }
        items
    }
}

fn text_field_item() -> CompletionItem {
    CompletionItem::new(TEXT_FIELD_LABEL, CompletionItemKind::Snippet)
        .with_detail("Generates a @UITextField method stub")
        .with_snippet(TEXT_FIELD_SNIPPET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::store::{path_to_uri, DocumentStore};
    use crate::types::InsertTextFormat;

    #[test]
    fn test_source_file_gets_snippet() {
        let store = DocumentStore::new();
        let config = ServerConfig::default();
        let engine = CompletionEngine::new(AnalysisContext::new(&store, &config));

        let items = engine.completions("file:///p/src/main/java/A.java", Position::new(0, 0));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, TEXT_FIELD_LABEL);
        assert_eq!(items[0].kind, CompletionItemKind::Snippet);
        assert_eq!(items[0].insert_text_format, Some(InsertTextFormat::Snippet));
        assert!(items[0].insert_text.as_deref().unwrap().starts_with("@UITextField(position = ${1:10}"));
    }

    #[test]
    fn test_non_bundle_resource_gets_nothing() {
        let store = DocumentStore::new();
        let config = ServerConfig::default();
        let engine = CompletionEngine::new(AnalysisContext::new(&store, &config));
        assert!(engine
            .completions("file:///p/src/main/resources/application.properties", Position::new(0, 0))
            .is_empty());
    }

    #[test]
    fn test_open_source_text_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Customer.java"), "class Customer {}").unwrap();

        let mut store = DocumentStore::new();
        store.open(
            path_to_uri(&dir.path().join("Customer.java")).unwrap(),
            "class Customer {\n  @UILabel\n  public String getName() { return \"\"; }\n}\n",
        );
        let config = ServerConfig::default();
        let engine = CompletionEngine::new(AnalysisContext::new(&store, &config));

        let uri = path_to_uri(&dir.path().join("messages.properties")).unwrap();
        let items = engine.completions(&uri, Position::new(0, 0));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Customer_name");
        assert_eq!(items[0].detail.as_deref(), Some("Customer.getName"));
        assert_eq!(items[0].kind, CompletionItemKind::Property);
    }
}
