//! Go-to-definition between bound accessor methods and resource keys
//!
//! From an annotated method, every resource key `ClassName_propertyName`
//! (or one of its `_` sub-keys) in the mirrored and the root resource
//! directory is a definition. From a resource key, matching keys in sibling
//! bundles and the first bound method of the named class are.

pub mod strategies;

use std::path::Path;

use tracing::debug;

use crate::java::{Annotated, JavaFile};
use crate::properties::{entries, entry_on_line, key_matches};
use crate::store::{same_path, uri_to_path};
use crate::text::LineIndex;
use crate::types::{DocumentKind, Location, Position};
use crate::AnalysisContext;

pub use strategies::MatchStrategy;

/// Resolves definitions across source and resource files
pub struct DefinitionResolver<'a> {
    context: AnalysisContext<'a>,
}

impl<'a> DefinitionResolver<'a> {
    /// Create a resolver over the given context
    pub fn new(context: AnalysisContext<'a>) -> Self {
        Self { context }
    }

    /// Definitions for the symbol at `position` in the document `uri`
    pub fn find_definition(&self, uri: &str, position: Position) -> Vec<Location> {
        let Some(text) = self.context.store.read_uri(uri) else {
            return Vec::new();
        };

        match self.context.config.document_kind(uri) {
            DocumentKind::Source => self.from_accessor(uri, &text, position),
            DocumentKind::Resource => self.from_resource_key(uri, &text, position),
            DocumentKind::Other => Vec::new(),
        }
    }

    fn from_accessor(&self, uri: &str, text: &str, position: Position) -> Vec<Location> {
        let file = match JavaFile::parse(text) {
            Ok(file) => file,
            Err(e) => {
                debug!("No definition in {}: {}", uri, e);
                return Vec::new();
            }
        };

        let offset = LineIndex::new(text).offset(position);
        let Some((decl, method)) = file.method_at(offset) else {
            return Vec::new();
        };
        if !method.has_annotation_with_prefix(&self.context.config.binding_annotation_prefix) {
            return Vec::new();
        }
        let Some(source_path) = uri_to_path(uri) else {
            return Vec::new();
        };

        let key = format!("{}_{}", decl.name, method.property_name());
        debug!("Looking up resource key {} for {}", key, method.name);

        let layout = self.context.layout();
        let mirrored = layout.mirrored_resource_dir(&source_path);
        let root = layout
            .root_resource_dir(&source_path)
            .filter(|root| mirrored.as_deref().map_or(true, |dir| !same_path(dir, root)));

        mirrored
            .into_iter()
            .chain(root)
            .flat_map(|dir| self.keys_in_dir(&dir, &key, None))
            .collect()
    }

    fn from_resource_key(&self, uri: &str, text: &str, position: Position) -> Vec<Location> {
        let Some(entry) = entry_on_line(text, position.line) else {
            return Vec::new();
        };
        if !entry.is_key_column(position.character) {
            return Vec::new();
        }
        let Some(resource_path) = uri_to_path(uri) else {
            return Vec::new();
        };

        let (class_name, remainder) = match entry.key.split_once('_') {
            Some((class_name, remainder)) => (Some(class_name), remainder),
            None => (None, entry.key.as_str()),
        };

        let mut locations = match resource_path.parent() {
            Some(dir) => self.keys_in_dir(dir, remainder, Some(resource_path.as_path())),
            None => Vec::new(),
        };

        if let Some(location) =
            class_name.and_then(|class_name| self.bound_method(&resource_path, class_name, remainder))
        {
            locations.push(location);
        }
        locations
    }

    /// Every key equal to `key` or prefixed `key_` in the resource files of `dir`
    fn keys_in_dir(&self, dir: &Path, key: &str, exclude: Option<&Path>) -> Vec<Location> {
        let layout = self.context.layout();
        let mut locations = Vec::new();

        for path in layout.resource_files(dir) {
            if exclude.map_or(false, |excluded| same_path(excluded, &path)) {
                continue;
            }
            let Some(text) = self.context.store.read_path(&path) else {
                continue;
            };
            let Some(file_uri) = self.context.store.uri_for_path(&path) else {
                continue;
            };
            locations.extend(
                entries(&text)
                    .into_iter()
                    .filter(|entry| key_matches(&entry.key, key))
                    .map(|entry| Location::new(file_uri.clone(), entry.key_range)),
            );
        }
        locations
    }

    /// Name range of the first bound method of `class_name` matching `remainder`
    fn bound_method(&self, resource_path: &Path, class_name: &str, remainder: &str) -> Option<Location> {
        let layout = self.context.layout();
        let source_root = layout.source_root_for(resource_path)?;
        if !source_root.is_dir() {
            return None;
        }

        let qualified = class_name
            .contains('.')
            .then(|| layout.qualified_source_path(&source_root, class_name))
            .filter(|path| path.is_file());
        let source_path = match qualified {
            Some(path) => path,
            None => {
                let simple_name = class_name.rsplit('.').next().unwrap_or(class_name);
                layout.find_source_file(&source_root, simple_name)?
            }
        };

        let text = self.context.store.read_path(&source_path)?;
        let file = match JavaFile::parse(&text) {
            Ok(file) => file,
            Err(e) => {
                debug!("Skipping {}: {}", source_path.display(), e);
                return None;
            }
        };

        let prefix = &self.context.config.binding_annotation_prefix;
        let (method, strategy) = file
            .methods()
            .into_iter()
            .filter(|(_, method)| method.has_annotation_with_prefix(prefix))
            .find_map(|(_, method)| {
                MatchStrategy::first_match(remainder, &method.property_name())
                    .map(|strategy| (method, strategy))
            })?;

        debug!(
            "Key remainder {} matched {} via {} strategy",
            remainder,
            method.name,
            strategy.name()
        );
        let range = LineIndex::new(&text).range(method.name_span.start, method.name_span.end);
        Some(Location::new(self.context.store.uri_for_path(&source_path)?, range))
    }
}
