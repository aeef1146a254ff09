//! Language Server Protocol backend for linkki binding annotations
//!
//! This crate provides editor support for the linkki convention of binding
//! annotated Java accessor methods (`@UITextField`, `@UICheckBox`, ...) to
//! keys in `.properties` resource bundles named `ClassName_propertyName`.
//!
//! # Architecture
//!
//! 1. **Document Store**: URI to text for every open document; the only shared mutable state
//! 2. **Models**: the resource group parser and the tree-sitter Java syntax model
//! 3. **Engines**: diagnostics, definition, completion, code actions, outline and
//!    formatting, each built per request over an [`AnalysisContext`]
//! 4. **Server**: JSON-RPC dispatch and lifecycle over a `Content-Length` framed transport
//!
//! Every request re-parses the current text; no engine keeps parsed state.

pub mod code_actions;
pub mod completion;
pub mod config;
pub mod definition;
pub mod diagnostics;
pub mod formatting;
pub mod java;
pub mod layout;
pub mod properties;
pub mod server;
pub mod store;
pub mod symbols;
pub mod text;
pub mod transport;
pub mod types;

// Re-export public API
pub use code_actions::CodeActionsEngine;
pub use completion::CompletionEngine;
pub use config::{CompilerConfig, ConfigLoader, ServerConfig};
pub use definition::DefinitionResolver;
pub use diagnostics::{Compiler, DiagnosticsEngine, JavacCompiler};
pub use formatting::FormattingEngine;
pub use server::LspServer;
pub use store::DocumentStore;
pub use symbols::SymbolsBuilder;
pub use types::{CodeAction, Diagnostic, Location, Position, Range};

use layout::ProjectLayout;

/// Server-lifetime state handed by reference to every engine
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    /// Open documents
    pub store: &'a DocumentStore,
    /// Active configuration
    pub config: &'a ServerConfig,
}

impl<'a> AnalysisContext<'a> {
    /// Create a context
    pub fn new(store: &'a DocumentStore, config: &'a ServerConfig) -> Self {
        Self { store, config }
    }

    /// Directory conventions for the active configuration
    pub fn layout(&self) -> ProjectLayout<'a> {
        ProjectLayout::new(self.config)
    }
}
