//! Java source model
//!
//! Wraps the tree-sitter Java grammar in owned declarations (types, fields,
//! methods, annotations) and provides the property naming rules used to
//! relate accessor methods to resource keys.

pub mod naming;
pub mod syntax;

use thiserror::Error;

pub use naming::{capitalize, decapitalize, property_name};
pub use syntax::{Annotated, Annotation, FieldDecl, JavaFile, MethodDecl, Span, TypeDecl, TypeKind};

/// Errors raised while parsing Java source
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// The grammar could not be loaded
    #[error("Failed to load Java grammar: {0}")]
    Language(String),

    /// The parser produced no tree
    #[error("Parser produced no syntax tree")]
    NoTree,

    /// The text contains a syntax error
    #[error("Syntax error at {line}:{column}")]
    Malformed { line: usize, column: usize },
}

/// Result type for parsing operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;
