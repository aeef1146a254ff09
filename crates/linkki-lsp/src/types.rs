//! Core LSP types and data structures
//!
//! This module defines the value types exchanged with the editor host, the
//! server error type, and the classification of documents into the two
//! artifact kinds the server understands.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Result type for LSP operations
pub type LspResult<T> = Result<T, LspError>;

/// LSP-specific error type
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum LspError {
    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Server state tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Server is initializing
    Initializing,
    /// Server is initialized and ready
    Initialized,
    /// Server is shutting down
    ShuttingDown,
    /// Server is shut down
    ShutDown,
}

/// Position in a document (0-based line, UTF-16 character offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-based)
    pub line: u32,
    /// Character offset (0-based)
    pub character: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Range in a document (start and end positions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start position
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering `len` characters of a single line
    pub fn on_line(line: u32, character: u32, len: u32) -> Self {
        Self::new(
            Position::new(line, character),
            Position::new(line, character + len),
        )
    }

    /// Whether the two ranges share at least one line
    pub fn overlaps_lines(&self, other: &Range) -> bool {
        self.start.line <= other.end.line && other.start.line <= self.end.line
    }
}

/// Location in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File URI
    pub uri: String,
    /// Range in the file
    pub range: Range,
}

impl Location {
    /// Create a new location
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

/// Diagnostic severity level, serialized as the protocol's numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Error severity
    Error = 1,
    /// Warning severity
    Warning = 2,
    /// Information severity
    Information = 3,
    /// Hint severity
    Hint = 4,
}

impl Serialize for DiagnosticSeverity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for DiagnosticSeverity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(DiagnosticSeverity::Error),
            2 => Ok(DiagnosticSeverity::Warning),
            3 => Ok(DiagnosticSeverity::Information),
            4 => Ok(DiagnosticSeverity::Hint),
            other => Err(serde::de::Error::custom(format!(
                "unknown diagnostic severity {}",
                other
            ))),
        }
    }
}

/// Diagnostic information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Range of the diagnostic
    pub range: Range,
    /// Severity level
    #[serde(default = "default_severity")]
    pub severity: DiagnosticSeverity,
    /// Diagnostic message
    pub message: String,
    /// Diagnostic code; clients may echo numeric codes back
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_code"
    )]
    pub code: Option<String>,
    /// Source of the diagnostic
    #[serde(default)]
    pub source: String,
}

fn default_severity() -> DiagnosticSeverity {
    DiagnosticSeverity::Error
}

fn deserialize_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(code)) => Some(code),
        Some(Value::Number(code)) => Some(code.to_string()),
        _ => None,
    })
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(range: Range, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
            source: "linkki-lsp".to_string(),
        }
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the diagnostic source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether the diagnostic carries exactly this code
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Code action kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeActionKind {
    /// Quick fix
    #[serde(rename = "quickfix")]
    QuickFix,
    /// Source
    #[serde(rename = "source")]
    Source,
    /// Source organize imports
    #[serde(rename = "source.organizeImports")]
    SourceOrganizeImports,
}

/// Text edit for code modifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    /// Range to replace
    pub range: Range,
    /// New text
    pub new_text: String,
}

impl TextEdit {
    /// Create a new text edit
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

/// Workspace edit for multi-file modifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEdit {
    /// Changes by file URI
    pub changes: HashMap<String, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    /// Create a new workspace edit
    pub fn new() -> Self {
        Self {
            changes: HashMap::new(),
        }
    }

    /// Add a text edit for a file
    pub fn add_edit(&mut self, uri: String, edit: TextEdit) {
        self.changes.entry(uri).or_default().push(edit);
    }

    /// Workspace edit consisting of a single text edit
    pub fn single(uri: impl Into<String>, edit: TextEdit) -> Self {
        let mut workspace_edit = Self::new();
        workspace_edit.add_edit(uri.into(), edit);
        workspace_edit
    }
}

impl Default for WorkspaceEdit {
    fn default() -> Self {
        Self::new()
    }
}

/// Command the host executes when a code action is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Command title shown to the user
    pub title: String,
    /// Command identifier
    pub command: String,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// Code action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeAction {
    /// Action title
    pub title: String,
    /// Action kind
    pub kind: CodeActionKind,
    /// Associated diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<Diagnostic>>,
    /// Workspace edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<WorkspaceEdit>,
    /// Command executed after the edit, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
}

impl CodeAction {
    /// Create a code action that applies an edit
    pub fn with_edit(title: impl Into<String>, kind: CodeActionKind, edit: WorkspaceEdit) -> Self {
        Self {
            title: title.into(),
            kind,
            diagnostics: None,
            edit: Some(edit),
            command: None,
        }
    }

    /// Create a code action that defers to a client-side command
    pub fn with_command(title: impl Into<String>, kind: CodeActionKind, command: Command) -> Self {
        Self {
            title: title.into(),
            kind,
            diagnostics: None,
            edit: None,
            command: Some(command),
        }
    }
}

/// Completion item kind (protocol numeric codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    /// Property
    Property = 10,
    /// Snippet
    Snippet = 15,
}

impl Serialize for CompletionItemKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// How the client interprets `insert_text`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTextFormat {
    /// Literal text
    PlainText = 1,
    /// Snippet with tab stops and placeholders
    Snippet = 2,
}

impl Serialize for InsertTextFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Completion item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    /// Label shown in the completion list
    pub label: String,
    /// Item kind
    pub kind: CompletionItemKind,
    /// Additional detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text_format: Option<InsertTextFormat>,
}

impl CompletionItem {
    /// Create a completion item with a label and kind
    pub fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            insert_text: None,
            insert_text_format: None,
        }
    }

    /// Set the detail text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Insert a snippet instead of the label
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.insert_text = Some(snippet.into());
        self.insert_text_format = Some(InsertTextFormat::Snippet);
        self
    }
}

/// Symbol kind (protocol numeric codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Class symbol
    Class = 5,
    /// Method symbol
    Method = 6,
    /// Property symbol
    Property = 7,
}

impl Serialize for SymbolKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Hierarchical outline symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbol {
    /// Symbol name
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Range of the whole declaration
    pub range: Range,
    /// Range of the name token
    pub selection_range: Range,
    /// Nested symbols
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    /// Create a symbol without children
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: Range, selection_range: Range) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            selection_range,
            children: Vec::new(),
        }
    }
}

/// The two artifact kinds the server understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Annotated source file
    Source,
    /// Line-oriented key/value resource file
    Resource,
    /// Anything else; handlers return empty results
    Other,
}

impl DocumentKind {
    /// Classify a URI or path by its extension
    pub fn detect(uri: &str, source_extension: &str, resource_extension: &str) -> Self {
        let path = uri.split(&['?', '#'][..]).next().unwrap_or(uri);
        match path.rsplit_once('.') {
            Some((_, ext)) if ext == source_extension => DocumentKind::Source,
            Some((_, ext)) if ext == resource_extension => DocumentKind::Resource,
            _ => DocumentKind::Other,
        }
    }
}
