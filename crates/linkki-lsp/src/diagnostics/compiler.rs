//! Compile capability used for source diagnostics
//!
//! The server never compiles anything itself. A [`Compiler`] takes the text
//! of one source document and reports raw diagnostics, including those of
//! the linkki annotation processor.

use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::CompilerConfig;
use crate::store::uri_to_path;
use crate::types::DiagnosticSeverity;

/// Errors raised by a compile capability
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler process could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The scratch copy of the document could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A classpath entry cannot be joined into a search path
    #[error("Invalid path list: {0}")]
    InvalidPathList(String),
}

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Where a raw diagnostic points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSpan {
    /// Byte offsets into the compiled text
    Offsets { start: usize, end: usize },
    /// 1-based line and column
    LineColumn { line: u32, column: u32 },
}

/// A diagnostic as reported by the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    /// Compiler code such as `compiler.err.proc.messager`
    pub code: Option<String>,
    pub span: RawSpan,
}

/// Compile and annotation-validation pass over a single document
pub trait Compiler: Send + Sync {
    /// Compile `text` as the only compilation unit
    fn compile(&self, uri: &str, text: &str) -> CompileResult<Vec<RawDiagnostic>>;

    /// Adopt settings changed after construction, e.g. by the client
    fn reconfigure(&mut self, _config: &CompilerConfig) {}
}

/// Runs an external `javac` with the annotation processor attached
#[derive(Debug, Clone)]
pub struct JavacCompiler {
    config: CompilerConfig,
}

static RAW_DIAGNOSTIC: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+):(?:(?P<column>\d+):)? (?P<code>compiler\.[\w.\-]+): (?P<message>.*)$")
        .ok()
});

impl JavacCompiler {
    /// Create a compiler for the given settings
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    fn command(&self, source_file: &Path) -> CompileResult<Command> {
        let mut command = Command::new(&self.config.javac);
        command
            .arg("-XDrawDiagnostics")
            .arg("-proc:only")
            .arg("-implicit:none")
            .arg("-encoding")
            .arg("UTF-8");

        if !self.config.classpath.is_empty() {
            command.arg("-classpath").arg(join_paths(&self.config.classpath)?);
        }
        if !self.config.processor_path.is_empty() {
            command
                .arg("-processorpath")
                .arg(join_paths(&self.config.processor_path)?);
        }
        if !self.config.processors.is_empty() {
            command.arg("-processor").arg(self.config.processors.join(","));
        }
        command.args(&self.config.extra_args).arg(source_file);
        Ok(command)
    }
}

impl Compiler for JavacCompiler {
    fn reconfigure(&mut self, config: &CompilerConfig) {
        self.config = config.clone();
    }

    fn compile(&self, uri: &str, text: &str) -> CompileResult<Vec<RawDiagnostic>> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }

        let scratch = tempfile::tempdir()?;
        let source_file = scratch.path().join(file_name(uri));
        std::fs::write(&source_file, text)?;

        let mut command = self.command(&source_file)?;
        debug!("Running {:?}", command);
        let output = command.output().map_err(|source| {
            error!("Failed to start {}: {}", self.config.javac, source);
            CompileError::Spawn {
                program: self.config.javac.clone(),
                source,
            }
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics: Vec<RawDiagnostic> = stderr
            .lines()
            .chain(stdout.lines())
            .filter_map(parse_raw_diagnostic)
            .collect();

        debug!(
            "javac exited with {} and reported {} diagnostics",
            output.status,
            diagnostics.len()
        );
        Ok(diagnostics)
    }
}

fn join_paths(entries: &[String]) -> CompileResult<std::ffi::OsString> {
    std::env::join_paths(entries).map_err(|e| CompileError::InvalidPathList(e.to_string()))
}

/// File name javac expects for the document (public classes must match it)
fn file_name(uri: &str) -> String {
    uri_to_path(uri)
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .or_else(|| {
            uri.rsplit('/')
                .next()
                .filter(|name| name.ends_with(".java"))
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Source.java".to_string())
}

/// Parse one `-XDrawDiagnostics` line (`Foo.java:12:5: compiler.err.x: message`)
pub fn parse_raw_diagnostic(line: &str) -> Option<RawDiagnostic> {
    let captures = RAW_DIAGNOSTIC.as_ref()?.captures(line.trim_end())?;
    let code = captures.name("code")?.as_str();
    let line_number = captures.name("line")?.as_str().parse().ok()?;
    let column = captures
        .name("column")
        .and_then(|column| column.as_str().parse().ok())
        .unwrap_or(1);

    let severity = if code.starts_with("compiler.err") {
        DiagnosticSeverity::Error
    } else if code.starts_with("compiler.warn") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Information
    };

    Some(RawDiagnostic {
        severity,
        message: captures.name("message")?.as_str().to_string(),
        code: Some(code.to_string()),
        span: RawSpan::LineColumn {
            line: line_number,
            column,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_processor_message() {
        let raw = parse_raw_diagnostic(
            "OrderPmo.java:12:20: compiler.err.proc.messager: Method \"isNoteVisible()\" is missing [MISSING_METHOD]",
        )
        .unwrap();
        assert_eq!(raw.severity, DiagnosticSeverity::Error);
        assert_eq!(raw.code.as_deref(), Some("compiler.err.proc.messager"));
        assert_eq!(raw.span, RawSpan::LineColumn { line: 12, column: 20 });
        assert!(raw.message.ends_with("[MISSING_METHOD]"));
    }

    #[test]
    fn test_parse_warning_without_column() {
        let raw = parse_raw_diagnostic("A.java:3: compiler.warn.proc.messager: careful").unwrap();
        assert_eq!(raw.severity, DiagnosticSeverity::Warning);
        assert_eq!(raw.span, RawSpan::LineColumn { line: 3, column: 1 });
    }

    #[test]
    fn test_ignore_other_lines() {
        assert!(parse_raw_diagnostic("1 error").is_none());
        assert!(parse_raw_diagnostic("- compiler.note.proc.messager: note").is_none());
        assert!(parse_raw_diagnostic("").is_none());
    }

    #[test]
    fn test_file_name_from_uri() {
        assert_eq!(file_name("file:///p/src/main/java/OrderPmo.java"), "OrderPmo.java");
        assert_eq!(file_name("untitled:Untitled-1"), "Source.java");
    }

    #[test]
    fn test_disabled_compiler_reports_nothing() {
        let compiler = JavacCompiler::new(CompilerConfig {
            enabled: false,
            ..CompilerConfig::default()
        });
        assert!(compiler.compile("file:///A.java", "class A {}").unwrap().is_empty());
    }

    #[test]
    fn test_missing_javac_is_spawn_error() {
        let compiler = JavacCompiler::new(CompilerConfig {
            javac: "/nonexistent/linkki/javac".to_string(),
            ..CompilerConfig::default()
        });
        let result = compiler.compile("file:///A.java", "class A {}");
        assert!(matches!(result, Err(CompileError::Spawn { .. })));
    }
}
