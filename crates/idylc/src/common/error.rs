//! Error types and diagnostic reporting

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, NoColor, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;

/// Compile error with source location
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{file}:{span}: syntax error: {message}")]
    Lexer {
        message: String,
        file: Arc<str>,
        span: Span,
    },

    #[error("{file}:{span}: syntax error: {message}")]
    Parser {
        message: String,
        file: Arc<str>,
        span: Span,
    },

    #[error("{file}:{span}: semantic error: {message}")]
    Semantic {
        message: String,
        file: Arc<str>,
        span: Span,
    },

    #[error("library '{name}' not found: {}", .path.display())]
    LibraryNotFound { name: String, path: PathBuf },

    #[error("cannot read library '{name}' from {}: {source}", .path.display())]
    LibraryRead {
        name: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, file: &Arc<str>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            file: Arc::clone(file),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, file: &Arc<str>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            file: Arc::clone(file),
            span,
        }
    }

    pub fn semantic(message: impl Into<String>, file: &Arc<str>, span: Span) -> Self {
        Self::Semantic {
            message: message.into(),
            file: Arc::clone(file),
            span,
        }
    }

    pub fn library_read(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::LibraryRead {
            name: name.into(),
            path: path.into(),
            source,
        }
    }

    pub fn library_not_found(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::LibraryNotFound {
            name: name.into(),
            path: path.into(),
        }
    }

    /// The description without the position prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Lexer { message, .. }
            | Self::Parser { message, .. }
            | Self::Semantic { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } | Self::Semantic { span, .. } => {
                Some(*span)
            }
            _ => None,
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Lexer { file, .. } | Self::Parser { file, .. } | Self::Semantic { file, .. } => {
                Some(file.as_ref())
            }
            _ => None,
        }
    }

    /// Lexical and grammatical faults both belong to the syntax class.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Lexer { .. } | Self::Parser { .. })
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::Semantic { .. })
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    ids: HashMap<String, usize>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            ids: HashMap::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        let name = name.into();
        let id = self.files.add(name.clone(), source.into());
        self.ids.insert(name, id);
        id
    }

    pub fn report_error(&self, error: &CompileError) {
        let diagnostic = self.diagnostic(error);
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }

    /// Render a diagnostic without colors, e.g. for tests or log files.
    pub fn render_to_string(&self, error: &CompileError) -> String {
        let mut buffer = NoColor::new(Vec::new());
        self.emit_into(&mut buffer, error);
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }

    fn emit_into(&self, writer: &mut dyn WriteColor, error: &CompileError) {
        let diagnostic = self.diagnostic(error);
        let _ = term::emit(writer, &self.config, &self.files, &diagnostic);
    }

    fn diagnostic(&self, error: &CompileError) -> Diagnostic<usize> {
        let title = match error {
            CompileError::Lexer { .. } | CompileError::Parser { .. } => "syntax error",
            CompileError::Semantic { .. } => "semantic error",
            CompileError::LibraryNotFound { .. } => "library not found",
            CompileError::LibraryRead { .. } => "cannot read library",
        };

        let located = error
            .file()
            .and_then(|file| self.ids.get(file).copied())
            .zip(error.span());

        match located {
            Some((file_id, span)) => Diagnostic::error().with_message(title).with_labels(vec![
                Label::primary(file_id, span.start..span.end).with_message(error.message()),
            ]),
            None => Diagnostic::error().with_message(error.to_string()),
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let file: Arc<str> = Arc::from("demo.idyl");
        let err = CompileError::parser("expected ';'", &file, Span::new(10, 11, 2, 7));

        assert_eq!(err.to_string(), "demo.idyl:2:7: syntax error: expected ';'");
        assert_eq!(err.message(), "expected ';'");
        assert_eq!(err.span(), Some(Span::new(10, 11, 2, 7)));
        assert!(err.is_syntax());
    }

    #[test]
    fn test_render_with_registered_file() {
        let mut reporter = DiagnosticReporter::new();
        reporter.add_file("demo.idyl", "main() { x = 1; }");
        let file: Arc<str> = Arc::from("demo.idyl");
        let err = CompileError::semantic("variable 'x' is not declared", &file, Span::new(9, 14, 1, 10));

        let rendered = reporter.render_to_string(&err);
        assert!(rendered.contains("semantic error"));
        assert!(rendered.contains("variable 'x' is not declared"));
    }

    #[test]
    fn test_render_without_position() {
        let reporter = DiagnosticReporter::new();
        let err = CompileError::library_not_found("mathlib", "/tmp/mathlib.idyl");

        let rendered = reporter.render_to_string(&err);
        assert!(rendered.contains("library 'mathlib' not found"));
    }
}
