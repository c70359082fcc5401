//! Located diagnostics handed to callers and sinks.

use std::fmt;

use eon_syntax::diagnostics::{CompileError, ErrorKind, Severity};
use eon_syntax::span::{Span, line_info};

/// 1-based position of a diagnostic in a named source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// A [`CompileError`] resolved against the source it was reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub location: Location,
    /// Text of the line the diagnostic starts on.
    pub line_text: String,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn from_error(err: &CompileError, file: &str, source: &str) -> Self {
        let (pos, line_text) = line_info(source, err.span.start);
        Self {
            severity: err.kind.severity(),
            kind: err.kind,
            message: err.message.clone(),
            span: err.span,
            location: Location {
                file: file.to_string(),
                line: pos.line,
                col: pos.col,
            },
            line_text: line_text.to_string(),
            notes: err.notes.clone(),
            hints: err.hints.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_span() {
        let err = CompileError::resolution("declaration not found: 'y'", Span::new(14, 15)).with_hint("declare it first");
        let d = Diagnostic::from_error(&err, "main.eon", "int x = 1\nx = y\n");
        assert_eq!(
            d.location,
            Location {
                file: "main.eon".into(),
                line: 2,
                col: 5
            }
        );
        assert_eq!(d.line_text, "x = y");
        assert_eq!(d.hints, vec!["declare it first".to_string()]);
        assert!(d.is_error());
        assert!(!d.is_internal());
        assert_eq!(d.to_string(), "main.eon:2:5: resolution error: declaration not found: 'y'");
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let err = CompileError::new(ErrorKind::Warning, "unused", Span::default());
        let d = Diagnostic::from_error(&err, "a.eon", "");
        assert_eq!(d.severity, Severity::Warning);
        assert!(!d.is_error());
        assert_eq!(d.location.line, 1);
    }
}
