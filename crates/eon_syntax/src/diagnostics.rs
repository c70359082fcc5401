//! Compile errors shared by every stage.
//!
//! A stage reports problems as [`CompileError`] values and keeps going where it safely can; the pipeline turns
//! them into located diagnostics and stops at the first stage that reported any.

use std::fmt;

use crate::span::Span;

/// A compile-time error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Unexpected character or token, bad literal.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, span)
    }

    /// Indent/dedent/terminator where another was expected.
    pub fn structure(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Structure, message, span)
    }

    /// Declaration not found, invalid path segment.
    pub fn resolution(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Resolution, message, span)
    }

    /// Same key declared with a different kind.
    pub fn redeclaration(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Redeclaration, message, span)
    }

    /// Compile-time evaluation failure.
    pub fn evaluation(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Evaluation, message, span)
    }

    /// A construct with no implemented semantics in this stage.
    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Unsupported, message, span)
    }

    /// Broken compiler invariant; aborts the stage.
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Internal, message, span)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Structure,
    Resolution,
    Redeclaration,
    Evaluation,
    Unsupported,
    Internal,
    Warning,
}

impl ErrorKind {
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::Warning => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Structure => write!(f, "structure error"),
            ErrorKind::Resolution => write!(f, "resolution error"),
            ErrorKind::Redeclaration => write!(f, "redeclaration"),
            ErrorKind::Evaluation => write!(f, "evaluation error"),
            ErrorKind::Unsupported => write!(f, "unsupported"),
            ErrorKind::Internal => write!(f, "internal error"),
            ErrorKind::Warning => write!(f, "warning"),
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_keep_kind() {
        let e = CompileError::resolution("declaration not found: 'x'", Span::new(0, 1))
            .with_note("looked in 3 scopes")
            .with_hint("declare it before use");
        assert_eq!(e.kind, ErrorKind::Resolution);
        assert_eq!(e.notes.len(), 1);
        assert_eq!(e.hints.len(), 1);
        assert_eq!(e.to_string(), "resolution error: declaration not found: 'x'");
    }

    #[test]
    fn test_only_warnings_are_not_errors() {
        assert_eq!(ErrorKind::Warning.severity(), Severity::Warning);
        assert_eq!(ErrorKind::Internal.severity(), Severity::Error);
        assert!(CompileError::internal("scope underflow", Span::default()).is_internal());
    }
}
