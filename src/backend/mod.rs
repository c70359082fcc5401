//! Eon compiler backend
//!
//! Renders the residual tree produced by the meta evaluator as text.
//!
//! ## Module Organization
//!
//! - `config.rs` - [`ExportConfig`], layout of the exported text
//! - `writer.rs` - [`CodeWriter`], indentation-tracking string builder
//! - `cpp.rs` - C-like source export
//!
//! The [`Target::AstDump`] target renders the residual tree with [`crate::ast::dump`] instead.

#![deny(clippy::unwrap_used)]

mod config;
mod cpp;
mod writer;

pub use config::ExportConfig;
pub use writer::CodeWriter;

use eon_syntax::diagnostics::CompileError;
use eon_syntax::span::Span;

use crate::ast;
use crate::meta::ResolvedUnit;

/// Output language of the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Target {
    /// C-like source text.
    #[default]
    Cpp,
    /// Indented dump of the residual tree.
    AstDump,
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Cpp => "cpp",
            Target::AstDump => "ast",
        }
    }

    /// File extension used when the CLI derives an output path.
    pub fn extension(self) -> &'static str {
        match self {
            Target::Cpp => "cpp",
            Target::AstDump => "ast.txt",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a residual tree could not be exported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// A construct the target has no rendering for yet.
    #[error("{form} cannot be exported yet")]
    Unsupported { form: &'static str, span: Span },
    /// The residual tree breaks a shape the evaluator guarantees.
    #[error("malformed residual tree: {message}")]
    Malformed { message: String, span: Span },
}

impl ExportError {
    pub fn span(&self) -> Span {
        match self {
            ExportError::Unsupported { span, .. } | ExportError::Malformed { span, .. } => *span,
        }
    }
}

impl From<ExportError> for CompileError {
    fn from(err: ExportError) -> Self {
        let span = err.span();
        match err {
            ExportError::Unsupported { .. } => CompileError::unsupported(err.to_string(), span),
            ExportError::Malformed { .. } => CompileError::internal(err.to_string(), span),
        }
    }
}

/// Render `unit` for `target`.
///
/// ## Errors
/// Returns [`ExportError::Unsupported`] for constructs the C-like target cannot render; the AST dump
/// target never fails.
#[tracing::instrument(skip_all, fields(target = %target))]
pub fn export(unit: &ResolvedUnit, target: Target, config: &ExportConfig) -> Result<String, ExportError> {
    let text = match target {
        Target::Cpp => cpp::CppExporter::new(&unit.ast, config.clone()).export(unit.root)?,
        Target::AstDump => {
            let mut writer = CodeWriter::new(config.clone());
            for line in ast::dump(&unit.ast, unit.root).lines() {
                writer.writeln(line);
            }
            writer.finish()
        }
    };
    tracing::debug!(bytes = text.len(), "export finished");
    Ok(text)
}

#[cfg(test)]
mod tests;
