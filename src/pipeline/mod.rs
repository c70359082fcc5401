//! Compile pipeline: tokenize, structure, parse, evaluate, export.
//!
//! [`Compiler`] drives the stages in order and stops at the first one that reports an error. Every stage is
//! also exposed on its own for tooling that wants partial results (the CLI debug flags use them).
//!
//! ## Notes
//! - Diagnostics are delivered to every sink registered with [`Compiler::on_diagnostic`] as they are
//!   produced, and also returned in the [`PipelineError`] of the failing stage.
//! - `${NAME}` placeholders are not expanded here; callers substitute them in the raw text first.

mod diagnostic;

pub use diagnostic::{Diagnostic, Location};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use eon_syntax::diagnostics::CompileError;
use eon_syntax::lexer::{self, Token};
use eon_syntax::structure::{self, StructureTree};

use crate::backend::{self, ExportConfig, Target};
use crate::builtins::Builtins;
use crate::frontend::semantic::{ParsedUnit, SemanticParser};
use crate::meta::{EvalConfig, MetaEvaluator, ResolvedUnit};

// ============================================================================
// Options
// ============================================================================

/// Settings for one [`Compiler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Target used by [`Compiler::compile_file`].
    pub target: Target,
    pub export: ExportConfig,
    pub eval: EvalConfig,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    pub fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    /// Bound the iterations of each `$for` loop.
    pub fn with_max_meta_iterations(mut self, max: usize) -> Self {
        self.eval.max_meta_iterations = Some(max);
        self
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Pipeline stage, as named in diagnostics and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Tokenize,
    Structure,
    Parse,
    Meta,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Tokenize => "tokenizing",
            Stage::Structure => "structure building",
            Stage::Parse => "parsing",
            Stage::Meta => "compile-time evaluation",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

/// Why a compile produced no text.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A stage reported user errors.
    #[error("{stage} failed with {} error(s)", diagnostics.len())]
    Stage { stage: Stage, diagnostics: Vec<Diagnostic> },
    /// A stage broke one of its own invariants.
    #[error("internal compiler error during {stage}")]
    Internal { stage: Stage, diagnostics: Vec<Diagnostic> },
}

impl PipelineError {
    /// Diagnostics of the failing stage; empty for I/O errors.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            PipelineError::Io { .. } => &[],
            PipelineError::Stage { diagnostics, .. } | PipelineError::Internal { diagnostics, .. } => diagnostics,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Io { .. } => None,
            PipelineError::Stage { stage, .. } | PipelineError::Internal { stage, .. } => Some(*stage),
        }
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Source text with the name diagnostics refer to it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

type Sink<'s> = Box<dyn FnMut(&Diagnostic) + 's>;

/// Drives the compile stages for any number of sources.
///
/// A compiler is used from one thread at a time; each compile builds its own trees and scope stack.
pub struct Compiler<'b> {
    builtins: &'b Builtins,
    options: CompileOptions,
    sinks: Vec<Sink<'b>>,
}

impl fmt::Debug for Compiler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("options", &self.options)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<'b> Compiler<'b> {
    pub fn new(builtins: &'b Builtins, options: CompileOptions) -> Self {
        Self {
            builtins,
            options,
            sinks: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Register a sink that sees every diagnostic as it is reported.
    pub fn on_diagnostic(&mut self, sink: impl FnMut(&Diagnostic) + 'b) {
        self.sinks.push(Box::new(sink));
    }

    /// Read `path` and compile it for the configured target.
    ///
    /// ## Errors
    /// [`PipelineError::Io`] when the file cannot be read, otherwise as [`Compiler::compile`].
    pub fn compile_file(&mut self, path: &Path) -> Result<String, PipelineError> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let target = self.options.target;
        self.compile(&content, &path.to_string_lossy(), target)
    }

    /// Compile `content`, reporting diagnostics against `virtual_path`.
    ///
    /// ## Errors
    /// The error of the first stage that reported anything; no text is produced in that case.
    #[tracing::instrument(skip(self, content), fields(len = content.len()))]
    pub fn compile(&mut self, content: &str, virtual_path: &str, target: Target) -> Result<String, PipelineError> {
        let file = SourceFile::new(virtual_path, content);
        let tokens = self.tokenize(&file)?;
        let tree = self.parse_structure(&file, &tokens)?;
        let unit = self.parse(&file, &tokens, &tree)?;
        let resolved = self.run_meta(&file, unit)?;
        self.export(&file, &resolved, target)
    }

    /// ## Errors
    /// Every tokenizer error.
    pub fn tokenize(&mut self, file: &SourceFile) -> Result<Vec<Token>, PipelineError> {
        let result = lexer::lex(&file.content);
        self.finish_stage(file, Stage::Tokenize, result)
    }

    /// ## Errors
    /// Every layout error.
    pub fn parse_structure(&mut self, file: &SourceFile, tokens: &[Token]) -> Result<StructureTree, PipelineError> {
        let result = structure::build(tokens);
        self.finish_stage(file, Stage::Structure, result)
    }

    /// ## Errors
    /// Every resolution and declaration error.
    pub fn parse(
        &mut self,
        file: &SourceFile,
        tokens: &[Token],
        tree: &StructureTree,
    ) -> Result<ParsedUnit, PipelineError> {
        let result = SemanticParser::new(self.builtins).parse(tokens, tree);
        self.finish_stage(file, Stage::Parse, result)
    }

    /// ## Errors
    /// Every compile-time evaluation error.
    pub fn run_meta(&mut self, file: &SourceFile, unit: ParsedUnit) -> Result<ResolvedUnit, PipelineError> {
        let result = MetaEvaluator::new(unit, self.options.eval.clone()).run();
        self.finish_stage(file, Stage::Meta, result)
    }

    /// ## Errors
    /// The first construct `target` cannot render.
    pub fn export(&mut self, file: &SourceFile, unit: &ResolvedUnit, target: Target) -> Result<String, PipelineError> {
        let result = backend::export(unit, target, &self.options.export).map_err(|e| vec![CompileError::from(e)]);
        self.finish_stage(file, Stage::Export, result)
    }

    fn finish_stage<T>(
        &mut self,
        file: &SourceFile,
        stage: Stage,
        result: Result<T, Vec<CompileError>>,
    ) -> Result<T, PipelineError> {
        match result {
            Ok(value) => Ok(value),
            Err(errors) => {
                let diagnostics: Vec<Diagnostic> = errors
                    .iter()
                    .map(|e| Diagnostic::from_error(e, &file.path, &file.content))
                    .collect();
                for d in &diagnostics {
                    for sink in &mut self.sinks {
                        sink(d);
                    }
                }
                tracing::debug!(%stage, errors = diagnostics.len(), "stage failed");
                if diagnostics.iter().any(Diagnostic::is_internal) {
                    Err(PipelineError::Internal { stage, diagnostics })
                } else {
                    Err(PipelineError::Stage { stage, diagnostics })
                }
            }
        }
    }
}
