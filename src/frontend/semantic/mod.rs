//! Semantic parser: turns the structure tree into the semantic AST.
//!
//! Parsing is split in two layers:
//! - [`builder`]: a small push/pop API that places declarations, statements and expression nodes into the
//!   tree relative to the open [`ScopeStack`] frames.
//! - [`statements`] and [`expressions`]: the grammar driver, which walks each structure-tree statement
//!   with a token [`cursor::Cursor`] and calls the builder.
//!
//! ## Notes
//! - Identifiers are resolved while parsing, against the declarations seen so far (innermost scope
//!   first). A missing declaration yields an `Unresolved` placeholder plus a diagnostic.
//! - Errors are collected per statement: a failed statement restores the scope depth and parsing continues
//!   with the next one. Internal errors abort the stage.

mod builder;
mod cursor;
mod expressions;
mod statements;

use eon_syntax::diagnostics::CompileError;
use eon_syntax::lexer::Token;
use eon_syntax::span::Span;
use eon_syntax::structure::StructureTree;

use super::scope::ScopeStack;
use crate::ast::{Ast, NodeId};
use crate::builtins::Builtins;

/// Output of the semantic parser.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub ast: Ast,
    /// Root of the semantic tree.
    pub root: NodeId,
}

/// Builds the semantic AST for one translation unit.
#[derive(Debug)]
pub struct SemanticParser {
    pub(crate) ast: Ast,
    pub(crate) scopes: ScopeStack,
    errors: Vec<CompileError>,
}

impl SemanticParser {
    /// Create a parser whose root already holds the builtin declarations.
    pub fn new(builtins: &Builtins) -> Self {
        let mut ast = Ast::new();
        let root = ast.root();
        builtins.seed(&mut ast, root);
        Self {
            ast,
            scopes: ScopeStack::new(root),
            errors: Vec::new(),
        }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Parse every statement of `tree`.
    ///
    /// ## Errors
    /// Returns every collected [`CompileError`] when any statement failed.
    #[tracing::instrument(skip_all, fields(statements = tree.statements.len()))]
    pub fn parse(mut self, tokens: &[Token], tree: &StructureTree) -> Result<ParsedUnit, Vec<CompileError>> {
        if let Err(internal) = self.statements(tokens, &tree.statements) {
            self.errors.push(internal);
            return Err(self.errors);
        }
        if self.scopes.depth() != 1 {
            self.errors.push(CompileError::internal(
                format!("scope stack not balanced after parsing (depth {})", self.scopes.depth()),
                Span::default(),
            ));
        }
        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "semantic parse failed");
            return Err(self.errors);
        }
        let root = self.ast.root();
        tracing::debug!(nodes = self.ast.len(), "semantic parse finished");
        Ok(ParsedUnit { ast: self.ast, root })
    }

    /// Record a recoverable error and keep going.
    pub(crate) fn report(&mut self, err: CompileError) {
        tracing::trace!(error = %err, "semantic error");
        self.errors.push(err);
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }
}
