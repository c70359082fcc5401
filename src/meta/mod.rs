//! Meta evaluator: runs the compile-time layer of a parsed unit and builds the residual tree.
//!
//! The residual tree gets its own root in the same arena as the semantic tree. Every residual node links
//! back to the semantic node it came from through `prev`; references (`rval`, `ty`) are rewritten to point
//! at residual nodes by [`MetaEvaluator::retarget`].
//!
//! ## Notes
//! - Declarations are merged: visiting a declaration whose name and kind already exist under the same
//!   residual owner reuses that node. Entities and components are duplicated per occurrence instead.
//! - Compile-time variables live in `Object` slots owned by the block that declared them. Expressions
//!   that only involve slots and literals fold into literals.
//! - `$if`, `$for` and calls of `$def` functions expand into flat blocks that the exporter renders inline.
//! - Errors are collected per member statement, like the semantic parser does.

mod control;
mod expressions;
pub mod value;

use eon_core::lang::kinds::{Category, DeclKind, MetaKind, NodeKind, StmtKind};
use eon_syntax::diagnostics::CompileError;
use eon_syntax::span::Span;

use crate::ast::{Ast, NodeId};
use crate::builtins::{META_LOOPSTMT, META_VOID};
use crate::frontend::scope::ScopeStack;
use crate::frontend::semantic::ParsedUnit;

pub(crate) type EResult<T> = Result<T, CompileError>;

/// Limits of the compile-time evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Upper bound on the iterations of one `$for` loop; unbounded when `None`.
    pub max_meta_iterations: Option<usize>,
    /// Upper bound on nested compile-time calls.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_meta_iterations: None,
            max_call_depth: 64,
        }
    }
}

/// Output of the meta evaluator.
#[derive(Debug, Clone)]
pub struct ResolvedUnit {
    pub ast: Ast,
    /// Root of the residual tree.
    pub root: NodeId,
    /// Root of the semantic tree it was built from.
    pub semantic_root: NodeId,
}

/// Evaluates the compile-time layer of one unit.
#[derive(Debug)]
pub struct MetaEvaluator {
    pub(crate) ast: Ast,
    semantic_root: NodeId,
    root: NodeId,
    pub(crate) scopes: ScopeStack,
    config: EvalConfig,
    /// A `return` inside a value-returning compile-time call has run; remaining statements are skipped.
    returning: bool,
    call_depth: usize,
    errors: Vec<CompileError>,
}

impl MetaEvaluator {
    /// Set up the residual root, re-seeding it with the builtins found in the semantic root.
    pub fn new(unit: ParsedUnit, config: EvalConfig) -> Self {
        let mut ast = unit.ast;
        let root = ast.alloc(NodeKind::TranslationUnit, "", Span::default());
        ast.node_mut(root).prev = Some(unit.root);
        let mut evaluator = Self {
            ast,
            semantic_root: unit.root,
            root,
            scopes: ScopeStack::new(root),
            config,
            returning: false,
            call_depth: 0,
            errors: Vec::new(),
        };
        evaluator.seed_builtins();
        evaluator
    }

    fn seed_builtins(&mut self) {
        let builtins: Vec<NodeId> = self
            .ast
            .children(self.semantic_root)
            .iter()
            .copied()
            .filter(|c| self.ast.is(*c, Category::Builtin))
            .collect();
        for b in &builtins {
            let src = self.ast.node(*b);
            let (kind, id, span) = (src.kind, src.id.clone(), src.span);
            let copy = self.ast.add(self.root, kind, id, span);
            self.ast.node_mut(copy).prev = Some(*b);
        }
        for b in builtins {
            if let Some(ty) = self.ast.node(b).ty {
                let copy = self.ast.find_prev_in(self.root, b);
                let ty = self.ast.find_prev_in(self.root, ty);
                if let Some(copy) = copy {
                    self.ast.node_mut(copy).ty = ty;
                }
            }
        }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Residual root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Evaluate every top-level member.
    ///
    /// ## Errors
    /// Returns every collected [`CompileError`] when any member failed.
    #[tracing::instrument(skip_all, fields(nodes = self.ast.len()))]
    pub fn run(mut self) -> Result<ResolvedUnit, Vec<CompileError>> {
        if let Err(internal) = self.visit_members(self.semantic_root) {
            self.errors.push(internal);
            return Err(self.errors);
        }
        if self.scopes.depth() != 1 {
            self.errors.push(CompileError::internal(
                format!("scope stack not balanced after evaluation (depth {})", self.scopes.depth()),
                Span::default(),
            ));
        }
        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "meta evaluation failed");
            return Err(self.errors);
        }
        tracing::debug!(residual = self.ast.count_under(self.root), "meta evaluation finished");
        Ok(ResolvedUnit {
            ast: self.ast,
            root: self.root,
            semantic_root: self.semantic_root,
        })
    }

    pub(crate) fn report(&mut self, err: CompileError) {
        tracing::trace!(error = %err, "meta error");
        self.errors.push(err);
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Visit the declarations and statements owned by `src` into the top frame, recovering after each
    /// failed one. Expression operands are reached through links only.
    pub(crate) fn visit_members(&mut self, src: NodeId) -> EResult<()> {
        let members: Vec<NodeId> = self
            .ast
            .children(src)
            .iter()
            .copied()
            .filter(|c| {
                self.ast.is(*c, Category::Declaration)
                    || self.ast.is(*c, Category::Statement)
                    || self.ast.is(*c, Category::MetaStatement)
            })
            .collect();
        for member in members {
            if self.returning {
                break;
            }
            let depth = self.scopes.depth();
            if let Err(err) = self.visit(member) {
                if err.is_internal() {
                    return Err(err);
                }
                self.report(err);
                self.scopes.truncate(depth);
            }
        }
        Ok(())
    }

    fn visit(&mut self, src: NodeId) -> EResult<Option<NodeId>> {
        match self.ast.kind(src) {
            NodeKind::Decl(DeclKind::Entity | DeclKind::Component) => {
                let owner = self.scopes.non_locked_top(&self.ast);
                let d = self.duplicate(src, owner);
                self.visit_container(src, d)
            }
            NodeKind::Decl(DeclKind::TypePointer | DeclKind::TypeLref) => Ok(self.retarget(src)),
            NodeKind::Decl(DeclKind::Builtin | DeclKind::FunctionBuiltin | DeclKind::Variable | DeclKind::Parameter) => {
                self.merge(src).map(Some)
            }
            NodeKind::NamePart | NodeKind::Decl(_) => {
                let d = self.merge(src)?;
                self.visit_container(src, d)
            }
            NodeKind::Meta(MetaKind::Builtin | MetaKind::Parameter | MetaKind::Else) => Ok(None),
            NodeKind::Meta(MetaKind::Function) => self.merge(src).map(Some),
            NodeKind::Meta(MetaKind::Variable) => self.declare_slot(src).map(Some),
            NodeKind::Meta(MetaKind::If) => self.meta_if(src),
            NodeKind::Meta(MetaKind::For) => self.meta_for(src),
            NodeKind::Meta(MetaKind::ForRange) => Err(CompileError::unsupported(
                "'$for ... in' loops are not supported yet",
                self.ast.node(src).span,
            )
            .with_hint("use '$for $int i = 0; i < n; i++:'")),
            NodeKind::Stmt(StmtKind::Block) => {
                let d = self.merge(src)?;
                self.visit_container(src, d)
            }
            NodeKind::Stmt(_) => self.statement(src),
            other => Err(CompileError::internal(
                format!("unexpected {} in statement position", other),
                self.ast.node(src).span,
            )),
        }
    }

    /// Open `d`, visit the members of `src` into it and close it again.
    fn visit_container(&mut self, src: NodeId, d: NodeId) -> EResult<Option<NodeId>> {
        self.scopes.push(&self.ast, d);
        self.visit_members(src)?;
        self.scopes.pop();
        Ok(Some(d))
    }

    fn statement(&mut self, src: NodeId) -> EResult<Option<NodeId>> {
        let kind = self.ast.kind(src);
        let rval = self.ast.node(src).rval;
        if let Some(r) = rval {
            if self.ast.kind(r) == NodeKind::Meta(MetaKind::Ctor) {
                self.meta_ctor(r)?;
                return Ok(None);
            }
            if kind == NodeKind::Stmt(StmtKind::Expr) && self.is_meta_effect(r) {
                self.constant(r)?;
                return Ok(None);
            }
        }
        let owner = self.scopes.non_locked_top(&self.ast);
        let d = self.duplicate(src, owner);
        if kind == NodeKind::Stmt(StmtKind::Else) {
            self.link_else(d);
        }
        self.scopes.push_single(d);
        if let Some(r) = rval {
            let value = self.expr(r)?;
            self.ast.node_mut(d).rval = Some(value);
        }
        self.visit_members(src)?;
        self.scopes.pop();
        if kind == NodeKind::Stmt(StmtKind::Return) && self.in_value_context() {
            if let Some(block) = self.scopes.nearest(&self.ast, Category::Compounding) {
                self.ast.node_mut(block).rval = self.ast.node(d).rval;
            }
            self.returning = true;
        }
        Ok(Some(d))
    }

    fn link_else(&mut self, else_dup: NodeId) {
        let Some(owner) = self.ast.node(else_dup).owner else {
            return;
        };
        let siblings = self.ast.children(owner);
        let prior = siblings
            .iter()
            .position(|c| *c == else_dup)
            .and_then(|pos| pos.checked_sub(1))
            .map(|pos| siblings[pos]);
        if let Some(p) = prior.filter(|p| self.ast.kind(*p) == NodeKind::Stmt(StmtKind::If)) {
            self.ast.node_mut(p).ctx_next = Some(else_dup);
        }
    }

    // ========================================================================
    // Merging and retargeting
    // ========================================================================

    /// Residual counterpart of declaration (or block) `src` under the current owner, created on first visit.
    fn merge(&mut self, src: NodeId) -> EResult<NodeId> {
        let owner = self.scopes.non_locked_top(&self.ast);
        let node = self.ast.node(src);
        let (kind, span) = (node.kind, node.span);
        let existing = if node.id.is_empty() {
            self.ast.first_child_of(owner, kind)
        } else {
            self.ast
                .children(owner)
                .iter()
                .copied()
                .find(|c| self.ast.node(*c).id == node.id && self.ast.is(*c, Category::Declaration))
        };
        match existing {
            Some(e) if self.ast.kind(e) == kind => Ok(e),
            Some(e) => Err(CompileError::redeclaration(
                format!(
                    "conflicting redeclaration of '{}': already declared as {}",
                    self.ast.path_of(src),
                    self.ast.kind(e)
                ),
                span,
            )),
            None => Ok(self.duplicate(src, owner)),
        }
    }

    /// Copy `src` (without children) under `owner`, linking it back through `prev`.
    pub(crate) fn duplicate(&mut self, src: NodeId, owner: NodeId) -> NodeId {
        let node = self.ast.node(src);
        let (kind, id, span, value, flat, ty) = (
            node.kind,
            node.id.clone(),
            node.span,
            node.value.clone(),
            node.flat,
            node.ty,
        );
        let d = self.ast.add(owner, kind, id, span);
        let ty = ty.and_then(|t| self.retarget(t));
        let dup = self.ast.node_mut(d);
        dup.prev = Some(src);
        dup.value = value;
        dup.flat = flat;
        dup.ty = ty;
        d
    }

    /// Residual counterpart of semantic node `target`.
    ///
    /// Tries the open frames first, then the subtree of the nearest open counterpart of one of `target`'s
    /// ancestors, then the whole residual tree. Pointer and reference types are created on first use.
    pub(crate) fn retarget(&mut self, target: NodeId) -> Option<NodeId> {
        if self.ast.tree_root(target) == self.root {
            return Some(target);
        }
        let frames: Vec<NodeId> = self.scopes.nodes().collect();
        if let Some(found) = frames.iter().find_map(|f| self.ast.find_prev_in(*f, target)) {
            return Some(found);
        }
        for anc in self.ast.ancestors(target) {
            let open = frames.iter().copied().find(|f| self.ast.node(*f).prev == Some(anc));
            if let Some(found) = open.and_then(|o| self.ast.find_prev_deep(o, target)) {
                return Some(found);
            }
        }
        if let Some(found) = self.ast.find_prev_deep(self.root, target) {
            return Some(found);
        }
        match self.ast.kind(target) {
            kind @ NodeKind::Decl(DeclKind::TypePointer | DeclKind::TypeLref) => {
                let base = self.ast.node(target).owner?;
                let base = self.retarget(base)?;
                let (id, span) = (self.ast.node(target).id.clone(), self.ast.node(target).span);
                let wrapper = self.ast.get_add(base, kind, &id, span);
                self.ast.node_mut(wrapper).prev = Some(target);
                Some(wrapper)
            }
            _ => None,
        }
    }

    /// Whether the innermost function-like context yields a compile-time value through `return`.
    pub(crate) fn in_value_context(&self) -> bool {
        for n in self.scopes.nodes() {
            if self.ast.is(n, Category::Function) {
                return false;
            }
            if let Some(ty) = self.ast.node(n).ty {
                if self.ast.is(n, Category::Compounding) {
                    return returns_value(&self.ast, ty);
                }
            }
        }
        false
    }
}

/// Compile-time types whose calls produce a value (every one except `$loopstmt` and `$void`).
pub(crate) fn returns_value(ast: &Ast, ty: NodeId) -> bool {
    let node = ast.node(ty);
    node.kind == NodeKind::Meta(MetaKind::Builtin) && node.id != META_LOOPSTMT && node.id != META_VOID
}

#[cfg(test)]
mod tests;
