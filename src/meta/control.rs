//! `$if` / `$else` and `$for`.

use eon_core::lang::kinds::{Category, MetaKind, NodeKind, StmtKind};
use eon_syntax::diagnostics::CompileError;

use super::{EResult, MetaEvaluator};
use crate::ast::NodeId;

impl MetaEvaluator {
    /// Pick the `$if` or `$else` body by the value of the condition and expand it into a flat block.
    pub(super) fn meta_if(&mut self, src: NodeId) -> EResult<Option<NodeId>> {
        let cond = self.ast.node(src).rval.ok_or_else(|| {
            CompileError::internal("'$if' without a condition", self.ast.node(src).span)
        })?;
        let taken = self.constant(cond)?.is_truthy();
        let branch = if taken {
            Some(src)
        } else {
            self.ast
                .node(src)
                .ctx_next
                .filter(|e| self.ast.kind(*e) == NodeKind::Meta(MetaKind::Else))
        };
        tracing::trace!(taken, "compile-time if");
        let Some(body) = branch.and_then(|b| self.ast.first_child_of(b, NodeKind::Stmt(StmtKind::Block))) else {
            return Ok(None);
        };
        let block = self.flat_block(body);
        self.scopes.push_single(block);
        self.visit_members(body)?;
        self.scopes.pop();
        self.propagate_return(block);
        Ok(Some(block))
    }

    /// Run a `$for` loop: the initializer once, then one flat block per iteration.
    pub(super) fn meta_for(&mut self, src: NodeId) -> EResult<Option<NodeId>> {
        let span = self.ast.node(src).span;
        let header = |kind: StmtKind| {
            self.ast
                .first_child_of(src, NodeKind::Stmt(kind))
                .and_then(|s| self.ast.node(s).rval)
        };
        let (cond, post) = (header(StmtKind::ForCond), header(StmtKind::ForPost));
        let body = self
            .ast
            .first_child_of(src, NodeKind::Stmt(StmtKind::Block))
            .ok_or_else(|| CompileError::internal("'$for' without a body", span))?;

        let outer = self.flat_block(src);
        self.scopes.push_single(outer);
        let result = self.meta_loop(src, cond, post, body, outer);
        self.scopes.pop();
        result?;
        self.propagate_return(outer);
        Ok(Some(outer))
    }

    fn meta_loop(
        &mut self,
        src: NodeId,
        cond: Option<NodeId>,
        post: Option<NodeId>,
        body: NodeId,
        outer: NodeId,
    ) -> EResult<()> {
        let span = self.ast.node(src).span;
        let init: Vec<NodeId> = self
            .ast
            .children(src)
            .iter()
            .copied()
            .filter(|c| {
                !matches!(
                    self.ast.kind(*c),
                    NodeKind::Stmt(StmtKind::ForCond | StmtKind::ForPost | StmtKind::Block)
                )
            })
            .filter(|c| self.ast.is(*c, Category::Declaration) || self.ast.is(*c, Category::Statement))
            .collect();
        for member in init {
            self.visit(member)?;
        }

        let mut iterations = 0usize;
        loop {
            if let Some(c) = cond {
                if !self.constant(c)?.is_truthy() {
                    break;
                }
            }
            if let Some(max) = self.config.max_meta_iterations {
                if iterations >= max {
                    return Err(CompileError::evaluation(
                        format!("compile-time loop exceeded {} iterations", max),
                        span,
                    )
                    .with_hint("raise the limit with '--max-meta-iterations'"));
                }
            }
            let iteration = self.flat_block(body);
            self.scopes.push_single(iteration);
            let visited = self.visit_members(body);
            self.scopes.pop();
            visited?;
            iterations += 1;
            if self.returning {
                if let Some(v) = self.ast.node(iteration).rval {
                    self.ast.node_mut(outer).rval = Some(v);
                }
                break;
            }
            if let Some(p) = post {
                self.constant(p)?;
            }
        }
        tracing::trace!(iterations, "compile-time loop");
        Ok(())
    }

    /// New flat block under the current owner, linked back to `prev`.
    fn flat_block(&mut self, prev: NodeId) -> NodeId {
        let owner = self.scopes.non_locked_top(&self.ast);
        let span = self.ast.node(prev).span;
        let block = self.ast.add(owner, NodeKind::Stmt(StmtKind::Block), "", span);
        let node = self.ast.node_mut(block);
        node.flat = true;
        node.prev = Some(prev);
        block
    }

    /// Hand the value of a `return` that ran inside `block` to the enclosing block.
    fn propagate_return(&mut self, block: NodeId) {
        if !self.returning {
            return;
        }
        let Some(v) = self.ast.node(block).rval else {
            return;
        };
        if let Some(enclosing) = self.scopes.nearest(&self.ast, Category::Compounding) {
            self.ast.node_mut(enclosing).rval = Some(v);
        }
    }
}
