//! Push/pop builder API used by the grammar driver.
//!
//! Every `push_*` opens a frame that a matching `pop_*` closes. Expression operands are single frames: an
//! operator built with [`SemanticParser::expr_n`] takes the N topmost operand frames as its arguments and
//! replaces them with one frame for itself.

use eon_core::lang::kinds::{Category, DeclKind, MetaKind, NodeKind, OpKind, StmtKind};
use eon_syntax::diagnostics::CompileError;
use eon_syntax::span::Span;

use super::SemanticParser;
use super::cursor::PResult;
use crate::ast::{NodeId, Value};
use crate::frontend::lookup::PathIdentifier;

impl SemanticParser {
    // ========================================================================
    // Declarations
    // ========================================================================

    /// Walk (or create) the name chain of `path` under `owner` and give its last segment `kind`.
    ///
    /// An existing node of the same kind is reopened; a name segment without meaning yet takes the
    /// kind. Any other existing kind is a conflicting redeclaration.
    pub fn declare(&mut self, owner: NodeId, path: &PathIdentifier, kind: NodeKind) -> PResult<NodeId> {
        let mut cur = owner;
        let count = path.parts.len();
        for part in &path.parts[..count.saturating_sub(1)] {
            cur = match self.ast.find_child_in(cur, &part.name, Category::ClassPath) {
                Some(existing) => existing,
                None => self.ast.add(cur, NodeKind::NamePart, part.name.as_str(), part.span),
            };
        }
        let name = path.last_name();
        let existing = self
            .ast
            .children(cur)
            .iter()
            .copied()
            .find(|c| self.ast.node(*c).id == name && self.ast.is(*c, Category::Declaration));
        match existing {
            Some(e) if self.ast.kind(e) == kind => Ok(e),
            Some(e) if self.ast.kind(e) == NodeKind::NamePart => {
                self.ast.node_mut(e).kind = kind;
                Ok(e)
            }
            Some(e) => Err(CompileError::redeclaration(
                format!(
                    "conflicting redeclaration of '{}': already declared as {}",
                    path,
                    self.ast.kind(e)
                ),
                path.span,
            )
            .with_note(format!("cannot redeclare it as {}", kind))),
            None => Ok(self.ast.add(cur, kind, name, path.span)),
        }
    }

    /// Declare a container (graph node or class) and open it.
    pub fn push_declaration(&mut self, kind: NodeKind, path: &PathIdentifier) -> PResult<NodeId> {
        let owner = self.compounding_owner();
        let node = self.declare(owner, path, kind)?;
        self.scopes.push(&self.ast, node);
        Ok(node)
    }

    pub fn pop_declaration(&mut self) -> PResult<NodeId> {
        self.pop_frame("declaration")
    }

    /// Declare a function returning `ret` and open it for parameters.
    pub fn push_function(&mut self, ret: NodeId, path: &PathIdentifier, meta: bool) -> PResult<NodeId> {
        let kind = if meta {
            NodeKind::Meta(MetaKind::Function)
        } else {
            NodeKind::Decl(DeclKind::Function)
        };
        let owner = self.compounding_owner();
        let f = self.declare(owner, path, kind)?;
        if self.ast.node(f).ty.is_some_and(|prior| prior != ret) {
            return Err(CompileError::redeclaration(
                format!("function '{}' redeclared with a different return type", path),
                path.span,
            ));
        }
        self.ast.node_mut(f).ty = Some(ret);
        self.scopes.push(&self.ast, f);
        Ok(f)
    }

    pub fn pop_function(&mut self) -> PResult<NodeId> {
        self.pop_frame("function")
    }

    /// Add (or reopen, for a prototype followed by its definition) a parameter of the open function.
    pub fn parameter(&mut self, ty: NodeId, name: &str, span: Span) -> PResult<NodeId> {
        let f = self.scopes.top();
        if !self.ast.is(f, Category::Function) {
            return Err(CompileError::internal("parameter outside of a function", span));
        }
        let kind = if self.ast.is(ty, Category::MetaTypeDecl) {
            NodeKind::Meta(MetaKind::Parameter)
        } else {
            NodeKind::Decl(DeclKind::Parameter)
        };
        let p = self.ast.get_add(f, kind, name, span);
        let node = self.ast.node_mut(p);
        node.ty = Some(ty);
        node.locked = true;
        Ok(p)
    }

    /// Open the body block of the function on top of the stack.
    pub fn push_function_definition(&mut self, span: Span) -> PResult<NodeId> {
        let f = self.scopes.top();
        let defined = self
            .ast
            .first_child_of(f, NodeKind::Stmt(StmtKind::Block))
            .is_some_and(|body| !self.ast.children(body).is_empty());
        if defined {
            return Err(CompileError::redeclaration(
                format!("function '{}' is already defined", self.ast.path_of(f)),
                span,
            ));
        }
        let body = self.ast.get_add(f, NodeKind::Stmt(StmtKind::Block), "", span);
        self.scopes.push(&self.ast, body);
        Ok(body)
    }

    /// Declare a variable right before the statement being built, in the nearest block (or loop header).
    pub fn declare_variable(&mut self, ty: NodeId, path: &PathIdentifier, meta: bool) -> PResult<NodeId> {
        let kind = if meta {
            NodeKind::Meta(MetaKind::Variable)
        } else {
            NodeKind::Decl(DeclKind::Variable)
        };
        let (owner, before) = self.declaration_site();
        if path.parts.len() > 1 {
            let existing = self.ast.children(owner).len();
            let var = self.declare(owner, path, kind)?;
            self.ast.node_mut(var).ty = Some(ty);
            if let Some(stmt) = before {
                let added = self.ast.children(owner)[existing..].to_vec();
                for n in added {
                    self.ast.move_before(n, stmt);
                }
            }
            return Ok(var);
        }
        let name = path.last_name();
        // Duplicate compile-time variables are diagnosed when their slots are created.
        if !meta && self.ast.find_child_kind(owner, name, kind).is_some() {
            return Err(CompileError::redeclaration(
                format!("variable '{}' is already declared in this scope", name),
                path.span,
            ));
        }
        let var = match before {
            Some(stmt) => self.ast.insert_before(owner, stmt, kind, name, path.span),
            None => self.ast.add(owner, kind, name, path.span),
        };
        self.ast.node_mut(var).ty = Some(ty);
        Ok(var)
    }

    /// Owner for new variables and the statement they precede.
    fn declaration_site(&self) -> (NodeId, Option<NodeId>) {
        let frames: Vec<NodeId> = self.scopes.nodes().collect();
        for (i, node) in frames.iter().enumerate() {
            if self.ast.is(*node, Category::LoopHeader) || self.ast.is(*node, Category::Compounding) {
                let before = i
                    .checked_sub(1)
                    .map(|j| frames[j])
                    .filter(|s| self.ast.node(*s).owner == Some(*node));
                return (*node, before);
            }
        }
        (self.ast.root(), None)
    }

    fn compounding_owner(&self) -> NodeId {
        self.scopes
            .nearest(&self.ast, Category::Compounding)
            .unwrap_or_else(|| self.ast.root())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Add a statement to the node on top of the stack and open it.
    pub fn push_statement(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let owner = self.scopes.top();
        let stmt = self.ast.add(owner, kind, "", span);
        self.scopes.push_single(stmt);
        stmt
    }

    /// Close the statement on top of the stack, recording what it evaluates to.
    pub fn pop_statement(&mut self, rval: Option<NodeId>) -> PResult<NodeId> {
        let stmt = self.pop_frame("statement")?;
        if !self.ast.is(stmt, Category::Statement) && !self.ast.is(stmt, Category::MetaStatement) {
            return Err(CompileError::internal(
                format!("expected a statement frame, found {}", self.ast.kind(stmt)),
                self.ast.node(stmt).span,
            ));
        }
        self.ast.node_mut(stmt).rval = rval;
        Ok(stmt)
    }

    /// Open a body block under the node on top of the stack.
    pub fn push_statement_block(&mut self, span: Span) -> NodeId {
        let owner = self.scopes.top();
        let block = self.ast.add(owner, NodeKind::Stmt(StmtKind::Block), "", span);
        self.scopes.push_single(block);
        block
    }

    pub fn pop_block(&mut self) -> PResult<NodeId> {
        self.pop_frame("block")
    }

    /// Block holding the still-open `if` at the end of an `else if` chain that closes `owner`'s children.
    /// Chained `else` clauses live in the block of the `else if` before them.
    ///
    /// The `if` of an `else if` shares the span of its `else`; an `if` written on its own line inside an
    /// `else:` body does not, so a later `else` never attaches to it.
    pub fn else_if_tail(&self, owner: NodeId) -> Option<NodeId> {
        let mut cur = *self.ast.children(owner).last()?;
        loop {
            if self.ast.kind(cur) != NodeKind::Stmt(StmtKind::Else) {
                return None;
            }
            let block = self.ast.first_child_of(cur, NodeKind::Stmt(StmtKind::Block))?;
            let head = *self.ast.children(block).first()?;
            let nested_if = self.ast.kind(head) == NodeKind::Stmt(StmtKind::If);
            if !nested_if || self.ast.node(head).span != self.ast.node(cur).span {
                return None;
            }
            match self.ast.node(head).ctx_next {
                None => return Some(block),
                Some(next) => cur = next,
            }
        }
    }

    /// Link `else_stmt` to the `if` statement right before it.
    pub fn link_else(&mut self, else_stmt: NodeId) -> PResult<()> {
        let (if_kind, label) = match self.ast.kind(else_stmt) {
            NodeKind::Meta(MetaKind::Else) => (NodeKind::Meta(MetaKind::If), "'$else' without a preceding '$if'"),
            _ => (NodeKind::Stmt(StmtKind::If), "'else' without a preceding 'if'"),
        };
        let span = self.ast.node(else_stmt).span;
        let owner = self
            .ast
            .node(else_stmt)
            .owner
            .ok_or_else(|| CompileError::internal("statement without owner", span))?;
        let siblings = self.ast.children(owner);
        let prior = siblings
            .iter()
            .position(|c| *c == else_stmt)
            .and_then(|pos| pos.checked_sub(1))
            .map(|pos| siblings[pos]);
        match prior {
            Some(p) if self.ast.kind(p) == if_kind && self.ast.node(p).ctx_next.is_none() => {
                self.ast.node_mut(p).ctx_next = Some(else_stmt);
                Ok(())
            }
            _ => Err(CompileError::syntax(label, span)),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Operand referring to an already-resolved declaration.
    pub fn push_rval(&mut self, decl: NodeId, span: Span) -> NodeId {
        let n = self.operand(NodeKind::Rval, "", span);
        self.ast.node_mut(n).rval = Some(decl);
        n
    }

    /// Operand naming a function; re-resolved in each pass.
    pub fn push_rval_resolve(&mut self, path: &PathIdentifier, decl: NodeId) -> NodeId {
        let n = self.operand(NodeKind::Resolve, path.to_string(), path.span);
        self.ast.node_mut(n).rval = Some(decl);
        n
    }

    /// Placeholder operand for a path that failed to resolve.
    pub fn push_rval_unresolved(&mut self, path: &PathIdentifier) -> NodeId {
        self.operand(NodeKind::Unresolved, path.to_string(), path.span)
    }

    pub fn push_rval_constant(&mut self, value: Value, span: Span) -> PResult<NodeId> {
        let kind = value
            .lit_kind()
            .ok_or_else(|| CompileError::internal("constant without a value", span))?;
        let n = self.operand(NodeKind::Literal(kind), "", span);
        self.ast.node_mut(n).value = value;
        Ok(n)
    }

    /// Operand for a path with `$` segments, completed by the meta evaluator.
    pub fn push_meta_resolve(&mut self, path: &PathIdentifier) -> NodeId {
        self.operand(NodeKind::Meta(MetaKind::Resolve), path.to_string(), path.span)
    }

    /// Open an argument list operand; arguments are added with [`SemanticParser::argument`].
    pub fn push_rval_argument_list(&mut self, span: Span) -> NodeId {
        self.operand(NodeKind::ArgumentList, "", span)
    }

    /// Wrap the operand on top of the stack into an argument of the list below it.
    pub fn argument(&mut self) -> PResult<NodeId> {
        let value = self.pop_operand()?;
        let list = self.scopes.top();
        let span = self.ast.node(value).span;
        if self.ast.kind(list) != NodeKind::ArgumentList {
            return Err(CompileError::internal(
                format!("argument outside of an argument list (top is {})", self.ast.kind(list)),
                span,
            ));
        }
        let arg = self.ast.add(list, NodeKind::Argument, "", span);
        self.ast.reparent(value, arg);
        self.ast.node_mut(arg).rval = Some(value);
        Ok(arg)
    }

    /// Build operator `op` from the N topmost operand frames.
    pub fn expr_n(&mut self, op: OpKind, span: Span) -> PResult<NodeId> {
        let arity = op.arity();
        if self.scopes.depth() <= arity {
            return Err(CompileError::internal(
                format!("operator '{}' needs {} operands", op.info().name, arity),
                span,
            ));
        }
        let operands = self.scopes.top_nodes(arity);
        let owner = self
            .scopes
            .nth_from_top(arity)
            .ok_or_else(|| CompileError::internal("operator without owner", span))?;
        let start = operands
            .first()
            .map(|o| self.ast.node(*o).span)
            .unwrap_or(span);
        let n = self.ast.add(owner, NodeKind::Op(op), "", start.merge(span));
        for (i, operand) in operands.iter().enumerate() {
            self.ast.reparent(*operand, n);
            self.ast.node_mut(n).arg[i] = Some(*operand);
        }
        self.scopes.replace_top(arity, n);
        Ok(n)
    }

    pub fn pop_operand(&mut self) -> PResult<NodeId> {
        let top = self.scopes.top();
        if !self.ast.is(top, Category::ExprValue) {
            return Err(CompileError::internal(
                format!("expected an operand frame, found {}", self.ast.kind(top)),
                self.ast.node(top).span,
            ));
        }
        self.pop_frame("operand")
    }

    /// Open the constructor of `var` on the statement on top of the stack.
    pub fn push_constructor(&mut self, ty: NodeId, var: NodeId, meta: bool, span: Span) -> NodeId {
        let kind = if meta { NodeKind::Meta(MetaKind::Ctor) } else { NodeKind::Ctor };
        let owner = self.scopes.top();
        let ctor = self.ast.add(owner, kind, "", span);
        let node = self.ast.node_mut(ctor);
        node.ty = Some(ty);
        node.rval = Some(var);
        self.ast.node_mut(var).ctx_next = Some(ctor);
        self.scopes.push_single(ctor);
        ctor
    }

    /// Close the constructor on top of the stack; `args` becomes its argument list.
    pub fn pop_constructor(&mut self, args: NodeId) -> PResult<NodeId> {
        let ctor = self.pop_frame("constructor")?;
        if !self.ast.is(ctor, Category::Constructor) {
            return Err(CompileError::internal(
                format!("expected a constructor frame, found {}", self.ast.kind(ctor)),
                self.ast.node(ctor).span,
            ));
        }
        self.ast.node_mut(ctor).arg[0] = Some(args);
        Ok(ctor)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn operand(&mut self, kind: NodeKind, id: impl Into<String>, span: Span) -> NodeId {
        let owner = self.scopes.top();
        let n = self.ast.add(owner, kind, id, span);
        self.scopes.push_single(n);
        n
    }

    fn pop_frame(&mut self, what: &str) -> PResult<NodeId> {
        self.scopes
            .pop()
            .ok_or_else(|| CompileError::internal(format!("scope stack underflow closing a {}", what), Span::default()))
    }
}
