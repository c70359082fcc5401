//! Expressions: residual copies, folding, compile-time slots and `$def` calls.

use eon_core::lang::kinds::{Category, DeclKind, MetaKind, NodeKind, OpKind, StmtKind};
use eon_syntax::diagnostics::CompileError;
use eon_syntax::span::Span;

use super::value::{self, ValueError};
use super::{EResult, MetaEvaluator, returns_value};
use crate::ast::{NodeId, Value};
use crate::builtins::{META_LOOPSTMT, META_VOID};
use crate::frontend::lookup::{self, PathIdentifier};

impl MetaEvaluator {
    /// Build the residual form of expression `src` under the top frame.
    pub(super) fn expr(&mut self, src: NodeId) -> EResult<NodeId> {
        let span = self.ast.node(src).span;
        if self.is_meta_effect(src) {
            let v = self.constant(src)?;
            return self.literal(v, src);
        }
        match self.ast.kind(src) {
            NodeKind::Literal(_) => {
                let owner = self.scopes.top();
                Ok(self.duplicate(src, owner))
            }
            NodeKind::Rval => {
                let target = self.link(src)?;
                if self.ast.is(target, Category::MetaValueDecl) {
                    let v = self.read_slot(target, span)?;
                    return self.literal(v, src);
                }
                self.reference(src, target)
            }
            NodeKind::Resolve => {
                let target = self.link(src)?;
                if self.ast.is(target, Category::MetaFunction) {
                    return Err(CompileError::evaluation(
                        format!("compile-time function '{}' can only be called", self.ast.node(src).id),
                        span,
                    ));
                }
                self.reference(src, target)
            }
            NodeKind::Meta(MetaKind::Resolve) => self.meta_resolve(src),
            NodeKind::ArgumentList => {
                let list = self.open_copy(src);
                let args: Vec<NodeId> = self
                    .ast
                    .children(src)
                    .iter()
                    .copied()
                    .filter(|c| self.ast.kind(*c) == NodeKind::Argument)
                    .collect();
                for arg in args {
                    let a = self.open_copy(arg);
                    let inner = self.link(arg)?;
                    let v = self.expr(inner)?;
                    self.ast.node_mut(a).rval = Some(v);
                    self.scopes.pop();
                }
                self.scopes.pop();
                Ok(list)
            }
            NodeKind::Ctor => {
                let var = self.link(src)?;
                let ctor = self.open_copy(src);
                let target = self.retarget(var).ok_or_else(|| self.no_counterpart(var))?;
                self.ast.node_mut(ctor).rval = Some(target);
                if let Some(args) = self.ast.node(src).arg[0] {
                    let list = self.expr(args)?;
                    self.ast.node_mut(ctor).arg[0] = Some(list);
                }
                self.scopes.pop();
                Ok(ctor)
            }
            NodeKind::Op(OpKind::Call) if self.is_meta_call(src) => self.meta_call(src),
            NodeKind::Op(_) => {
                let op = self.open_copy(src);
                let args: Vec<NodeId> = self.ast.node(src).args().collect();
                for (i, a) in args.into_iter().enumerate() {
                    let v = self.expr(a)?;
                    self.ast.node_mut(op).arg[i] = Some(v);
                }
                self.scopes.pop();
                self.fold(op);
                Ok(op)
            }
            other => Err(CompileError::internal(
                format!("unexpected {} in expression position", other),
                span,
            )),
        }
    }

    /// Copy `src` under the top frame and open it.
    fn open_copy(&mut self, src: NodeId) -> NodeId {
        let owner = self.scopes.top();
        let d = self.duplicate(src, owner);
        self.scopes.push_single(d);
        d
    }

    fn reference(&mut self, src: NodeId, target: NodeId) -> EResult<NodeId> {
        let owner = self.scopes.top();
        let resolved = self.retarget(target).ok_or_else(|| self.no_counterpart(target))?;
        let d = self.duplicate(src, owner);
        self.ast.node_mut(d).rval = Some(resolved);
        Ok(d)
    }

    fn link(&self, src: NodeId) -> EResult<NodeId> {
        self.ast.node(src).rval.ok_or_else(|| {
            CompileError::internal(
                format!("{} without a target", self.ast.kind(src)),
                self.ast.node(src).span,
            )
        })
    }

    fn no_counterpart(&self, target: NodeId) -> CompileError {
        CompileError::internal(
            format!("'{}' has no residual counterpart", self.ast.path_of(target)),
            self.ast.node(target).span,
        )
    }

    /// Literal node for `value` under the top frame, standing in for `src`.
    fn literal(&mut self, value: Value, src: NodeId) -> EResult<NodeId> {
        let span = self.ast.node(src).span;
        let kind = value
            .lit_kind()
            .ok_or_else(|| CompileError::evaluation("expression has no compile-time value", span))?;
        let owner = self.scopes.top();
        let n = self.ast.add(owner, NodeKind::Literal(kind), "", span);
        let node = self.ast.node_mut(n);
        node.value = value;
        node.prev = Some(src);
        Ok(n)
    }

    /// Replace an operator whose operands are all literals by its value. Operators the evaluator
    /// rejects stay as they are.
    fn fold(&mut self, op: NodeId) {
        let NodeKind::Op(kind) = self.ast.kind(op) else {
            return;
        };
        let args: Vec<NodeId> = self.ast.node(op).args().collect();
        if args.len() != kind.arity() || !args.iter().all(|a| self.ast.is(*a, Category::Literal)) {
            return;
        }
        let values: Vec<Value> = args.iter().map(|a| self.ast.node(*a).value.clone()).collect();
        let Ok(folded) = value::apply(kind, &values) else {
            return;
        };
        let Some(lit) = folded.lit_kind() else {
            return;
        };
        tracing::trace!(op = kind.info().name, value = %folded, "folded");
        self.ast.clear_children(op);
        let node = self.ast.node_mut(op);
        node.kind = NodeKind::Literal(lit);
        node.value = folded;
        node.arg = [None; 4];
    }

    // ========================================================================
    // Compile-time evaluation
    // ========================================================================

    /// Assignment, `++` or `--` whose target is a compile-time variable.
    pub(super) fn is_meta_effect(&self, src: NodeId) -> bool {
        let NodeKind::Op(kind) = self.ast.kind(src) else {
            return false;
        };
        if !kind.info().is_assign && !value::is_step(kind) {
            return false;
        }
        self.ast.node(src).arg[0]
            .filter(|a| self.ast.kind(*a) == NodeKind::Rval)
            .and_then(|a| self.ast.node(a).rval)
            .is_some_and(|t| self.ast.is(t, Category::MetaValueDecl))
    }

    /// Evaluate semantic expression `src` to a value.
    pub(super) fn constant(&mut self, src: NodeId) -> EResult<Value> {
        let span = self.ast.node(src).span;
        match self.ast.kind(src) {
            NodeKind::Literal(_) => Ok(self.ast.node(src).value.clone()),
            NodeKind::Rval => {
                let target = self.link(src)?;
                if !self.ast.is(target, Category::MetaValueDecl) {
                    return Err(CompileError::evaluation(
                        format!("'{}' is not a compile-time value", self.ast.path_of(target)),
                        span,
                    )
                    .with_hint("declare it with a compile-time type such as '$int'"));
                }
                self.read_slot(target, span)
            }
            NodeKind::Op(op) => self.constant_op(src, op),
            other => Err(CompileError::evaluation(
                format!("{} is not a compile-time constant", other),
                span,
            )),
        }
    }

    fn constant_op(&mut self, src: NodeId, op: OpKind) -> EResult<Value> {
        let span = self.ast.node(src).span;
        let args: Vec<NodeId> = self.ast.node(src).args().collect();
        let evaluation = |e: ValueError| CompileError::evaluation(e.to_string(), span);
        match op {
            _ if value::is_step(op) => {
                let slot = self.slot_operand(src, &args)?;
                let old = self.slot_value(slot, span)?;
                let delta = if matches!(op, OpKind::PreInc | OpKind::PostInc) { 1 } else { -1 };
                let new = value::step(op, &old, delta).map_err(evaluation)?;
                self.ast.node_mut(slot).value = new.clone();
                Ok(if matches!(op, OpKind::PreInc | OpKind::PreDec) { new } else { old })
            }
            OpKind::Assign => {
                let slot = self.slot_operand(src, &args)?;
                let rhs = args.get(1).copied().ok_or_else(|| self.missing_operand(src))?;
                let v = self.constant(rhs)?;
                self.ast.node_mut(slot).value = v.clone();
                Ok(v)
            }
            OpKind::And | OpKind::Or => {
                let (l, r) = match args.as_slice() {
                    [l, r] => (*l, *r),
                    _ => return Err(self.missing_operand(src)),
                };
                let left = self.constant(l)?.is_truthy();
                let short = if op == OpKind::And { !left } else { left };
                if short {
                    return Ok(Value::Bool(left));
                }
                Ok(Value::Bool(self.constant(r)?.is_truthy()))
            }
            _ => {
                if !op.info().const_eval || op.info().is_assign {
                    return Err(evaluation(ValueError::Unsupported { op: op.info().name }));
                }
                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(self.constant(a)?);
                }
                value::apply(op, &values).map_err(evaluation)
            }
        }
    }

    fn missing_operand(&self, src: NodeId) -> CompileError {
        CompileError::internal(
            format!("{} is missing an operand", self.ast.kind(src)),
            self.ast.node(src).span,
        )
    }

    /// Slot written by an assignment or step operator.
    fn slot_operand(&mut self, src: NodeId, args: &[NodeId]) -> EResult<NodeId> {
        let span = self.ast.node(src).span;
        let target = args
            .first()
            .filter(|a| self.ast.kind(**a) == NodeKind::Rval)
            .and_then(|a| self.ast.node(*a).rval)
            .filter(|t| self.ast.is(*t, Category::MetaValueDecl));
        let Some(target) = target else {
            return Err(CompileError::evaluation(
                format!("the target of '{}' must be a compile-time variable", self.ast.kind(src)),
                span,
            ));
        };
        self.find_slot(target).ok_or_else(|| self.undeclared(target, span))
    }

    // ========================================================================
    // Slots
    // ========================================================================

    /// Create the slot of compile-time variable `src` in the innermost block.
    pub(super) fn declare_slot(&mut self, src: NodeId) -> EResult<NodeId> {
        let block = self
            .scopes
            .nearest(&self.ast, Category::Compounding)
            .unwrap_or(self.root());
        let (id, span) = (self.ast.node(src).id.clone(), self.ast.node(src).span);
        let taken = self
            .ast
            .children(block)
            .iter()
            .any(|c| self.ast.kind(*c) == NodeKind::Object && self.ast.node(*c).id == id);
        if taken {
            return Err(CompileError::redeclaration(
                format!("meta-variable '{}' has already been declared", id),
                span,
            ));
        }
        let slot = self.ast.add(block, NodeKind::Object, id, span);
        self.ast.node_mut(slot).prev = Some(src);
        Ok(slot)
    }

    /// Innermost open slot of compile-time variable or parameter `decl`.
    pub(super) fn find_slot(&self, decl: NodeId) -> Option<NodeId> {
        self.scopes.nodes().find_map(|f| {
            self.ast
                .children(f)
                .iter()
                .rev()
                .copied()
                .find(|c| self.ast.kind(*c) == NodeKind::Object && self.ast.node(*c).prev == Some(decl))
        })
    }

    fn read_slot(&self, decl: NodeId, span: Span) -> EResult<Value> {
        let slot = self.find_slot(decl).ok_or_else(|| self.undeclared(decl, span))?;
        self.slot_value(slot, span)
    }

    fn slot_value(&self, slot: NodeId, span: Span) -> EResult<Value> {
        match &self.ast.node(slot).value {
            Value::None => Err(CompileError::evaluation(
                format!("meta-variable '{}' is not initialized yet", self.ast.node(slot).id),
                span,
            )),
            v => Ok(v.clone()),
        }
    }

    fn undeclared(&self, decl: NodeId, span: Span) -> CompileError {
        CompileError::evaluation(
            format!("meta-variable '{}' is not declared in this scope", self.ast.node(decl).id),
            span,
        )
    }

    /// Run the compile-time constructor `ctor`: `$T x` leaves the slot empty, `$T x = v` fills it.
    pub(super) fn meta_ctor(&mut self, ctor: NodeId) -> EResult<()> {
        let span = self.ast.node(ctor).span;
        let var = self.link(ctor)?;
        let slot = self.find_slot(var).ok_or_else(|| self.undeclared(var, span))?;
        let args: Vec<NodeId> = match self.ast.node(ctor).arg[0] {
            Some(list) => self
                .ast
                .children(list)
                .iter()
                .copied()
                .filter(|c| self.ast.kind(*c) == NodeKind::Argument)
                .collect(),
            None => Vec::new(),
        };
        match args.as_slice() {
            [] => Ok(()),
            [arg] => {
                let inner = self.link(*arg)?;
                let v = self.constant(inner)?;
                self.ast.node_mut(slot).value = v;
                Ok(())
            }
            more => Err(CompileError::unsupported(
                format!("compile-time constructor with {} arguments is not supported", more.len()),
                span,
            )),
        }
    }

    // ========================================================================
    // Compile-time paths and calls
    // ========================================================================

    /// Resolve a path like `cfg.$field`, substituting each `$` segment with the value of the
    /// compile-time variable of that name.
    fn meta_resolve(&mut self, src: NodeId) -> EResult<NodeId> {
        let (text, span) = (self.ast.node(src).id.clone(), self.ast.node(src).span);
        let mut path = PathIdentifier::parse_text(&text, span);
        for part in path.parts.iter_mut().filter(|p| p.meta) {
            let v = self.read_slot_named(&part.name, span)?;
            part.name = v.to_string();
            part.meta = false;
        }
        let Some(decl) = lookup::find_declaration(&self.ast, &self.scopes, &path, None) else {
            return Err(CompileError::resolution(
                format!("declaration not found: '{}' (from '{}')", path, text),
                span,
            ));
        };
        let kind = if self.ast.is(decl, Category::Function) {
            NodeKind::Resolve
        } else if self.ast.is(decl, Category::ValueDecl) {
            NodeKind::Rval
        } else {
            return Err(CompileError::resolution(
                format!("expected a value, found {} '{}'", self.ast.kind(decl), path),
                span,
            ));
        };
        let owner = self.scopes.top();
        let n = self.ast.add(owner, kind, path.to_string(), span);
        let node = self.ast.node_mut(n);
        node.rval = Some(decl);
        node.prev = Some(src);
        Ok(n)
    }

    fn read_slot_named(&self, name: &str, span: Span) -> EResult<Value> {
        let slot = self.scopes.nodes().find_map(|f| {
            self.ast
                .children(f)
                .iter()
                .rev()
                .copied()
                .find(|c| self.ast.kind(*c) == NodeKind::Object && self.ast.node(*c).id == name)
        });
        match slot {
            Some(slot) => self.slot_value(slot, span),
            None => Err(CompileError::resolution(
                format!("meta-variable '{}' not found", name),
                span,
            )),
        }
    }

    fn is_meta_call(&self, call: NodeId) -> bool {
        self.ast.node(call).arg[0]
            .filter(|c| self.ast.kind(*c) == NodeKind::Resolve)
            .and_then(|c| self.ast.node(c).rval)
            .is_some_and(|f| self.ast.is(f, Category::MetaFunction))
    }

    /// Expand a call of a `$def` function.
    ///
    /// Arguments are evaluated in the caller, bound to slots of a fresh flat block, and the body is
    /// visited into that block. `$expr` (and value-typed) functions yield the value of their `return`;
    /// `$loopstmt` functions yield a symlink statement to the block; `$void` functions yield `void`.
    fn meta_call(&mut self, call: NodeId) -> EResult<NodeId> {
        let span = self.ast.node(call).span;
        let callee = self.ast.node(call).arg[0].ok_or_else(|| self.missing_operand(call))?;
        let f = self.link(callee)?;
        let name = self.ast.node(f).id.clone();

        let params: Vec<NodeId> = self
            .ast
            .children(f)
            .iter()
            .copied()
            .filter(|c| self.ast.is(*c, Category::ValueDecl))
            .collect();
        if let Some(p) = params.iter().find(|p| !self.ast.is(**p, Category::MetaValueDecl)) {
            return Err(CompileError::unsupported(
                format!(
                    "runtime parameter '{}' of compile-time function '{}' is not supported",
                    self.ast.node(*p).id,
                    name
                ),
                self.ast.node(*p).span,
            ));
        }
        let actuals: Vec<NodeId> = match self.ast.node(call).arg[1] {
            Some(list) => self
                .ast
                .children(list)
                .iter()
                .copied()
                .filter(|c| self.ast.kind(*c) == NodeKind::Argument)
                .collect(),
            None => Vec::new(),
        };
        if actuals.len() != params.len() {
            return Err(CompileError::evaluation(
                format!(
                    "compile-time function '{}' expects {} arguments, found {}",
                    name,
                    params.len(),
                    actuals.len()
                ),
                span,
            ));
        }
        let mut values = Vec::with_capacity(actuals.len());
        for a in actuals {
            let inner = self.link(a)?;
            values.push(self.constant(inner)?);
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(CompileError::evaluation(
                format!(
                    "compile-time call depth exceeded {} while calling '{}'",
                    self.config.max_call_depth, name
                ),
                span,
            ));
        }

        let body = self.ast.first_child_of(f, NodeKind::Stmt(StmtKind::Block));
        let ty = self.ast.node(f).ty.and_then(|t| self.retarget(t));
        let owner = self.scopes.top();
        let block = self.ast.add(owner, NodeKind::Stmt(StmtKind::Block), "", span);
        {
            let node = self.ast.node_mut(block);
            node.flat = true;
            node.prev = body;
            node.ty = ty;
        }
        for (p, v) in params.into_iter().zip(values) {
            let (id, pspan) = (self.ast.node(p).id.clone(), self.ast.node(p).span);
            let slot = self.ast.add(block, NodeKind::Object, id, pspan);
            let node = self.ast.node_mut(slot);
            node.prev = Some(p);
            node.value = v;
        }

        tracing::trace!(function = %name, depth = self.call_depth, "compile-time call");
        let reported = self.errors.len();
        let outer = std::mem::replace(&mut self.returning, false);
        self.call_depth += 1;
        // Only the block becomes a frame; the callee is never on the stack, so it needs no lock.
        self.scopes.push_single(block);
        let visited = match body {
            Some(body) => self.visit_members(body),
            None => Ok(()),
        };
        self.scopes.pop();
        self.call_depth -= 1;
        self.returning = outer;
        visited?;
        // The body's own failure is the call's failure; it is not reported a second time.
        if self.errors.len() > reported {
            let last = self.errors.len() - 1;
            return Err(self.errors.remove(last));
        }

        let Some(ty) = ty else {
            return Err(CompileError::internal(format!("compile-time function '{}' has no type", name), span));
        };
        let ty_name = self.ast.node(ty).id.clone();
        if returns_value(&self.ast, ty) {
            return self.ast.node(block).rval.ok_or_else(|| {
                CompileError::evaluation(format!("compile-time function '{}' did not return a value", name), span)
            });
        }
        match ty_name.as_str() {
            META_LOOPSTMT => {
                let owner = self.scopes.top();
                let link = self.ast.add(owner, NodeKind::Stmt(StmtKind::Symlink), "", span);
                let node = self.ast.node_mut(link);
                node.rval = Some(block);
                node.prev = Some(call);
                Ok(link)
            }
            META_VOID => self
                .void_type()
                .ok_or_else(|| CompileError::internal("the 'void' builtin is missing", span)),
            other => Err(CompileError::unsupported(
                format!("compile-time functions returning '${}' cannot be called", other),
                span,
            )),
        }
    }

    /// Residual runtime `void` type.
    fn void_type(&self) -> Option<NodeId> {
        self.ast
            .find_child_kind(self.root(), "void", NodeKind::Decl(DeclKind::Builtin))
    }
}
