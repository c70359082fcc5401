//! C-like source export.
//!
//! Walks the residual tree from its root. Compile-time-only nodes are skipped, flat blocks (expanded
//! `$if`/`$for` bodies and `$loopstmt` calls) are rendered inline, and every operator below the top of an
//! expression is parenthesized so no precedence table is needed.

use eon_core::lang::kinds::{Category, DeclKind, NodeKind, OpForm, OpKind, StmtKind};

use super::{CodeWriter, ExportConfig, ExportError};
use crate::ast::{Ast, NodeId, Value};

type XResult<T> = Result<T, ExportError>;

pub(super) struct CppExporter<'a> {
    ast: &'a Ast,
    writer: CodeWriter,
    /// Nodes whose scope is open at the current output position; names are rendered relative to them.
    open: Vec<NodeId>,
    /// A top-level function has been written (for blank-line separation).
    wrote_function: bool,
}

impl<'a> CppExporter<'a> {
    pub(super) fn new(ast: &'a Ast, config: ExportConfig) -> Self {
        Self {
            ast,
            writer: CodeWriter::new(config),
            open: Vec::new(),
            wrote_function: false,
        }
    }

    pub(super) fn export(mut self, root: NodeId) -> XResult<String> {
        self.open.push(root);
        self.members(root)?;
        self.open.pop();
        Ok(self.writer.finish())
    }

    // ========================================================================
    // Declarations and statements
    // ========================================================================

    fn members(&mut self, owner: NodeId) -> XResult<()> {
        let ast = self.ast;
        for child in ast.children(owner) {
            self.member(*child)?;
        }
        Ok(())
    }

    fn member(&mut self, n: NodeId) -> XResult<()> {
        if self.ast.is(n, Category::CompileTimeOnly) {
            return Ok(());
        }
        match self.ast.kind(n) {
            NodeKind::Decl(DeclKind::Function) => self.function(n),
            NodeKind::Decl(DeclKind::Class) | NodeKind::NamePart => self.members(n),
            NodeKind::Stmt(kind) => self.statement(n, kind),
            NodeKind::Unresolved => Err(self.malformed(n, "unresolved reference")),
            // Variables are written by their constructor statement; expression nodes through their owner.
            _ => Ok(()),
        }
    }

    fn function(&mut self, f: NodeId) -> XResult<()> {
        let ast = self.ast;
        let node = ast.node(f);
        let ret = match node.ty {
            Some(ty) => self.type_name(ty)?,
            None => "void".to_string(),
        };
        let name = self.render_path(f);
        // Parameters are named relative to their function.
        self.open.push(f);
        let params = self.parameters(f);
        self.open.pop();
        let signature = format!("{} {}({})", ret, name, params?.join(", "));

        let top_level = self.writer.current_indent() == 0;
        if top_level && self.wrote_function {
            let count = self.writer.config().blank_lines_between_functions;
            self.writer.blank_lines(count);
        }
        match body_of(self.ast, f) {
            Some(body) => {
                self.writer.writeln(&format!("{} {{", signature));
                self.open.push(f);
                let result = self.block_body(body);
                self.open.pop();
                result?;
                self.writer.writeln("}");
            }
            None => self.writer.writeln(&format!("{};", signature)),
        }
        if top_level {
            self.wrote_function = true;
        }
        Ok(())
    }

    fn parameters(&self, f: NodeId) -> XResult<Vec<String>> {
        let ast = self.ast;
        let mut params = Vec::new();
        for p in ast.children(f).iter().copied() {
            if ast.kind(p) == NodeKind::Decl(DeclKind::Parameter) {
                params.push(self.declarator(p)?);
            }
        }
        Ok(params)
    }

    fn statement(&mut self, n: NodeId, kind: StmtKind) -> XResult<()> {
        let rval = self.ast.node(n).rval;
        match kind {
            StmtKind::Block if self.ast.node(n).flat => self.inline(n),
            StmtKind::Block => {
                self.writer.writeln("{");
                self.block_body(n)?;
                self.writer.writeln("}");
                Ok(())
            }
            StmtKind::Symlink => self.symlink(n),
            StmtKind::Expr => {
                let Some(r) = rval else {
                    return Ok(());
                };
                match self.ast.kind(r) {
                    NodeKind::Stmt(StmtKind::Symlink) => self.symlink(r),
                    // A `$void` call leaves nothing to run.
                    NodeKind::Decl(DeclKind::Builtin) => Ok(()),
                    _ => {
                        let text = self.expr(r, 0)?;
                        self.writer.writeln(&format!("{};", text));
                        Ok(())
                    }
                }
            }
            StmtKind::Return => {
                let text = match rval {
                    Some(r) if self.ast.is(r, Category::WithRvalReturn) => format!("return {};", self.expr(r, 0)?),
                    _ => "return;".to_string(),
                };
                self.writer.writeln(&text);
                Ok(())
            }
            StmtKind::Ctor => {
                let text = self.ctor(n)?;
                self.writer.writeln(&format!("{};", text));
                Ok(())
            }
            StmtKind::If => self.if_statement(n),
            // Written by the `if` it is linked to.
            StmtKind::Else => Ok(()),
            StmtKind::For => self.for_statement(n),
            StmtKind::Break => {
                self.writer.writeln("break;");
                Ok(())
            }
            StmtKind::Continue => {
                self.writer.writeln("continue;");
                Ok(())
            }
            StmtKind::ForCond | StmtKind::ForPost => Err(self.malformed(n, "loop header outside of a 'for'")),
            StmtKind::While => Err(unsupported("'while' loop", self.ast, n)),
            StmtKind::DoWhile => Err(unsupported("'do ... while' loop", self.ast, n)),
            StmtKind::ForRange => Err(unsupported("range-based 'for' loop", self.ast, n)),
            StmtKind::Switch => Err(unsupported("'switch' statement", self.ast, n)),
            StmtKind::Case => Err(unsupported("'case' label", self.ast, n)),
            StmtKind::Default => Err(unsupported("'default' label", self.ast, n)),
            StmtKind::BlockExpr => Err(unsupported("block expression", self.ast, n)),
        }
    }

    /// Members of a flat block at the current indentation.
    fn inline(&mut self, block: NodeId) -> XResult<()> {
        self.open.push(block);
        let result = self.members(block);
        self.open.pop();
        result
    }

    fn symlink(&mut self, link: NodeId) -> XResult<()> {
        let block = self
            .ast
            .node(link)
            .rval
            .ok_or_else(|| self.malformed(link, "statement link without a block"))?;
        self.inline(block)
    }

    /// Members of a compound body, one level deeper.
    fn block_body(&mut self, block: NodeId) -> XResult<()> {
        self.open.push(block);
        self.writer.indent();
        let result = self.members(block);
        self.writer.dedent();
        self.open.pop();
        result
    }

    fn if_statement(&mut self, n: NodeId) -> XResult<()> {
        let cond = self
            .ast
            .node(n)
            .rval
            .ok_or_else(|| self.malformed(n, "'if' without a condition"))?;
        let cond = self.expr(cond, 0)?;
        self.writer.writeln(&format!("if ({}) {{", cond));
        self.owned_body(n)?;
        if let Some(e) = self.ast.node(n).ctx_next {
            self.writer.writeln("} else {");
            self.owned_body(e)?;
        }
        self.writer.writeln("}");
        Ok(())
    }

    fn for_statement(&mut self, n: NodeId) -> XResult<()> {
        self.open.push(n);
        let result = self.for_parts(n);
        self.open.pop();
        result
    }

    fn for_parts(&mut self, n: NodeId) -> XResult<()> {
        let mut init = String::new();
        let mut cond = String::new();
        let mut post = String::new();
        let ast = self.ast;
        for c in ast.children(n).iter().copied() {
            match ast.kind(c) {
                NodeKind::Stmt(StmtKind::Ctor) => init = self.ctor(c)?,
                NodeKind::Stmt(StmtKind::Expr) => {
                    if let Some(r) = self.ast.node(c).rval {
                        init = self.expr(r, 0)?;
                    }
                }
                NodeKind::Stmt(StmtKind::ForCond) => {
                    if let Some(r) = self.ast.node(c).rval {
                        cond = self.expr(r, 0)?;
                    }
                }
                NodeKind::Stmt(StmtKind::ForPost) => {
                    if let Some(r) = self.ast.node(c).rval {
                        post = self.expr(r, 0)?;
                    }
                }
                _ => {}
            }
        }
        self.writer
            .writeln(&format!("for ({};{};{}) {{", init, spaced(&cond), spaced(&post)));
        self.owned_body(n)?;
        self.writer.writeln("}");
        Ok(())
    }

    /// Body block of an `if`/`else`/`for`, which may be missing for an empty body.
    fn owned_body(&mut self, owner: NodeId) -> XResult<()> {
        match body_of(self.ast, owner) {
            Some(body) => self.block_body(body),
            None => Ok(()),
        }
    }

    /// `TYPE NAME`, `TYPE NAME = v` or `TYPE NAME(a, b)` without the terminator.
    fn ctor(&self, stmt: NodeId) -> XResult<String> {
        let ctor = self
            .ast
            .node(stmt)
            .rval
            .filter(|c| self.ast.kind(*c) == NodeKind::Ctor)
            .ok_or_else(|| self.malformed(stmt, "constructor statement without a constructor"))?;
        let var = self
            .ast
            .node(ctor)
            .rval
            .ok_or_else(|| self.malformed(ctor, "constructor without a variable"))?;
        let declarator = self.declarator(var)?;
        let args = match self.ast.node(ctor).arg[0] {
            Some(list) => self.arguments(list)?,
            None => Vec::new(),
        };
        Ok(match args.len() {
            0 => declarator,
            1 => format!("{} = {}", declarator, args[0]),
            _ => format!("{}({})", declarator, args.join(", ")),
        })
    }

    /// `TYPE NAME` of a variable or parameter.
    fn declarator(&self, decl: NodeId) -> XResult<String> {
        let ty = self
            .ast
            .node(decl)
            .ty
            .ok_or_else(|| self.malformed(decl, "declaration without a type"))?;
        Ok(format!("{} {}", self.type_name(ty)?, self.render_path(decl)))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&self, n: NodeId, depth: usize) -> XResult<String> {
        let node = self.ast.node(n);
        match node.kind {
            NodeKind::Literal(_) => Ok(literal(&node.value, depth)),
            NodeKind::Rval | NodeKind::Resolve => {
                let target = node.rval.ok_or_else(|| self.malformed(n, "reference without a target"))?;
                Ok(self.render_path(target))
            }
            NodeKind::Op(op) => self.operator(n, op, depth),
            NodeKind::Stmt(StmtKind::Symlink) => Err(unsupported("statement expansion used as a value", self.ast, n)),
            NodeKind::Decl(DeclKind::Builtin) => Err(unsupported("void value", self.ast, n)),
            other => Err(self.malformed(n, &format!("{} in expression position", other))),
        }
    }

    fn operator(&self, n: NodeId, op: OpKind, depth: usize) -> XResult<String> {
        let info = op.info();
        let operand = |i: usize| {
            self.ast.node(n).arg[i].ok_or_else(|| self.malformed(n, &format!("'{}' is missing an operand", info.name)))
        };
        // Operands of an assignment stay at the assignment's depth.
        let inner = if info.is_assign { depth } else { depth + 1 };
        let text = match info.form {
            OpForm::Prefix => format!("{}{}", info.symbol, self.expr(operand(0)?, inner)?),
            OpForm::Postfix => format!("{}{}", self.expr(operand(0)?, inner)?, info.symbol),
            OpForm::Infix => format!(
                "{} {} {}",
                self.expr(operand(0)?, inner)?,
                info.symbol,
                self.expr(operand(1)?, inner)?
            ),
            OpForm::Ternary => format!(
                "{} ? {} : {}",
                self.expr(operand(0)?, inner)?,
                self.expr(operand(1)?, inner)?,
                self.expr(operand(2)?, inner)?
            ),
            OpForm::Call => {
                let args = match self.ast.node(n).arg[1] {
                    Some(list) => self.arguments(list)?,
                    None => Vec::new(),
                };
                return Ok(format!("{}({})", self.expr(operand(0)?, inner)?, args.join(", ")));
            }
            OpForm::Subscript => {
                return Ok(format!(
                    "{}[{}]",
                    self.expr(operand(0)?, inner)?,
                    self.expr(operand(1)?, 0)?
                ));
            }
        };
        Ok(if depth > 0 { format!("({})", text) } else { text })
    }

    fn arguments(&self, list: NodeId) -> XResult<Vec<String>> {
        let mut out = Vec::new();
        for arg in self.ast.children(list).iter().copied() {
            if self.ast.kind(arg) != NodeKind::Argument {
                continue;
            }
            let value = self
                .ast
                .node(arg)
                .rval
                .ok_or_else(|| self.malformed(arg, "argument without a value"))?;
            out.push(self.expr(value, 0)?);
        }
        Ok(out)
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// Name of `n` relative to the open scopes: the ids from `n` up to the nearest open ancestor, joined
    /// with `_`.
    fn render_path(&self, n: NodeId) -> String {
        let mut segments = vec![self.ast.node(n).id.as_str()];
        let mut cur = self.ast.node(n).owner;
        while let Some(c) = cur {
            let node = self.ast.node(c);
            if self.open.contains(&c) || node.kind == NodeKind::TranslationUnit {
                break;
            }
            if !node.id.is_empty() {
                segments.push(node.id.as_str());
            }
            cur = node.owner;
        }
        segments.reverse();
        segments.join("_")
    }

    fn type_name(&self, ty: NodeId) -> XResult<String> {
        let sigil = match self.ast.kind(ty) {
            NodeKind::Decl(DeclKind::TypePointer) => "*",
            NodeKind::Decl(DeclKind::TypeLref) => "&",
            _ => return Ok(self.render_path(ty)),
        };
        let base = self
            .ast
            .node(ty)
            .owner
            .ok_or_else(|| self.malformed(ty, "type wrapper without a base type"))?;
        Ok(format!("{}{}", self.type_name(base)?, sigil))
    }

    fn malformed(&self, n: NodeId, message: &str) -> ExportError {
        ExportError::Malformed {
            message: message.to_string(),
            span: self.ast.node(n).span,
        }
    }
}

fn unsupported(form: &'static str, ast: &Ast, n: NodeId) -> ExportError {
    ExportError::Unsupported {
        form,
        span: ast.node(n).span,
    }
}

/// The body block of `owner`; blocks of compile-time calls made in its header are flat and skipped.
fn body_of(ast: &Ast, owner: NodeId) -> Option<NodeId> {
    ast.children(owner)
        .iter()
        .rev()
        .copied()
        .find(|c| ast.kind(*c) == NodeKind::Stmt(StmtKind::Block) && !ast.node(*c).flat)
}

fn literal(value: &Value, depth: usize) -> String {
    match value {
        Value::Str(s) => quote(s),
        Value::Int(i) if *i < 0 && depth > 0 => format!("({})", i),
        Value::Double(d) if *d < 0.0 && depth > 0 => format!("({})", value),
        _ => value.to_string(),
    }
}

/// Header part of a `for`, preceded by a space unless empty.
fn spaced(part: &str) -> String {
    if part.is_empty() {
        String::new()
    } else {
        format!(" {}", part)
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rendering() {
        assert_eq!(literal(&Value::Bool(true), 0), "true");
        assert_eq!(literal(&Value::Int(-3), 0), "-3");
        assert_eq!(literal(&Value::Int(-3), 1), "(-3)");
        assert_eq!(literal(&Value::Double(14.0), 0), "14");
        assert_eq!(literal(&Value::Double(2.5), 1), "2.5");
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
        assert_eq!(quote(""), "\"\"");
    }
}
