//! Statement and declaration grammar, one structure-tree statement at a time.

use eon_core::lang::keywords::{self, KeywordId};
use eon_core::lang::kinds::{Category, DeclKind, MetaKind, NodeKind, StmtKind};
use eon_core::lang::operators::OperatorId;
use eon_core::lang::punctuation::PunctuationId;
use eon_syntax::diagnostics::CompileError;
use eon_syntax::lexer::{Token, TokenKind};
use eon_syntax::structure::BlockNode;

use super::SemanticParser;
use super::cursor::{Cursor, PResult};
use crate::ast::NodeId;
use crate::frontend::lookup::{self, Decoration};

impl SemanticParser {
    /// Parse sibling statements, recovering after each failed one.
    pub(super) fn statements(&mut self, tokens: &[Token], nodes: &[BlockNode]) -> PResult<()> {
        for node in nodes {
            let depth = self.scopes.depth();
            if let Err(err) = self.statement(tokens, node) {
                if err.is_internal() {
                    return Err(err);
                }
                self.report(err);
                self.scopes.truncate(depth);
            }
        }
        Ok(())
    }

    fn statement(&mut self, tokens: &[Token], node: &BlockNode) -> PResult<()> {
        let mut cur = Cursor::new(node.tokens(tokens), node.span);
        let meta = cur.check_punct(PunctuationId::Dollar)
            && cur.peek_at(1).is_some_and(|t| matches!(t.kind, TokenKind::Keyword(_)));
        if meta {
            cur.advance();
        }
        let Some(keyword) = cur.peek_kind().and_then(|k| k.keyword_id()) else {
            self.no_body(node, "this statement")?;
            return self.simple_statement(cur);
        };
        if keywords::is_graph_declaration(keyword) || keyword == KeywordId::Class {
            return self.graph_declaration(tokens, node, cur, keyword, meta);
        }
        match keyword {
            KeywordId::Def => self.function(tokens, node, cur, meta),
            KeywordId::If => {
                let kind = if meta { NodeKind::Meta(MetaKind::If) } else { NodeKind::Stmt(StmtKind::If) };
                cur.advance();
                self.conditional(tokens, node, cur, kind)
            }
            KeywordId::Else => self.else_statement(tokens, node, cur, meta),
            KeywordId::For => self.for_statement(tokens, node, cur, meta),
            _ if meta => Err(CompileError::syntax(
                format!("'{}' has no compile-time form", keywords::as_str(keyword)),
                node.span,
            )),
            KeywordId::While => {
                cur.advance();
                self.conditional(tokens, node, cur, NodeKind::Stmt(StmtKind::While))
            }
            KeywordId::Do => {
                cur.advance();
                if !cur.match_keyword(KeywordId::While) {
                    return Err(cur.unexpected("expected 'while' after 'do'"));
                }
                self.conditional(tokens, node, cur, NodeKind::Stmt(StmtKind::DoWhile))
            }
            KeywordId::Switch => {
                cur.advance();
                self.conditional(tokens, node, cur, NodeKind::Stmt(StmtKind::Switch))
            }
            KeywordId::Case => {
                cur.advance();
                self.conditional(tokens, node, cur, NodeKind::Stmt(StmtKind::Case))
            }
            KeywordId::Default => {
                cur.advance();
                cur.expect_end()?;
                self.push_statement(NodeKind::Stmt(StmtKind::Default), node.span);
                self.body(tokens, node)?;
                self.pop_statement(None)?;
                Ok(())
            }
            KeywordId::Return => {
                cur.advance();
                self.no_body(node, "return")?;
                self.push_statement(NodeKind::Stmt(StmtKind::Return), node.span);
                let rval = if cur.is_at_end() { None } else { Some(self.expression(&mut cur)?) };
                if let Some(rval) = rval {
                    self.pop_operand()?;
                    cur.expect_end()?;
                    self.pop_statement(Some(rval))?;
                } else {
                    self.pop_statement(None)?;
                }
                Ok(())
            }
            KeywordId::Break | KeywordId::Continue => {
                cur.advance();
                cur.expect_end()?;
                self.no_body(node, keywords::as_str(keyword))?;
                let kind = if keyword == KeywordId::Break { StmtKind::Break } else { StmtKind::Continue };
                self.push_statement(NodeKind::Stmt(kind), node.span);
                self.pop_statement(None)?;
                Ok(())
            }
            _ => {
                self.no_body(node, "this statement")?;
                self.simple_statement(cur)
            }
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `world|system|...|class NAME[:]` with an optional body of nested declarations.
    fn graph_declaration(
        &mut self,
        tokens: &[Token],
        node: &BlockNode,
        mut cur: Cursor<'_>,
        keyword: KeywordId,
        meta: bool,
    ) -> PResult<()> {
        if meta {
            return Err(CompileError::syntax(
                format!("'{}' has no compile-time form", keywords::as_str(keyword)),
                node.span,
            ));
        }
        cur.advance();
        let path = self.path(&mut cur)?;
        cur.expect_end()?;
        let kind = NodeKind::Decl(graph_kind(keyword));
        self.push_declaration(kind, &path)?;
        self.statements(tokens, &node.children)?;
        self.pop_declaration()?;
        Ok(())
    }

    /// `[$]def TYPE NAME(TYPE a, ...)[:]`; without a body it declares a prototype.
    fn function(&mut self, tokens: &[Token], node: &BlockNode, mut cur: Cursor<'_>, meta: bool) -> PResult<()> {
        cur.advance();
        let ret = self.type_path(&mut cur)?;
        if meta != self.ast.is(ret, Category::MetaTypeDecl) {
            let msg = if meta {
                "compile-time functions must return a compile-time type"
            } else {
                "runtime functions cannot return a compile-time type"
            };
            return Err(CompileError::syntax(msg, node.span)
                .with_hint("compile-time functions are written '$def $expr name(...)'"));
        }
        let path = self.path(&mut cur)?;
        cur.expect_punct(PunctuationId::LParen, "expected '(' after function name")?;
        self.push_function(ret, &path, meta)?;
        if !cur.check_punct(PunctuationId::RParen) {
            loop {
                let ty = self.type_path(&mut cur)?;
                let (name, span) = cur.expect_ident("expected a parameter name")?;
                self.parameter(ty, &name, span)?;
                if !cur.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
        }
        cur.expect_punct(PunctuationId::RParen, "expected ')' after parameters")?;
        cur.expect_end()?;
        if node.opens_block {
            self.push_function_definition(node.span)?;
            self.statements(tokens, &node.children)?;
            self.pop_block()?;
        } else if meta {
            return Err(CompileError::syntax("compile-time functions need a body", node.span));
        }
        self.pop_function()?;
        Ok(())
    }

    /// `TYPE NAME [= expr | (args)]` or an expression statement; also used for `for` initializers.
    fn simple_statement(&mut self, mut cur: Cursor<'_>) -> PResult<()> {
        let span = cur.full_span();
        if self.starts_declaration(&cur) {
            return self.variable_declaration(cur);
        }
        self.push_statement(NodeKind::Stmt(StmtKind::Expr), span);
        let rval = self.expression(&mut cur)?;
        self.pop_operand()?;
        cur.expect_end()?;
        self.pop_statement(Some(rval))?;
        Ok(())
    }

    /// `TYPE` followed by a name, where `TYPE` resolves to a type.
    fn starts_declaration(&mut self, cur: &Cursor<'_>) -> bool {
        let mut ahead = *cur;
        while ahead.check_punct(PunctuationId::Hash) || ahead.check_op(OperatorId::Amp) {
            ahead.advance();
        }
        let Ok(path) = self.path(&mut ahead) else {
            return false;
        };
        while ahead.check_punct(PunctuationId::Hash) || ahead.check_op(OperatorId::Amp) {
            ahead.advance();
        }
        matches!(ahead.peek_kind(), Some(TokenKind::Ident(_)))
            && lookup::find_declaration(&self.ast, &self.scopes, &path, Some(Category::TypeDecl)).is_some()
    }

    fn variable_declaration(&mut self, mut cur: Cursor<'_>) -> PResult<()> {
        let start = cur.current_span();
        let ty = self.type_path(&mut cur)?;
        let meta = self.ast.is(ty, Category::MetaTypeDecl);
        let name = self.path(&mut cur)?;
        let stmt_span = cur.span_from(start);
        self.push_statement(NodeKind::Stmt(StmtKind::Ctor), stmt_span);
        let var = self.declare_variable(ty, &name, meta)?;
        let ctor = self.push_constructor(ty, var, meta, stmt_span);
        let args_start = cur.current_span();
        if cur.match_op(OperatorId::Eq) {
            let list = self.push_rval_argument_list(args_start);
            self.expression(&mut cur)?;
            self.argument()?;
            self.pop_operand()?;
            self.pop_constructor(list)?;
        } else if cur.match_punct(PunctuationId::LParen) {
            let list = self.call_arguments(&mut cur, args_start)?;
            self.pop_operand()?;
            self.pop_constructor(list)?;
        } else {
            let list = self.push_rval_argument_list(args_start);
            self.pop_operand()?;
            self.pop_constructor(list)?;
        }
        cur.expect_end()?;
        self.pop_statement(Some(ctor))?;
        Ok(())
    }

    /// `[#|&]* PATH [#|&]*`, resolved to a type declaration.
    fn type_path(&mut self, cur: &mut Cursor<'_>) -> PResult<NodeId> {
        let mut head = Vec::new();
        while let Some(d) = decoration(cur) {
            head.push(d);
        }
        let mut path = self.path(cur)?;
        let mut tail = Vec::new();
        while let Some(d) = decoration(cur) {
            tail.push(d);
        }
        let Some(base) = lookup::find_declaration(&self.ast, &self.scopes, &path, Some(Category::TypeDecl)) else {
            return Err(CompileError::resolution(
                format!("declaration not found: '{}'", path),
                path.span,
            ));
        };
        path.head = head;
        path.tail = tail;
        if path.is_decorated() && self.ast.is(base, Category::MetaTypeDecl) {
            return Err(CompileError::syntax(
                format!("compile-time type '{}' cannot be decorated", path),
                path.span,
            ));
        }
        Ok(lookup::decorate(&mut self.ast, base, path.decorations()))
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// `KEYWORD expr:` followed by a body; the expression becomes the statement's value.
    fn conditional(&mut self, tokens: &[Token], node: &BlockNode, mut cur: Cursor<'_>, kind: NodeKind) -> PResult<()> {
        self.push_statement(kind, node.span);
        let cond = self.expression(&mut cur)?;
        self.pop_operand()?;
        cur.expect_end()?;
        self.body(tokens, node)?;
        self.pop_statement(Some(cond))?;
        Ok(())
    }

    /// `else:` / `$else:`, or `else if cond:` which nests an `if` in the else body.
    ///
    /// An `else` following an `else if` chain continues the innermost `if` of that chain.
    fn else_statement(&mut self, tokens: &[Token], node: &BlockNode, mut cur: Cursor<'_>, meta: bool) -> PResult<()> {
        cur.advance();
        let chained = if meta { None } else { self.else_if_tail(self.scopes.top()) };
        if let Some(block) = chained {
            self.scopes.push(&self.ast, block);
        }
        self.else_clause(tokens, node, cur, meta)?;
        if chained.is_some() {
            self.scopes.pop();
        }
        Ok(())
    }

    fn else_clause(&mut self, tokens: &[Token], node: &BlockNode, mut cur: Cursor<'_>, meta: bool) -> PResult<()> {
        let kind = if meta { NodeKind::Meta(MetaKind::Else) } else { NodeKind::Stmt(StmtKind::Else) };
        let stmt = self.push_statement(kind, node.span);
        self.link_else(stmt)?;
        if !meta && cur.match_keyword(KeywordId::If) {
            self.push_statement_block(node.span);
            self.conditional(tokens, node, cur, NodeKind::Stmt(StmtKind::If))?;
            self.pop_block()?;
        } else {
            cur.expect_end()?;
            self.body(tokens, node)?;
        }
        self.pop_statement(None)?;
        Ok(())
    }

    /// `for INIT; COND; POST:` or `for TYPE NAME in EXPR:` (and their `$for` forms).
    fn for_statement(&mut self, tokens: &[Token], node: &BlockNode, mut cur: Cursor<'_>, meta: bool) -> PResult<()> {
        cur.advance();
        if let Some(at) = cur.find_keyword(KeywordId::In) {
            let kind = if meta { NodeKind::Meta(MetaKind::ForRange) } else { NodeKind::Stmt(StmtKind::ForRange) };
            let mut head = cur.take_until(at);
            self.push_statement(kind, node.span);
            let ty = self.type_path(&mut head)?;
            let name = self.path(&mut head)?;
            head.expect_end()?;
            self.declare_variable(ty, &name, meta && self.ast.is(ty, Category::MetaTypeDecl))?;
            let range = self.expression(&mut cur)?;
            self.pop_operand()?;
            cur.expect_end()?;
            self.body(tokens, node)?;
            self.pop_statement(Some(range))?;
            return Ok(());
        }

        let parts = cur.split_semicolons();
        let [init, cond, post] = parts.as_slice() else {
            return Err(CompileError::syntax(
                "expected 'for INIT; CONDITION; STEP' or 'for TYPE NAME in RANGE'",
                node.span,
            ));
        };
        let kind = if meta { NodeKind::Meta(MetaKind::For) } else { NodeKind::Stmt(StmtKind::For) };
        self.push_statement(kind, node.span);
        if !init.is_at_end() {
            self.simple_statement(*init)?;
        }
        self.for_header_part(*cond, StmtKind::ForCond, node)?;
        self.for_header_part(*post, StmtKind::ForPost, node)?;
        self.body(tokens, node)?;
        self.pop_statement(None)?;
        Ok(())
    }

    fn for_header_part(&mut self, mut cur: Cursor<'_>, kind: StmtKind, node: &BlockNode) -> PResult<()> {
        self.push_statement(NodeKind::Stmt(kind), node.span);
        let rval = if cur.is_at_end() {
            None
        } else {
            let e = self.expression(&mut cur)?;
            self.pop_operand()?;
            cur.expect_end()?;
            Some(e)
        };
        self.pop_statement(rval)?;
        Ok(())
    }

    /// Body block of a control-flow statement.
    fn body(&mut self, tokens: &[Token], node: &BlockNode) -> PResult<()> {
        if !node.opens_block {
            return Err(CompileError::structure("expected ':' and a body", node.span));
        }
        self.push_statement_block(node.span);
        self.statements(tokens, &node.children)?;
        self.pop_block()?;
        Ok(())
    }

    fn no_body(&self, node: &BlockNode, what: &str) -> PResult<()> {
        if node.opens_block {
            return Err(CompileError::syntax(format!("{} cannot have a body", what), node.span)
                .with_hint("remove the trailing ':'"));
        }
        Ok(())
    }
}

fn decoration(cur: &mut Cursor<'_>) -> Option<Decoration> {
    if cur.match_punct(PunctuationId::Hash) {
        Some(Decoration::Pointer)
    } else if cur.match_op(OperatorId::Amp) {
        Some(Decoration::Lref)
    } else {
        None
    }
}

fn graph_kind(keyword: KeywordId) -> DeclKind {
    match keyword {
        KeywordId::World => DeclKind::World,
        KeywordId::System => DeclKind::System,
        KeywordId::Pool => DeclKind::Pool,
        KeywordId::Entity => DeclKind::Entity,
        KeywordId::Component => DeclKind::Component,
        KeywordId::Machine => DeclKind::Machine,
        KeywordId::Chain => DeclKind::Chain,
        KeywordId::Loop => DeclKind::Loop,
        KeywordId::Atom => DeclKind::Atom,
        KeywordId::State => DeclKind::State,
        _ => DeclKind::Class,
    }
}
