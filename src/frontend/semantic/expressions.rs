//! Expression grammar (precedence climbing).
//!
//! Each parse function leaves exactly one operand frame on the scope stack.

use eon_core::lang::keywords::KeywordId;
use eon_core::lang::kinds::{Category, OpForm, OpKind};
use eon_core::lang::operators::{self, Associativity, OperatorId, prec};
use eon_core::lang::punctuation::PunctuationId;
use eon_syntax::diagnostics::CompileError;
use eon_syntax::lexer::TokenKind;
use eon_syntax::span::Span;

use super::SemanticParser;
use super::cursor::{Cursor, PResult};
use crate::ast::{NodeId, Value};
use crate::frontend::lookup::{self, PathIdentifier, PathPart};

impl SemanticParser {
    /// Parse a full expression and return the node of its operand frame.
    pub(super) fn expression(&mut self, cur: &mut Cursor<'_>) -> PResult<NodeId> {
        self.binary(cur, 0)?;
        Ok(self.scopes.top())
    }

    fn binary(&mut self, cur: &mut Cursor<'_>, min_prec: u8) -> PResult<()> {
        self.unary(cur)?;
        loop {
            let Some(op) = cur.peek_kind().and_then(|k| k.operator_id()) else {
                break;
            };
            if op == OperatorId::Question {
                if prec::TERNARY < min_prec {
                    break;
                }
                let start = cur.current_span();
                cur.advance();
                self.binary(cur, 0)?;
                cur.expect_punct(PunctuationId::Colon, "expected ':' in conditional expression")?;
                self.binary(cur, prec::TERNARY)?;
                self.expr_n(OpKind::Cond, cur.span_from(start))?;
                continue;
            }
            let Some((p, assoc)) = operators::binary_precedence(op) else {
                break;
            };
            if p < min_prec {
                break;
            }
            let kind = OpKind::lookup(OpForm::Infix, op)
                .ok_or_else(|| CompileError::internal("binary operator without kind", cur.current_span()))?;
            let start = cur.current_span();
            cur.advance();
            let next = match assoc {
                Associativity::Right => p,
                Associativity::Left | Associativity::None => p + 1,
            };
            self.binary(cur, next)?;
            self.expr_n(kind, cur.span_from(start))?;
        }
        Ok(())
    }

    fn unary(&mut self, cur: &mut Cursor<'_>) -> PResult<()> {
        let prefix = cur
            .peek_kind()
            .and_then(|k| k.operator_id())
            .and_then(|op| OpKind::lookup(OpForm::Prefix, op));
        if let Some(kind) = prefix {
            let start = cur.current_span();
            cur.advance();
            self.unary(cur)?;
            self.expr_n(kind, cur.span_from(start))?;
            return Ok(());
        }
        self.postfix(cur)
    }

    fn postfix(&mut self, cur: &mut Cursor<'_>) -> PResult<()> {
        self.primary(cur)?;
        loop {
            let start = cur.current_span();
            if let Some(op) = cur.peek_kind().and_then(|k| k.operator_id()) {
                let Some(kind) = OpKind::lookup(OpForm::Postfix, op) else {
                    break;
                };
                cur.advance();
                self.expr_n(kind, cur.span_from(start))?;
            } else if cur.match_punct(PunctuationId::LParen) {
                self.call_arguments(cur, start)?;
                self.expr_n(OpKind::Call, cur.span_from(start))?;
            } else if cur.match_punct(PunctuationId::LBracket) {
                self.binary(cur, 0)?;
                cur.expect_punct(PunctuationId::RBracket, "expected ']' after subscript")?;
                self.expr_n(OpKind::Subscript, cur.span_from(start))?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Argument list after a consumed `(`, left as one operand frame.
    pub(super) fn call_arguments(&mut self, cur: &mut Cursor<'_>, start: Span) -> PResult<NodeId> {
        let list = self.push_rval_argument_list(start);
        if !cur.check_punct(PunctuationId::RParen) {
            loop {
                self.binary(cur, 0)?;
                self.argument()?;
                if !cur.match_punct(PunctuationId::Comma) {
                    break;
                }
            }
        }
        cur.expect_punct(PunctuationId::RParen, "expected ')' after arguments")?;
        Ok(list)
    }

    fn primary(&mut self, cur: &mut Cursor<'_>) -> PResult<()> {
        let span = cur.current_span();
        let value = match cur.peek_kind() {
            Some(TokenKind::Int(v)) => Some(Value::Int(*v)),
            Some(TokenKind::Float(v)) => Some(Value::Double(*v)),
            Some(TokenKind::String(s)) => Some(Value::Str(s.clone())),
            Some(TokenKind::Keyword(KeywordId::True)) => Some(Value::Bool(true)),
            Some(TokenKind::Keyword(KeywordId::False)) => Some(Value::Bool(false)),
            _ => None,
        };
        if let Some(value) = value {
            cur.advance();
            self.push_rval_constant(value, span)?;
            return Ok(());
        }
        if cur.match_punct(PunctuationId::LParen) {
            self.binary(cur, 0)?;
            cur.expect_punct(PunctuationId::RParen, "expected ')' after expression")?;
            return Ok(());
        }
        if matches!(cur.peek_kind(), Some(TokenKind::Ident(_)))
            || cur.check_punct(PunctuationId::Dollar)
        {
            let path = self.path(cur)?;
            self.identifier(&path);
            return Ok(());
        }
        Err(cur.unexpected("expected an expression"))
    }

    /// Resolve an identifier path in expression position and push the matching operand.
    fn identifier(&mut self, path: &PathIdentifier) {
        if path.has_meta_segments() {
            self.push_meta_resolve(path);
            return;
        }
        match lookup::find_declaration(&self.ast, &self.scopes, path, None) {
            Some(decl) if self.ast.is(decl, Category::Function) => {
                self.push_rval_resolve(path, decl);
            }
            Some(decl) if self.ast.is(decl, Category::ValueDecl) => {
                self.push_rval(decl, path.span);
            }
            Some(decl) => {
                self.report(CompileError::resolution(
                    format!("expected a value, found {} '{}'", self.ast.kind(decl), path),
                    path.span,
                ));
                self.push_rval_unresolved(path);
            }
            None => {
                self.report(CompileError::resolution(
                    format!("declaration not found: '{}'", path),
                    path.span,
                ));
                self.push_rval_unresolved(path);
            }
        }
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// `[$]name(.[$]name)*`
    pub(super) fn path(&mut self, cur: &mut Cursor<'_>) -> PResult<PathIdentifier> {
        let start = cur.current_span();
        let mut parts = vec![Self::path_part(cur)?];
        while cur.check_punct(PunctuationId::Dot) {
            cur.advance();
            parts.push(Self::path_part(cur)?);
        }
        Ok(PathIdentifier {
            head: Vec::new(),
            parts,
            tail: Vec::new(),
            span: cur.span_from(start),
        })
    }

    fn path_part(cur: &mut Cursor<'_>) -> PResult<PathPart> {
        let start = cur.current_span();
        let meta = cur.match_punct(PunctuationId::Dollar);
        let (name, _) = cur.expect_ident("expected an identifier")?;
        Ok(PathPart {
            name,
            meta,
            span: cur.span_from(start),
        })
    }
}
