//! Token cursor over the tokens of one structure-tree statement.

use eon_core::lang::keywords::KeywordId;
use eon_core::lang::operators::OperatorId;
use eon_core::lang::punctuation::{self, PunctuationId};
use eon_syntax::diagnostics::CompileError;
use eon_syntax::lexer::{Token, TokenKind};
use eon_syntax::span::Span;

pub(super) type PResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, Copy)]
pub(super) struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Span reported for errors at the end of the statement.
    end_span: Span,
}

impl<'t> Cursor<'t> {
    pub(super) fn new(tokens: &'t [Token], statement_span: Span) -> Self {
        Self {
            tokens,
            pos: 0,
            end_span: Span::new(statement_span.end, statement_span.end),
        }
    }

    // ========================================================================
    // Peeking
    // ========================================================================

    pub(super) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub(super) fn peek_at(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    pub(super) fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    pub(super) fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or(self.end_span)
    }

    /// Span covering every token of the cursor.
    pub(super) fn full_span(&self) -> Span {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => self.end_span,
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(super) fn span_from(&self, start: Span) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(last) => start.merge(last.span),
            None => start,
        }
    }

    // ========================================================================
    // Matching
    // ========================================================================

    pub(super) fn advance(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub(super) fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek_kind().is_some_and(|k| k.is_keyword(id))
    }

    pub(super) fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek_kind().is_some_and(|k| k.is_punctuation(id))
    }

    pub(super) fn check_op(&self, id: OperatorId) -> bool {
        self.peek_kind().is_some_and(|k| k.is_operator(id))
    }

    pub(super) fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect_punct(&mut self, id: PunctuationId, msg: &str) -> PResult<&'t Token> {
        if self.check_punct(id) {
            self.advance().ok_or_else(|| self.unexpected(msg))
        } else {
            Err(self.unexpected(msg))
        }
    }

    pub(super) fn expect_ident(&mut self, msg: &str) -> PResult<(String, Span)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(name),
                span,
            }) => {
                self.pos += 1;
                Ok((name.clone(), *span))
            }
            _ => Err(self.unexpected(msg)),
        }
    }

    /// Fail unless every token of the statement was consumed.
    pub(super) fn expect_end(&self) -> PResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(CompileError::syntax(
                format!("unexpected {} after the end of the statement", tok.kind),
                tok.span,
            )),
        }
    }

    /// Syntax error at the current token, `"{msg}, found {token}"`.
    pub(super) fn unexpected(&self, msg: &str) -> CompileError {
        let found = match self.peek() {
            Some(tok) => tok.kind.to_string(),
            None => "end of statement".to_string(),
        };
        CompileError::syntax(format!("{}, found {}", msg, found), self.current_span())
    }

    // ========================================================================
    // Splitting
    // ========================================================================

    /// Index (relative to the cursor) of the first keyword `id` outside brackets.
    pub(super) fn find_keyword(&self, id: KeywordId) -> Option<usize> {
        self.find_top_level(|k| k.is_keyword(id))
    }

    /// Split the remaining tokens at `;` outside brackets.
    pub(super) fn split_semicolons(&self) -> Vec<Cursor<'t>> {
        let rest = &self.tokens[self.pos.min(self.tokens.len())..];
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, tok) in rest.iter().enumerate() {
            match &tok.kind {
                TokenKind::Punctuation(p) if punctuation::is_open_delimiter(*p) => depth += 1,
                TokenKind::Punctuation(p) if punctuation::is_close_delimiter(*p) => depth = depth.saturating_sub(1),
                TokenKind::Punctuation(PunctuationId::Semicolon) if depth == 0 => {
                    parts.push(self.slice(&rest[start..i], tok.span));
                    start = i + 1;
                }
                _ => {}
            }
        }
        parts.push(self.slice(&rest[start..], self.end_span));
        parts
    }

    /// Cursor over the remaining tokens before relative index `at`; `self` moves past `at`.
    pub(super) fn take_until(&mut self, at: usize) -> Cursor<'t> {
        let begin = self.pos.min(self.tokens.len());
        let end = (begin + at).min(self.tokens.len());
        let end_span = self.tokens.get(end).map(|t| t.span).unwrap_or(self.end_span);
        self.pos = (end + 1).min(self.tokens.len());
        self.slice(&self.tokens[begin..end], end_span)
    }

    fn slice(&self, tokens: &'t [Token], end: Span) -> Cursor<'t> {
        Cursor {
            tokens,
            pos: 0,
            end_span: Span::new(end.start, end.start),
        }
    }

    fn find_top_level(&self, pred: impl Fn(&TokenKind) -> bool) -> Option<usize> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.get(self.pos..)?.iter().enumerate() {
            match &tok.kind {
                TokenKind::Punctuation(p) if punctuation::is_open_delimiter(*p) => depth += 1,
                TokenKind::Punctuation(p) if punctuation::is_close_delimiter(*p) => depth = depth.saturating_sub(1),
                k if depth == 0 && pred(k) => return Some(i),
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eon_syntax::lexer::lex;

    fn statement_tokens(src: &str) -> Vec<Token> {
        let mut tokens = lex(src).unwrap();
        tokens.retain(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof));
        tokens
    }

    #[test]
    fn test_split_semicolons_ignores_nested() {
        let tokens = statement_tokens("i = 0; f(a; b) < 3; i++");
        let cursor = Cursor::new(&tokens, Span::new(0, 24));
        let parts = cursor.split_semicolons();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].tokens.len(), 3);
        assert_eq!(parts[1].tokens.len(), 8);
        assert_eq!(parts[2].peek_kind().and_then(|k| k.ident()), Some("i"));
    }

    #[test]
    fn test_take_until_splits_around_keyword() {
        let tokens = statement_tokens("int x in r");
        let mut cursor = Cursor::new(&tokens, Span::new(0, 10));
        let at = cursor.find_keyword(KeywordId::In).unwrap();
        let head = cursor.take_until(at);
        assert_eq!(head.tokens.len(), 2);
        assert_eq!(cursor.peek_kind().and_then(|k| k.ident()), Some("r"));
    }

    #[test]
    fn test_expect_end_reports_trailing_token() {
        let tokens = statement_tokens("a b");
        let mut cursor = Cursor::new(&tokens, Span::new(0, 3));
        cursor.advance();
        let err = cursor.expect_end().unwrap_err();
        assert!(err.message.contains("identifier 'b'"));
    }
}
