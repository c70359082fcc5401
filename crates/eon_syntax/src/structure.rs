//! Structure builder: groups a flat token stream into nested statement blocks.
//!
//! A statement accumulates tokens until `:` (which opens a block), an end-of-statement token, or end-of-file.
//! After `:` either an indented block follows, or (compact form) a second statement follows directly on the
//! same line, with further comma-separated statements becoming additional children of the same parent:
//!
//! ```text
//! if x: a = 1, b = 2        // `if x` with two children
//! world w:                  // `world w` with one child
//!     system s
//! ```
//!
//! ## Notes
//! - Purely syntactic: no token is interpreted beyond layout, brackets, `:`, `,` and the `?` of a ternary
//!   (whose matching `:` does not open a block).
//! - Errors are collected (multi-error reporting); the builder resynchronizes at the next statement.

use std::fmt::Write as _;

use crate::diagnostics::CompileError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;
use eon_core::lang::operators::OperatorId;
use eon_core::lang::punctuation::{self, PunctuationId};

/// One statement: a token range plus nested statement children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    /// Index of the first token of the statement.
    pub begin: usize,
    /// One past the last token of the statement (the `:` is excluded).
    pub end: usize,
    pub span: Span,
    /// The statement ended with `:`.
    pub opens_block: bool,
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// Tokens of the statement itself, without its children.
    pub fn tokens<'t>(&self, all: &'t [Token]) -> &'t [Token] {
        &all[self.begin..self.end]
    }
}

/// Root of the block tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureTree {
    pub statements: Vec<BlockNode>,
}

impl StructureTree {
    /// Total number of statements, nested ones included.
    pub fn statement_count(&self) -> usize {
        fn count(nodes: &[BlockNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.statements)
    }

    /// Render the tree one statement per line, for debugging and tests.
    pub fn dump(&self, tokens: &[Token]) -> String {
        fn walk(out: &mut String, tokens: &[Token], nodes: &[BlockNode], depth: usize) {
            for n in nodes {
                let text: Vec<String> = n.tokens(tokens).iter().map(token_text).collect();
                let _ = writeln!(
                    out,
                    "{}{}{}",
                    "  ".repeat(depth),
                    text.join(" "),
                    if n.opens_block { ":" } else { "" }
                );
                walk(out, tokens, &n.children, depth + 1);
            }
        }
        let mut out = String::new();
        walk(&mut out, tokens, &self.statements, 0);
        out
    }
}

fn token_text(t: &Token) -> String {
    match &t.kind {
        TokenKind::Ident(s) => s.clone(),
        TokenKind::Int(v) => v.to_string(),
        TokenKind::Float(v) => v.to_string(),
        TokenKind::String(s) => format!("{:?}", s),
        TokenKind::Keyword(id) => eon_core::lang::keywords::as_str(*id).to_string(),
        TokenKind::Operator(id) => eon_core::lang::operators::as_str(*id).to_string(),
        TokenKind::Punctuation(id) => punctuation::as_str(*id).to_string(),
        other => other.to_string(),
    }
}

/// Builder state.
pub struct StructureBuilder<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Build the block tree for the whole token stream.
    pub fn build(mut self) -> Result<StructureTree, Vec<CompileError>> {
        let statements = self.block_body(false);
        if self.errors.is_empty() {
            Ok(StructureTree { statements })
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Token access
    // ========================================================================

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> &'a TokenKind {
        static EOF: TokenKind = TokenKind::Eof;
        self.peek().map(|t| &t.kind).unwrap_or(&EOF)
    }

    fn current_span(&self) -> Span {
        match self.peek() {
            Some(t) => t.span,
            None => self.tokens.last().map(|t| t.span).unwrap_or_default(),
        }
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Statements until the matching dedent (or end of file at top level).
    fn block_body(&mut self, nested: bool) -> Vec<BlockNode> {
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Newline => self.advance(),
                TokenKind::Eof => {
                    if nested {
                        self.errors.push(CompileError::structure(
                            "expected dedent, found end of file",
                            self.current_span(),
                        ));
                    }
                    break;
                }
                TokenKind::Dedent => {
                    if nested {
                        self.advance();
                        break;
                    }
                    self.errors
                        .push(CompileError::structure("unexpected dedent", self.current_span()));
                    self.advance();
                }
                TokenKind::Indent => {
                    self.errors.push(
                        CompileError::structure("unexpected indent", self.current_span())
                            .with_hint("only a statement ending with ':' may be followed by an indented block"),
                    );
                    self.advance();
                    let _ = self.block_body(true);
                }
                _ => {
                    if let Some(stmt) = self.statement(false) {
                        statements.push(stmt);
                    }
                }
            }
        }
        statements
    }

    /// One statement and, when it ends with `:`, its children.
    fn statement(&mut self, compact: bool) -> Option<BlockNode> {
        let begin = self.pos;
        let mut depth = 0usize;
        let mut pending_ternary = 0usize;
        let mut opens_block = false;

        let end = loop {
            let kind = self.peek_kind();
            match kind {
                TokenKind::Eof => break self.pos,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent if depth == 0 => break self.pos,
                TokenKind::Newline => self.advance(),
                TokenKind::Punctuation(PunctuationId::Comma) if depth == 0 && compact => break self.pos,
                TokenKind::Punctuation(PunctuationId::Colon) if depth == 0 => {
                    if pending_ternary > 0 {
                        pending_ternary -= 1;
                        self.advance();
                    } else {
                        let end = self.pos;
                        self.advance();
                        opens_block = true;
                        break end;
                    }
                }
                TokenKind::Operator(OperatorId::Question) if depth == 0 => {
                    pending_ternary += 1;
                    self.advance();
                }
                TokenKind::Punctuation(p) if punctuation::is_open_delimiter(*p) => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::Punctuation(p) if punctuation::is_close_delimiter(*p) => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                _ => self.advance(),
            }
        };

        if begin == end {
            if opens_block {
                self.errors.push(CompileError::structure(
                    "expected a statement before ':'",
                    self.tokens[end].span,
                ));
            } else {
                // Stray token such as a lone comma; skip it so the caller can make progress.
                if !matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Eof) && !self.peek_kind().is_layout() {
                    self.errors.push(CompileError::structure(
                        format!("unexpected {}", self.peek_kind()),
                        self.current_span(),
                    ));
                    self.advance();
                }
                return None;
            }
        }

        let span = if end > begin {
            self.tokens[begin].span.merge(self.tokens[end - 1].span)
        } else {
            self.current_span()
        };
        let mut node = BlockNode {
            begin,
            end,
            span,
            opens_block,
            children: Vec::new(),
        };

        if opens_block {
            node.children = self.block_after_colon();
        }
        Some(node)
    }

    /// Children after a `:`: an indented block or compact comma-separated statements.
    fn block_after_colon(&mut self) -> Vec<BlockNode> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                if matches!(self.peek_kind(), TokenKind::Indent) {
                    self.advance();
                    self.block_body(true)
                } else {
                    self.errors.push(CompileError::structure(
                        format!("expected an indented block after ':', found {}", self.peek_kind()),
                        self.current_span(),
                    ));
                    Vec::new()
                }
            }
            TokenKind::Eof | TokenKind::Indent | TokenKind::Dedent => {
                self.errors.push(CompileError::structure(
                    format!("expected a statement or an indented block after ':', found {}", self.peek_kind()),
                    self.current_span(),
                ));
                Vec::new()
            }
            _ => {
                let mut children = Vec::new();
                loop {
                    if let Some(child) = self.statement(true) {
                        children.push(child);
                    }
                    if self.peek_kind().is_punctuation(PunctuationId::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                children
            }
        }
    }
}

/// Build the block tree for a token stream.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn build(tokens: &[Token]) -> Result<StructureTree, Vec<CompileError>> {
    StructureBuilder::new(tokens).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn dump(source: &str) -> String {
        let tokens = lex(source).unwrap();
        build(&tokens).unwrap().dump(&tokens)
    }

    fn errors(tokens: Vec<Token>) -> Vec<CompileError> {
        build(&tokens).unwrap_err()
    }

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, Span::default())
    }

    #[test]
    fn test_indented_blocks() {
        insta::assert_snapshot!(dump("world app:\n    system phys:\n        entity ball\n    pool p\nint x = 1\n"), @r"
        world app:
          system phys:
            entity ball
          pool p
        int x = 1
        ");
    }

    #[test]
    fn test_compact_form_with_commas() {
        insta::assert_snapshot!(dump("if x: a = 1, f(b, c), d\ny\n"), @r"
        if x:
          a = 1
          f ( b , c )
          d
        y
        ");
    }

    #[test]
    fn test_nested_compact_then_block() {
        insta::assert_snapshot!(dump("world w: system s:\n    entity e\n"), @r"
        world w:
          system s:
            entity e
        ");
    }

    #[test]
    fn test_for_header_stays_one_statement() {
        let tokens = lex("$for $int i = 0; i < 3; i++: LOG(i)\n").unwrap();
        let tree = build(&tokens).unwrap();
        assert_eq!(tree.statements.len(), 1);
        assert!(tree.statements[0].opens_block);
        assert_eq!(tree.statements[0].children.len(), 1);
    }

    #[test]
    fn test_ternary_colon_does_not_open_a_block() {
        let tokens = lex("x = a ? b : c\n").unwrap();
        let tree = build(&tokens).unwrap();
        assert_eq!(tree.statements.len(), 1);
        assert!(!tree.statements[0].opens_block);
    }

    #[test]
    fn test_statement_count() {
        let tokens = lex("a:\n    b: c, d\n    e\n").unwrap();
        assert_eq!(build(&tokens).unwrap().statement_count(), 5);
    }

    #[test]
    fn test_missing_indent_is_reported() {
        let errs = errors(vec![
            tok(TokenKind::Ident("a".into())),
            tok(TokenKind::Punctuation(PunctuationId::Colon)),
            tok(TokenKind::Newline),
            tok(TokenKind::Ident("b".into())),
            tok(TokenKind::Newline),
            tok(TokenKind::Eof),
        ]);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("expected an indented block"));
    }

    #[test]
    fn test_missing_dedent_is_reported() {
        let errs = errors(vec![
            tok(TokenKind::Ident("a".into())),
            tok(TokenKind::Punctuation(PunctuationId::Colon)),
            tok(TokenKind::Newline),
            tok(TokenKind::Indent),
            tok(TokenKind::Ident("b".into())),
            tok(TokenKind::Newline),
            tok(TokenKind::Eof),
        ]);
        assert!(errs[0].message.contains("expected dedent"));
    }

    #[test]
    fn test_unexpected_indent_is_reported() {
        let errs = errors(vec![
            tok(TokenKind::Ident("a".into())),
            tok(TokenKind::Newline),
            tok(TokenKind::Indent),
            tok(TokenKind::Ident("b".into())),
            tok(TokenKind::Newline),
            tok(TokenKind::Dedent),
            tok(TokenKind::Eof),
        ]);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("unexpected indent"));
    }

    #[test]
    fn test_colon_at_end_of_file() {
        let errs = build(&lex("a:").unwrap_or_else(|_| Vec::new())).err();
        // `lex` closes the statement, so the missing block shows up as a structure error.
        assert!(errs.is_some());
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let errs = errors(vec![
            tok(TokenKind::Ident("a".into())),
            tok(TokenKind::Punctuation(PunctuationId::Colon)),
            tok(TokenKind::Newline),
            tok(TokenKind::Ident("b".into())),
            tok(TokenKind::Punctuation(PunctuationId::Colon)),
            tok(TokenKind::Newline),
            tok(TokenKind::Eof),
        ]);
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn test_empty_stream() {
        let tree = build(&[tok(TokenKind::Eof)]).unwrap();
        assert!(tree.statements.is_empty());
    }
}
