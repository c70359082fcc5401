//! Reference tokenizer for the Eon language
//!
//! Handles tokenization including:
//! - Keywords (world, chain, def, if, for, ...)
//! - Identifiers and literals (int, real, string, bool)
//! - Operators and punctuation (`$`, `#`, `::`-free dotted paths, ...)
//! - Indentation-based blocks (INDENT/DEDENT tokens)
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `strings` - String literal scanning
//! - `numbers` - Numeric literal scanning
//! - `indent` - INDENT/DEDENT handling

mod indent;
mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{Token, TokenKind, keyword_id};

use crate::diagnostics::CompileError;
use crate::span::Span;
use eon_core::lang::operators::OperatorId;
use eon_core::lang::punctuation::PunctuationId;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// [Start of line] → count columns → [Inside code]
//                                       ↓
//                                      see '(' → [bracket_depth++]
//                                       ↓
//                                      see '\n' → skip (inside brackets)
//                                       ↓
//                                      see ')' → [bracket_depth--]
// ============================================================================

/// Tokenizer for Eon source code.
///
/// Converts source text into a stream of tokens, handling:
/// - Keywords and identifiers
/// - Numeric, string and bool literals
/// - Operators and punctuation
/// - Python-style indentation (INDENT/DEDENT tokens)
/// - Implicit line continuation inside brackets
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    indent_stack: Vec<usize>,
    pending_dedents: usize,
    at_line_start: bool,
    /// Bracket depth for implicit line continuation (parens, brackets, braces)
    bracket_depth: usize,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new tokenizer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            indent_stack: vec![0],
            pending_dedents: 0,
            at_line_start: true,
            bracket_depth: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Returns a vector of tokens on success, or a vector of errors on failure.
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while !self.is_at_end() || self.pending_dedents > 0 {
            self.scan_token();
        }

        // Close the last statement
        if self
            .tokens
            .last()
            .is_some_and(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Dedent))
        {
            self.tokens.push(Token::new(
                TokenKind::Newline,
                Span::new(self.current_pos, self.current_pos),
            ));
        }

        // Emit remaining dedents at EOF
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.current_pos, self.current_pos),
            ));
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.current_pos, self.current_pos),
        ));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].char_indices();
        iter.next(); // skip current
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        // Handle pending dedents first
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            self.tokens.push(Token::new(
                TokenKind::Dedent,
                Span::new(self.current_pos, self.current_pos),
            ));
            return;
        }

        // Handle indentation at line start
        if self.at_line_start {
            self.handle_indentation();
            return;
        }

        // Skip whitespace (but not newlines)
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' {
                self.advance();
            } else {
                break;
            }
        }

        let start = self.current_pos;

        let Some(c) = self.advance() else {
            return;
        };

        match c {
            // Newlines
            '\n' => {
                // Implicit line continuation: skip newlines inside brackets
                if self.bracket_depth > 0 {
                    return;
                }
                self.tokens
                    .push(Token::new(TokenKind::Newline, Span::new(start, self.current_pos)));
                self.at_line_start = true;
            }

            // Skip carriage return
            '\r' => {}

            // Operators and punctuation
            '+' => self.operator(
                start,
                OperatorId::Plus,
                &[('+', OperatorId::PlusPlus), ('=', OperatorId::PlusEq)],
            ),
            '-' => self.operator(
                start,
                OperatorId::Minus,
                &[('-', OperatorId::MinusMinus), ('=', OperatorId::MinusEq)],
            ),
            '*' => self.operator(start, OperatorId::Star, &[('=', OperatorId::StarEq)]),
            '/' => self.scan_slash(start),
            '%' => self.operator(start, OperatorId::Percent, &[('=', OperatorId::PercentEq)]),
            '^' => self.operator(start, OperatorId::Caret, &[('=', OperatorId::CaretEq)]),
            '~' => self.add_op(OperatorId::Tilde, start),
            '?' => self.add_op(OperatorId::Question, start),
            '&' => self.operator(
                start,
                OperatorId::Amp,
                &[('&', OperatorId::AndAnd), ('=', OperatorId::AmpEq)],
            ),
            '|' => self.operator(
                start,
                OperatorId::Pipe,
                &[('|', OperatorId::OrOr), ('=', OperatorId::PipeEq)],
            ),
            '=' => self.operator(start, OperatorId::Eq, &[('=', OperatorId::EqEq)]),
            '!' => self.operator(start, OperatorId::Bang, &[('=', OperatorId::NotEq)]),
            '<' => self.scan_angle(start, '<', OperatorId::Lt, OperatorId::LtEq, OperatorId::Shl, OperatorId::ShlEq),
            '>' => self.scan_angle(start, '>', OperatorId::Gt, OperatorId::GtEq, OperatorId::Shr, OperatorId::ShrEq),
            ',' => self.add_punct(PunctuationId::Comma, start),
            ':' => self.add_punct(PunctuationId::Colon, start),
            ';' => self.add_punct(PunctuationId::Semicolon, start),
            '.' => self.add_punct(PunctuationId::Dot, start),
            '$' => self.add_punct(PunctuationId::Dollar, start),
            '#' => self.add_punct(PunctuationId::Hash, start),
            '(' => self.open_bracket(PunctuationId::LParen, start),
            ')' => self.close_bracket(PunctuationId::RParen, start),
            '[' => self.open_bracket(PunctuationId::LBracket, start),
            ']' => self.close_bracket(PunctuationId::RBracket, start),
            '{' => self.open_bracket(PunctuationId::LBrace, start),
            '}' => self.close_bracket(PunctuationId::RBrace, start),

            // Strings
            '"' => self.scan_string(start, '"'),
            '\'' => self.scan_string(start, '\''),

            // Numbers
            '0'..='9' => self.scan_number(start, c),

            // Identifiers and keywords
            _ if is_ident_start(c) => self.scan_identifier(start),

            _ => {
                self.errors.push(CompileError::syntax(
                    format!("Unexpected character '{}'", c),
                    Span::new(start, self.current_pos),
                ));
            }
        }
    }

    // ========================================================================
    // Operator helpers
    // ========================================================================

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, Span::new(start, self.current_pos)));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    /// Try to match compound operator, fallback to simple.
    fn operator(&mut self, start: usize, simple: OperatorId, compounds: &[(char, OperatorId)]) {
        for (c, id) in compounds {
            if self.match_char(*c) {
                self.add_op(*id, start);
                return;
            }
        }
        self.add_op(simple, start);
    }

    /// Scan `<`, `<=`, `<<`, `<<=` (and the `>` family).
    fn scan_angle(
        &mut self,
        start: usize,
        ch: char,
        simple: OperatorId,
        with_eq: OperatorId,
        shift: OperatorId,
        shift_eq: OperatorId,
    ) {
        if self.match_char(ch) {
            if self.match_char('=') {
                self.add_op(shift_eq, start);
            } else {
                self.add_op(shift, start);
            }
        } else if self.match_char('=') {
            self.add_op(with_eq, start);
        } else {
            self.add_op(simple, start);
        }
    }

    /// Scan `/`, `/=`, and the two comment forms.
    fn scan_slash(&mut self, start: usize) {
        if self.match_char('/') {
            self.skip_line_comment();
        } else if self.match_char('*') {
            self.skip_block_comment(start);
        } else if self.match_char('=') {
            self.add_op(OperatorId::SlashEq, start);
        } else {
            self.add_op(OperatorId::Slash, start);
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self, start: usize) {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some(_) => {}
                None => {
                    self.errors.push(CompileError::syntax(
                        "Unterminated block comment",
                        Span::new(start, self.current_pos),
                    ));
                    return;
                }
            }
        }
    }

    /// Emit a bracket token and track bracket depth.
    fn open_bracket(&mut self, kind: PunctuationId, start: usize) {
        self.bracket_depth += 1;
        self.add_punct(kind, start);
    }

    /// Emit a closing bracket token and decrement bracket depth.
    /// Produces an error if there's no matching opening bracket.
    fn close_bracket(&mut self, kind: PunctuationId, start: usize) {
        if self.bracket_depth == 0 {
            self.errors.push(CompileError::syntax(
                "Unmatched closing bracket",
                Span::new(start, self.current_pos),
            ));
        } else {
            self.bracket_depth -= 1;
        }
        self.add_punct(kind, start);
    }

    // ========================================================================
    // Identifier scanning
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let spelling = &self.source[start..self.current_pos];

        if let Some(id) = keyword_id(spelling) {
            self.add_token(TokenKind::Keyword(id), start);
        } else {
            self.add_token(TokenKind::Ident(spelling.to_string()), start);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convenience function to tokenize a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use eon_core::lang::keywords::KeywordId;
    use eon_core::lang::operators;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operator_registry_parity() {
        for o in operators::OPERATORS {
            let tokens = lex(&format!("a {} b", o.spelling)).unwrap_or_else(|errs| {
                panic!("lex({:?}) failed: {:?}", o.spelling, errs);
            });
            assert!(tokens[1].kind.is_operator(o.id), "{} lexed as {:?}", o.spelling, tokens[1].kind);
        }
    }

    #[test]
    fn test_meta_declaration() {
        let k = kinds("$int i = 0");
        assert_eq!(k[0], TokenKind::Punctuation(PunctuationId::Dollar));
        assert_eq!(k[1], TokenKind::Ident("int".to_string()));
        assert_eq!(k[2], TokenKind::Ident("i".to_string()));
        assert_eq!(k[3], TokenKind::Operator(OperatorId::Eq));
        assert_eq!(k[4], TokenKind::Int(0));
        assert_eq!(k[5], TokenKind::Newline);
        assert_eq!(k[6], TokenKind::Eof);
    }

    #[test]
    fn test_graph_keywords() {
        let k = kinds("world app:");
        assert!(k[0].is_keyword(KeywordId::World));
        assert_eq!(k[1], TokenKind::Ident("app".to_string()));
        assert!(k[2].is_punctuation(PunctuationId::Colon));
    }

    #[test]
    fn test_literals() {
        let k = kinds("1 2.5 \"a\\tb\" true false");
        assert_eq!(k[0], TokenKind::Int(1));
        assert_eq!(k[1], TokenKind::Float(2.5));
        assert_eq!(k[2], TokenKind::String("a\tb".to_string()));
        assert!(k[3].is_keyword(KeywordId::True));
        assert!(k[4].is_keyword(KeywordId::False));
    }

    #[test]
    fn test_pointer_and_reference_decorations() {
        let k = kinds("int# p\nint& r");
        assert!(k[1].is_punctuation(PunctuationId::Hash));
        assert!(k[5].is_operator(OperatorId::Amp));
    }

    #[test]
    fn test_comments_are_skipped() {
        let k = kinds("a // trailing\n/* block\n comment */ b");
        assert_eq!(
            k,
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Newline,
                TokenKind::Ident("b".to_string()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_indentation() {
        let source = "def void f():\n    x = 1\n    y = 2\nz = 3";
        let k = kinds(source);
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Indent).count(), 1);
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Dedent).count(), 1);
    }

    #[test]
    fn test_multiple_dedents() {
        let source = "world w:\n  system s:\n    entity e\nx";
        let k = kinds(source);
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Indent).count(), 2);
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Dedent).count(), 2);
    }

    #[test]
    fn test_dedents_closed_at_eof() {
        let k = kinds("world w:\n  system s:\n    entity e\n");
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Dedent).count(), 2);
        assert_eq!(k.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_blank_and_comment_lines_do_not_change_layout() {
        let k = kinds("a:\n\n    // note\n    b\n");
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Indent).count(), 1);
    }

    #[test]
    fn test_inconsistent_dedent() {
        let errors = lex("a:\n    b\n  c\n").unwrap_err();
        assert!(errors[0].message.contains("Inconsistent indentation"));
    }

    #[test]
    fn test_newlines_inside_brackets() {
        let k = kinds("f(\n  x,\n  y\n)");
        assert_eq!(k.iter().filter(|t| **t == TokenKind::Newline).count(), 1);
    }

    #[test]
    fn test_unmatched_closing_bracket() {
        let errors = lex(")").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unmatched closing bracket"));
    }

    #[test]
    fn test_unexpected_character_is_located() {
        let errors = lex("a @ b").unwrap_err();
        assert_eq!(errors[0].span, Span::new(2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let errors = lex("\"abc").unwrap_err();
        assert!(errors[0].message.contains("Unterminated string"));
    }

    #[test]
    fn test_out_of_range_real_literal() {
        let errors = lex("x = 1e400").unwrap_err();
        assert!(errors[0].message.contains("Invalid real literal"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("\n\n   \n"), vec![TokenKind::Eof]);
    }
}
