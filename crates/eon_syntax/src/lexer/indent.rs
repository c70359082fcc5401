//! Indentation handling for the Eon tokenizer
//!
//! Implements Python-style INDENT/DEDENT tokens.

use super::Lexer;
use super::tokens::{Token, TokenKind};
use crate::diagnostics::CompileError;
use crate::span::Span;

/// Columns a tab advances the indentation by.
const TAB_WIDTH: usize = 4;

impl<'a> Lexer<'a> {
    pub(super) fn handle_indentation(&mut self) {
        let start = self.current_pos;
        let mut indent = 0;

        // Count leading spaces/tabs
        while let Some(c) = self.peek() {
            match c {
                ' ' => {
                    indent += 1;
                    self.advance();
                }
                '\t' => {
                    indent += TAB_WIDTH;
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    // Comment line - skip to end
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    return; // Stay at line start
                }
                '\n' => {
                    // Blank line - skip
                    self.advance();
                    return; // Stay at line start
                }
                '\r' => {
                    self.advance();
                }
                _ => break,
            }
        }

        // At end of file?
        if self.is_at_end() {
            self.at_line_start = false;
            return;
        }

        let current_indent = *self.indent_stack.last().unwrap_or(&0);

        if indent > current_indent {
            self.indent_stack.push(indent);
            self.tokens
                .push(Token::new(TokenKind::Indent, Span::new(start, self.current_pos)));
        } else if indent < current_indent {
            let mut count = 0;
            while let Some(&top) = self.indent_stack.last() {
                if indent >= top || self.indent_stack.len() == 1 {
                    break;
                }
                self.indent_stack.pop();
                count += 1;
            }

            // Verify we landed on a valid indent level
            let final_indent = *self.indent_stack.last().unwrap_or(&0);
            if indent != final_indent {
                self.errors.push(CompileError::structure(
                    format!("Inconsistent indentation: expected {} columns, got {}", final_indent, indent),
                    Span::new(start, self.current_pos),
                ));
            }

            if count > 0 {
                self.tokens
                    .push(Token::new(TokenKind::Dedent, Span::new(start, self.current_pos)));
                self.pending_dedents = count - 1;
            }
        }

        self.at_line_start = false;
    }
}
