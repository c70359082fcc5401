//! Shared syntax frontend for the Eon language: spans, tokens, the reference tokenizer, diagnostics, and the
//! structure builder.
//!
//! This crate is dependency-light and purely syntactic. It groups tokens into an indentation-derived block
//! tree ([`structure::StructureTree`]); giving those blocks meaning is the job of the semantic parser in the
//! `eon` crate.
//!
//! ## Notes
//! - Vocabulary identity (keywords/operators/punctuation) comes from `eon_core::lang` registries.
//! - The structure builder accepts any token stream of the documented shape, not only the output of
//!   [`lexer::lex`].
//!
//! ## Examples
//! ```rust
//! use eon_syntax::{lexer, structure};
//!
//! let tokens = lexer::lex("world app:\n    system phys\n").unwrap();
//! let tree = structure::build(&tokens).unwrap();
//! assert_eq!(tree.statements.len(), 1);
//! assert_eq!(tree.statements[0].children.len(), 1);
//! ```

pub mod diagnostics;
pub mod lexer;
pub mod span;
pub mod structure;
pub mod token_helpers;
