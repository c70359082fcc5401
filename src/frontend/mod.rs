//! Eon compiler frontend.
//!
//! Tokenizing and block structure come from the shared `eon_syntax` crate. This module adds:
//! - `scope`: the scope stack shared with the meta evaluator
//! - `lookup`: dotted paths and declaration lookup
//! - `semantic`: the semantic parser that builds the AST

pub use eon_syntax::{diagnostics, lexer, structure};

pub mod lookup;
pub mod scope;
pub mod semantic;
