//! Eon language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators,
//! punctuation, and the closed set of AST node kinds with their category memberships.
//!
//! Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`, `NodeKind`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST storage, no IO, no side effects.
//! - The tokenizer/parser enforce syntax; registries provide spellings and metadata for shared use.
//!
//! ## Examples
//! ```rust
//! use eon_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("world"), Some(KeywordId::World));
//! assert_eq!(keywords::as_str(KeywordId::World), "world");
//! ```

pub mod keywords;
pub mod kinds;
pub mod operators;
pub mod punctuation;
pub mod registry;
