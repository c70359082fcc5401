//! Provide the canonical language vocabulary for the Eon compiler.
//!
//! This crate is intentionally small and dependency-free. It holds the registries that the tokenizer, the
//! structure builder, the semantic parser, the meta evaluator, and the exporter all agree on:
//! - reserved keywords (graph declarations, control flow, literals),
//! - operators (spellings, binary precedence, fixity),
//! - punctuation,
//! - AST node kinds and the category tables used instead of per-kind switches.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global mutable state, and no AST storage types.
//! - Lookups are by stable ID; spellings and metadata come from `const` tables.

pub mod lang;
