#![forbid(unsafe_code)]
//! Eon compiler
//!
//! Eon is an indentation-based language for describing dataflow graphs, with a `$`-marked compile-time layer
//! (`$if`, `$for`, `$def`, meta variables) that is evaluated away before export. This crate holds the stages
//! after tokenizing:
//!
//! - `frontend`: scope stack, declaration lookup and the semantic parser
//! - `meta`: the compile-time evaluator that produces the residual tree
//! - `backend`: export of the residual tree as C-like source or as a tree dump
//! - `pipeline`: the [`Compiler`] driving every stage, with located diagnostics
//! - `cli`: the `eon` command line
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **True invariants**: registry lookups that can only fail on a programming error use `.expect` and document
//!   it under `## Panics`.
//!
//! ## Examples
//! ```rust
//! use eon::{Builtins, CompileOptions, Compiler, Target};
//!
//! let builtins = Builtins::init_default();
//! let mut compiler = Compiler::new(&builtins, CompileOptions::default());
//! let text = compiler
//!     .compile("$for $int i = 0; i < 2; i++:\n    LOG(i)\n", "demo.eon", Target::Cpp)
//!     .unwrap();
//! assert_eq!(text, "LOG(0);\nLOG(1);\n");
//! ```

pub mod ast;
pub mod backend;
pub mod builtins;
pub mod cli;
pub mod frontend;
pub mod meta;
pub mod pipeline;

pub use frontend::{diagnostics, lexer, structure};

pub use backend::{ExportConfig, ExportError, Target};
pub use builtins::Builtins;
pub use meta::{EvalConfig, ResolvedUnit};
pub use pipeline::{CompileOptions, Compiler, Diagnostic, PipelineError};
