//! Shareable metadata for `eon_core::lang` registries.
//!
//! The registries in this module tree share a few lightweight, `Copy`-friendly metadata types so that every
//! vocabulary table can live in a `const`.
//!
//! ## Notes
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of syntax rules still lives in the
//!   tokenizer and the parsers.

/// Language version a vocabulary item is available since, as `(major, minor)`.
///
/// ## Examples
/// ```rust
/// use eon_core::lang::registry::Since;
///
/// let since = Since(0, 1);
/// assert!(since >= Since(0, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Since(pub u16, pub u16);

/// Describe the lifecycle status of a language vocabulary item.
///
/// ## Notes
/// - `Reserved` items are recognized by the tokenizer but have no implemented semantics in every stage
///   (the exporter reports them as unsupported).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Reserved,
    Deprecated,
}

/// Represent a small example snippet for documentation.
#[derive(Debug, Clone, Copy)]
pub struct Example {
    pub code: &'static str,
    pub note: Option<&'static str>,
}
