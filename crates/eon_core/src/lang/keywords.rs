//! Define the reserved keyword vocabulary for the Eon language.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a
//! const metadata table ([`KEYWORDS`]) that records canonical spellings, categories, and examples.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Compile-time (meta) variants are not separate keywords: the tokenizer emits `$` as punctuation and the
//!   semantic parser reads `$if`, `$for`, `$def` as `$` followed by the keyword.
//!
//! ## Examples
//! ```rust
//! use eon_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("chain"), Some(KeywordId::Chain));
//! assert!(keywords::is_graph_declaration(KeywordId::Chain));
//! assert!(!keywords::is_graph_declaration(KeywordId::If));
//! ```

use super::registry::{Example, Since, Stability};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Graph declarations
    World,
    System,
    Pool,
    Entity,
    Component,
    Machine,
    Chain,
    Loop,
    Atom,
    State,

    // Definitions
    Class,
    Def,

    // Control flow / statements
    If,
    Else,
    For,
    In,
    While,
    Do,
    Switch,
    Case,
    Default,
    Return,
    Break,
    Continue,

    // Literals
    True,
    False,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// Dataflow/entity graph declarations (`world`, `chain`, ...).
    Graph,
    Definition,
    ControlFlow,
    Literal,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    /// `true` when the keyword may follow `$` to form a compile-time construct.
    pub has_meta_form: bool,
    pub since: Since,
    pub stability: Stability,
    pub examples: &'static [Example],
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Graph declarations
    graph(KeywordId::World, "world"),
    graph(KeywordId::System, "system"),
    graph(KeywordId::Pool, "pool"),
    graph(KeywordId::Entity, "entity"),
    graph(KeywordId::Component, "component"),
    graph(KeywordId::Machine, "machine"),
    graph(KeywordId::Chain, "chain"),
    graph(KeywordId::Loop, "loop"),
    graph(KeywordId::Atom, "atom"),
    graph(KeywordId::State, "state"),
    // Definitions
    info(KeywordId::Class, "class", KeywordCategory::Definition, false),
    KeywordInfo {
        examples: &[Example {
            code: "$def $expr twice($int v): return v * 2",
            note: Some("Compile-time function inlined at every call site."),
        }],
        ..info(KeywordId::Def, "def", KeywordCategory::Definition, true)
    },
    // Control flow
    info(KeywordId::If, "if", KeywordCategory::ControlFlow, true),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow, true),
    KeywordInfo {
        examples: &[Example {
            code: "$for $int i = 0; i < 3; i++: LOG(i)",
            note: Some("Unrolled at compile time into three statements."),
        }],
        ..info(KeywordId::For, "for", KeywordCategory::ControlFlow, true)
    },
    info(KeywordId::In, "in", KeywordCategory::ControlFlow, false),
    info(KeywordId::While, "while", KeywordCategory::ControlFlow, false),
    reserved(KeywordId::Do, "do"),
    info(KeywordId::Switch, "switch", KeywordCategory::ControlFlow, false),
    info(KeywordId::Case, "case", KeywordCategory::ControlFlow, false),
    info(KeywordId::Default, "default", KeywordCategory::ControlFlow, false),
    info(KeywordId::Return, "return", KeywordCategory::ControlFlow, false),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow, false),
    info(KeywordId::Continue, "continue", KeywordCategory::ControlFlow, false),
    // Literals
    info(KeywordId::True, "true", KeywordCategory::Literal, false),
    info(KeywordId::False, "false", KeywordCategory::Literal, false),
];

/// Canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Return `true` for the graph-declaration family (`world` ... `state`).
pub fn is_graph_declaration(id: KeywordId) -> bool {
    category(id) == KeywordCategory::Graph
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling matches this registry.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory, has_meta_form: bool) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        has_meta_form,
        since: Since(0, 1),
        stability: Stability::Stable,
        examples: &[],
    }
}

const fn graph(id: KeywordId, canonical: &'static str) -> KeywordInfo {
    info(id, canonical, KeywordCategory::Graph, false)
}

const fn reserved(id: KeywordId, canonical: &'static str) -> KeywordInfo {
    KeywordInfo {
        stability: Stability::Reserved,
        ..info(id, canonical, KeywordCategory::ControlFlow, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_round_trips_through_its_spelling() {
        for k in KEYWORDS {
            assert_eq!(from_str(k.canonical), Some(k.id), "{}", k.canonical);
            assert_eq!(as_str(k.id), k.canonical);
        }
    }

    #[test]
    fn test_spellings_are_unique() {
        for (i, a) in KEYWORDS.iter().enumerate() {
            for b in &KEYWORDS[i + 1..] {
                assert_ne!(a.canonical, b.canonical);
            }
        }
    }

    #[test]
    fn test_graph_family() {
        let graph: Vec<_> = KEYWORDS
            .iter()
            .filter(|k| is_graph_declaration(k.id))
            .map(|k| k.canonical)
            .collect();
        assert_eq!(
            graph,
            ["world", "system", "pool", "entity", "component", "machine", "chain", "loop", "atom", "state"]
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(from_str("World"), None);
        assert_eq!(from_str("LOG"), None);
    }
}
