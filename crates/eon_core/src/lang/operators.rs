//! Operator vocabulary.
//!
//! This module defines the canonical set of operator *tokens* along with basic metadata such as binary
//! precedence, associativity, and the positions (prefix/infix/postfix) a token may appear in.
//!
//! The semantic meaning of an operator occurrence (e.g. `-` as negation vs. subtraction, `++` as pre- vs.
//! post-increment) is decided by the semantic parser and recorded as an [`OpKind`](crate::lang::kinds::OpKind).
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - `precedence` is a relative ordering where higher binds tighter. `0` means “not a binary operator”.
//!
//! ## Examples
//! ```rust
//! use eon_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("+"), Some(OperatorId::Plus));
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

use super::registry::Since;

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

/// Define where an operator token may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Postfix,
}

/// Stable identifier for every operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,

    // Shifts and bitwise
    Shl,
    Shr,
    Amp,
    Pipe,
    Caret,
    Tilde,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Ternary
    Question,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    ShlEq,
    ShrEq,
    AmpEq,
    PipeEq,
    CaretEq,
}

/// Metadata for an operator token.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixities: &'static [Fixity],
    pub since: Since,
}

/// Binary precedence levels, lowest binding first.
pub mod prec {
    pub const ASSIGN: u8 = 10;
    pub const TERNARY: u8 = 15;
    pub const OR: u8 = 20;
    pub const AND: u8 = 25;
    pub const BIT_OR: u8 = 30;
    pub const BIT_XOR: u8 = 32;
    pub const BIT_AND: u8 = 34;
    pub const EQUALITY: u8 = 40;
    pub const RELATIONAL: u8 = 45;
    pub const SHIFT: u8 = 50;
    pub const ADDITIVE: u8 = 55;
    pub const MULTIPLICATIVE: u8 = 60;
}

const INFIX: &[Fixity] = &[Fixity::Infix];
const PREFIX: &[Fixity] = &[Fixity::Prefix];
const PREFIX_INFIX: &[Fixity] = &[Fixity::Prefix, Fixity::Infix];
const PREFIX_POSTFIX: &[Fixity] = &[Fixity::Prefix, Fixity::Postfix];

/// Registry of all operator tokens.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Plus, "+", prec::ADDITIVE, Associativity::Left, PREFIX_INFIX),
    op(OperatorId::Minus, "-", prec::ADDITIVE, Associativity::Left, PREFIX_INFIX),
    op(OperatorId::Star, "*", prec::MULTIPLICATIVE, Associativity::Left, INFIX),
    op(OperatorId::Slash, "/", prec::MULTIPLICATIVE, Associativity::Left, INFIX),
    op(OperatorId::Percent, "%", prec::MULTIPLICATIVE, Associativity::Left, INFIX),
    op(OperatorId::PlusPlus, "++", 0, Associativity::None, PREFIX_POSTFIX),
    op(OperatorId::MinusMinus, "--", 0, Associativity::None, PREFIX_POSTFIX),
    // Shifts and bitwise
    op(OperatorId::Shl, "<<", prec::SHIFT, Associativity::Left, INFIX),
    op(OperatorId::Shr, ">>", prec::SHIFT, Associativity::Left, INFIX),
    op(OperatorId::Amp, "&", prec::BIT_AND, Associativity::Left, INFIX),
    op(OperatorId::Pipe, "|", prec::BIT_OR, Associativity::Left, INFIX),
    op(OperatorId::Caret, "^", prec::BIT_XOR, Associativity::Left, INFIX),
    op(OperatorId::Tilde, "~", 0, Associativity::None, PREFIX),
    // Comparison
    op(OperatorId::EqEq, "==", prec::EQUALITY, Associativity::Left, INFIX),
    op(OperatorId::NotEq, "!=", prec::EQUALITY, Associativity::Left, INFIX),
    op(OperatorId::Lt, "<", prec::RELATIONAL, Associativity::Left, INFIX),
    op(OperatorId::LtEq, "<=", prec::RELATIONAL, Associativity::Left, INFIX),
    op(OperatorId::Gt, ">", prec::RELATIONAL, Associativity::Left, INFIX),
    op(OperatorId::GtEq, ">=", prec::RELATIONAL, Associativity::Left, INFIX),
    // Logical
    op(OperatorId::AndAnd, "&&", prec::AND, Associativity::Left, INFIX),
    op(OperatorId::OrOr, "||", prec::OR, Associativity::Left, INFIX),
    op(OperatorId::Bang, "!", 0, Associativity::None, PREFIX),
    // Ternary
    op(OperatorId::Question, "?", prec::TERNARY, Associativity::Right, INFIX),
    // Assignment
    op(OperatorId::Eq, "=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::PlusEq, "+=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::MinusEq, "-=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::StarEq, "*=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::SlashEq, "/=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::PercentEq, "%=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::ShlEq, "<<=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::ShrEq, ">>=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::AmpEq, "&=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::PipeEq, "|=", prec::ASSIGN, Associativity::Right, INFIX),
    op(OperatorId::CaretEq, "^=", prec::ASSIGN, Associativity::Right, INFIX),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Return the spelling of an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

/// Binary precedence of an operator token, if it can appear infix.
pub fn binary_precedence(id: OperatorId) -> Option<(u8, Associativity)> {
    let info = info_for(id);
    info.fixities
        .contains(&Fixity::Infix)
        .then_some((info.precedence, info.associativity))
}

/// Return `true` if the operator token may appear in prefix position.
pub fn is_prefix(id: OperatorId) -> bool {
    info_for(id).fixities.contains(&Fixity::Prefix)
}

/// Return `true` if the operator token may appear in postfix position.
pub fn is_postfix(id: OperatorId) -> bool {
    info_for(id).fixities.contains(&Fixity::Postfix)
}

/// Resolve an operator spelling to its identifier.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.spelling == spelling).map(|o| o.id)
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spelling: &'static str,
    precedence: u8,
    associativity: Associativity,
    fixities: &'static [Fixity],
) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        associativity,
        fixities,
        since: Since(0, 1),
    }
}
