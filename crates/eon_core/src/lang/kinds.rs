//! AST node kinds and category membership tables.
//!
//! Every AST node carries a [`NodeKind`]: a small tagged sum over per-phase kind enums (declarations,
//! statements, expression operators, literals, compile-time variants). Questions of the form “does this kind
//! behave like X” are answered by [`is`] against the [`CATEGORIES`] table, never by matching on individual
//! kinds at the call site. Adding a kind therefore only means adding it to the right category rows.
//!
//! ## Notes
//! - Categories may include other categories (sub-category rows); [`is`] follows them recursively.
//! - Expression operators carry an [`OpKind`], whose metadata (symbol, arity, rendering form, compile-time
//!   support) lives in [`OPS`].
//!
//! ## Examples
//! ```rust
//! use eon_core::lang::kinds::{self, Category, DeclKind, MetaKind, NodeKind};
//!
//! assert!(kinds::is(NodeKind::Decl(DeclKind::Variable), Category::ValueDecl));
//! assert!(kinds::is(NodeKind::Meta(MetaKind::Variable), Category::ValueDecl));
//! assert!(!kinds::is(NodeKind::Decl(DeclKind::Variable), Category::MetaDecl));
//! ```

use std::fmt;

use super::operators::OperatorId;

// ============================================================================
// Kinds
// ============================================================================

/// Closed tag of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a tree (semantic or residual).
    TranslationUnit,
    /// Name segment created while declaring a dotted path; not yet given a meaning.
    NamePart,
    Decl(DeclKind),
    Stmt(StmtKind),
    Op(OpKind),
    Literal(LitKind),
    Meta(MetaKind),
    /// Reference to an already-resolved declaration (`rval` link).
    Rval,
    /// Reference to a function by path, re-resolved in each pass.
    Resolve,
    /// Placeholder for a reference that failed to resolve.
    Unresolved,
    ArgumentList,
    Argument,
    /// Runtime constructor attached to a variable declaration.
    Ctor,
    /// Compile-time value slot created for a meta variable or bound meta parameter.
    Object,
}

/// Declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Builtin,
    FunctionBuiltin,
    Variable,
    Parameter,
    Function,
    Class,
    TypePointer,
    TypeLref,
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
}

/// Statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtKind {
    /// Compound statement (`{ ... }` in the exported text).
    Block,
    Expr,
    Return,
    Ctor,
    If,
    Else,
    For,
    ForRange,
    /// Header parts of a C-style `for`.
    ForCond,
    ForPost,
    While,
    DoWhile,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    /// Statement standing in for a block produced by a compile-time call.
    Symlink,
    /// Expression in statement position that yields a block value.
    BlockExpr,
}

/// Compile-time (meta) kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// Compile-time type (`$int`, `$expr`, ...).
    Builtin,
    Variable,
    Parameter,
    /// Compile-time function (`$def`).
    Function,
    /// Compile-time constructor (`$int i = 0`).
    Ctor,
    If,
    Else,
    For,
    ForRange,
    /// Call-site marker for a resolved compile-time function.
    Rval,
    /// Path with compile-time segments (`a.$b`).
    Resolve,
}

/// Literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LitKind {
    Bool,
    Int,
    Double,
    String,
}

/// Expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Negative,
    Positive,
    Negate,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lsh,
    Rsh,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    Eq,
    Ineq,
    BwAnd,
    BwXor,
    BwOr,
    And,
    Or,
    Cond,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LshAssign,
    RshAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    Call,
    Subscript,
}

/// How an operator is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpForm {
    Prefix,
    Postfix,
    Infix,
    /// `a ? b : c`
    Ternary,
    /// `f(args)`
    Call,
    /// `a[b]`
    Subscript,
}

/// Metadata for an expression operator.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub id: OpKind,
    pub name: &'static str,
    /// Token spelling in source and in exported text (`""` for call/subscript).
    pub symbol: &'static str,
    pub token: Option<OperatorId>,
    pub arity: usize,
    pub form: OpForm,
    /// Assignment operators keep the nesting depth of their operands when exported.
    pub is_assign: bool,
    /// Supported by the compile-time evaluator.
    pub const_eval: bool,
}

/// Registry of all expression operators.
pub const OPS: &[OpInfo] = &[
    op(OpKind::PreInc, "pre-increment", "++", Some(OperatorId::PlusPlus), 1, OpForm::Prefix, true),
    op(OpKind::PreDec, "pre-decrement", "--", Some(OperatorId::MinusMinus), 1, OpForm::Prefix, true),
    op(OpKind::PostInc, "post-increment", "++", Some(OperatorId::PlusPlus), 1, OpForm::Postfix, true),
    op(OpKind::PostDec, "post-decrement", "--", Some(OperatorId::MinusMinus), 1, OpForm::Postfix, true),
    op(OpKind::Negative, "negative", "-", Some(OperatorId::Minus), 1, OpForm::Prefix, true),
    op(OpKind::Positive, "positive", "+", Some(OperatorId::Plus), 1, OpForm::Prefix, true),
    op(OpKind::Negate, "bitwise negation", "~", Some(OperatorId::Tilde), 1, OpForm::Prefix, false),
    op(OpKind::Not, "logical not", "!", Some(OperatorId::Bang), 1, OpForm::Prefix, true),
    op(OpKind::Add, "addition", "+", Some(OperatorId::Plus), 2, OpForm::Infix, true),
    op(OpKind::Sub, "subtraction", "-", Some(OperatorId::Minus), 2, OpForm::Infix, true),
    op(OpKind::Mul, "multiplication", "*", Some(OperatorId::Star), 2, OpForm::Infix, true),
    op(OpKind::Div, "division", "/", Some(OperatorId::Slash), 2, OpForm::Infix, true),
    op(OpKind::Mod, "modulus", "%", Some(OperatorId::Percent), 2, OpForm::Infix, false),
    op(OpKind::Lsh, "left shift", "<<", Some(OperatorId::Shl), 2, OpForm::Infix, true),
    op(OpKind::Rsh, "right shift", ">>", Some(OperatorId::Shr), 2, OpForm::Infix, true),
    op(OpKind::Greater, "greater", ">", Some(OperatorId::Gt), 2, OpForm::Infix, true),
    op(OpKind::Less, "less", "<", Some(OperatorId::Lt), 2, OpForm::Infix, true),
    op(OpKind::GreaterEq, "greater or equal", ">=", Some(OperatorId::GtEq), 2, OpForm::Infix, true),
    op(OpKind::LessEq, "less or equal", "<=", Some(OperatorId::LtEq), 2, OpForm::Infix, true),
    op(OpKind::Eq, "equality", "==", Some(OperatorId::EqEq), 2, OpForm::Infix, true),
    op(OpKind::Ineq, "inequality", "!=", Some(OperatorId::NotEq), 2, OpForm::Infix, true),
    op(OpKind::BwAnd, "bitwise and", "&", Some(OperatorId::Amp), 2, OpForm::Infix, false),
    op(OpKind::BwXor, "bitwise xor", "^", Some(OperatorId::Caret), 2, OpForm::Infix, false),
    op(OpKind::BwOr, "bitwise or", "|", Some(OperatorId::Pipe), 2, OpForm::Infix, false),
    op(OpKind::And, "logical and", "&&", Some(OperatorId::AndAnd), 2, OpForm::Infix, true),
    op(OpKind::Or, "logical or", "||", Some(OperatorId::OrOr), 2, OpForm::Infix, true),
    op(OpKind::Cond, "conditional", "?", Some(OperatorId::Question), 3, OpForm::Ternary, false),
    assign(OpKind::Assign, "assignment", "=", OperatorId::Eq, true),
    assign(OpKind::AddAssign, "add-assignment", "+=", OperatorId::PlusEq, false),
    assign(OpKind::SubAssign, "subtract-assignment", "-=", OperatorId::MinusEq, false),
    assign(OpKind::MulAssign, "multiply-assignment", "*=", OperatorId::StarEq, false),
    assign(OpKind::DivAssign, "divide-assignment", "/=", OperatorId::SlashEq, false),
    assign(OpKind::ModAssign, "modulus-assignment", "%=", OperatorId::PercentEq, false),
    assign(OpKind::LshAssign, "left-shift-assignment", "<<=", OperatorId::ShlEq, false),
    assign(OpKind::RshAssign, "right-shift-assignment", ">>=", OperatorId::ShrEq, false),
    assign(OpKind::AndAssign, "and-assignment", "&=", OperatorId::AmpEq, false),
    assign(OpKind::XorAssign, "xor-assignment", "^=", OperatorId::CaretEq, false),
    assign(OpKind::OrAssign, "or-assignment", "|=", OperatorId::PipeEq, false),
    op(OpKind::Call, "call", "", None, 2, OpForm::Call, false),
    op(OpKind::Subscript, "subscript", "", None, 2, OpForm::Subscript, false),
];

impl OpKind {
    /// Metadata for this operator.
    ///
    /// ## Panics
    /// - If the registry is missing an entry (this indicates a programming error).
    pub fn info(self) -> &'static OpInfo {
        OPS.iter().find(|o| o.id == self).expect("operator kind info missing")
    }

    pub fn arity(self) -> usize {
        self.info().arity
    }

    /// Find the operator written with `token` in the given `form`.
    pub fn lookup(form: OpForm, token: OperatorId) -> Option<OpKind> {
        OPS.iter()
            .find(|o| o.form == form && o.token == Some(token))
            .map(|o| o.id)
    }
}

const fn op(
    id: OpKind,
    name: &'static str,
    symbol: &'static str,
    token: Option<OperatorId>,
    arity: usize,
    form: OpForm,
    const_eval: bool,
) -> OpInfo {
    OpInfo {
        id,
        name,
        symbol,
        token,
        arity,
        form,
        is_assign: false,
        const_eval,
    }
}

const fn assign(id: OpKind, name: &'static str, symbol: &'static str, token: OperatorId, const_eval: bool) -> OpInfo {
    OpInfo {
        is_assign: true,
        ..op(id, name, symbol, Some(token), 2, OpForm::Infix, const_eval)
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Static classification of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Declaration,
    ValueDecl,
    TypeDecl,
    Function,
    /// Name segment without meaning yet.
    Undefined,
    /// Containers a dotted path may walk through.
    ClassPath,
    GraphDecl,
    /// Graph declarations duplicated per occurrence rather than merged.
    EcsDecl,
    /// Containers that hold declarations and statements.
    Compounding,
    /// Nodes whose body block takes part in lexical fall-through.
    BodyOwner,
    /// `for` statements, whose header declares the loop variable.
    LoopHeader,
    Statement,
    MetaStatement,
    MetaDecl,
    MetaValueDecl,
    MetaTypeDecl,
    MetaFunction,
    Literal,
    ExprOp,
    /// Anything usable as an expression operand.
    ExprValue,
    /// Value-producing nodes; a `return` of one of these emits the value.
    WithRvalReturn,
    /// Kinds that only carry compile-time information and are never exported.
    CompileTimeOnly,
    /// Declarations seeded into every root before parsing.
    Builtin,
    Constructor,
}

/// Broad family of a kind, as given by the outer [`NodeKind`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Decl,
    Stmt,
    Op,
    Literal,
    Meta,
}

impl Family {
    pub fn contains(self, kind: NodeKind) -> bool {
        matches!(
            (self, kind),
            (Family::Decl, NodeKind::Decl(_))
                | (Family::Stmt, NodeKind::Stmt(_))
                | (Family::Op, NodeKind::Op(_))
                | (Family::Literal, NodeKind::Literal(_))
                | (Family::Meta, NodeKind::Meta(_))
        )
    }
}

/// One row entry of a category table.
#[derive(Debug, Clone, Copy)]
pub enum Member {
    Kind(NodeKind),
    Family(Family),
    Category(Category),
}

/// Category table row.
#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub id: Category,
    pub members: &'static [Member],
}

use Member::{Category as Sub, Family as Fam, Kind as K};

const GRAPH: &[Member] = &[
    K(NodeKind::Decl(DeclKind::World)),
    K(NodeKind::Decl(DeclKind::System)),
    K(NodeKind::Decl(DeclKind::Pool)),
    K(NodeKind::Decl(DeclKind::Entity)),
    K(NodeKind::Decl(DeclKind::Component)),
    K(NodeKind::Decl(DeclKind::Machine)),
    K(NodeKind::Decl(DeclKind::Chain)),
    K(NodeKind::Decl(DeclKind::Loop)),
    K(NodeKind::Decl(DeclKind::Atom)),
    K(NodeKind::Decl(DeclKind::State)),
];

/// Registry of all categories.
pub const CATEGORIES: &[CategoryInfo] = &[
    row(Category::Declaration, &[Fam(Family::Decl), K(NodeKind::NamePart), Sub(Category::MetaDecl)]),
    row(
        Category::ValueDecl,
        &[
            K(NodeKind::Decl(DeclKind::Variable)),
            K(NodeKind::Decl(DeclKind::Parameter)),
            Sub(Category::MetaValueDecl),
        ],
    ),
    row(
        Category::TypeDecl,
        &[
            K(NodeKind::Decl(DeclKind::Builtin)),
            K(NodeKind::Decl(DeclKind::Class)),
            K(NodeKind::Decl(DeclKind::TypePointer)),
            K(NodeKind::Decl(DeclKind::TypeLref)),
            Sub(Category::MetaTypeDecl),
        ],
    ),
    row(
        Category::Function,
        &[
            K(NodeKind::Decl(DeclKind::Function)),
            K(NodeKind::Decl(DeclKind::FunctionBuiltin)),
            Sub(Category::MetaFunction),
        ],
    ),
    row(Category::Undefined, &[K(NodeKind::NamePart)]),
    row(
        Category::ClassPath,
        &[
            K(NodeKind::TranslationUnit),
            K(NodeKind::NamePart),
            K(NodeKind::Decl(DeclKind::Class)),
            Sub(Category::GraphDecl),
        ],
    ),
    row(Category::GraphDecl, GRAPH),
    row(
        Category::EcsDecl,
        &[K(NodeKind::Decl(DeclKind::Entity)), K(NodeKind::Decl(DeclKind::Component))],
    ),
    row(
        Category::Compounding,
        &[
            K(NodeKind::TranslationUnit),
            K(NodeKind::Stmt(StmtKind::Block)),
            K(NodeKind::Decl(DeclKind::Class)),
            Sub(Category::GraphDecl),
        ],
    ),
    row(
        Category::BodyOwner,
        &[
            K(NodeKind::Decl(DeclKind::Function)),
            K(NodeKind::Meta(MetaKind::Function)),
            K(NodeKind::Stmt(StmtKind::If)),
            K(NodeKind::Stmt(StmtKind::Else)),
            K(NodeKind::Stmt(StmtKind::For)),
            K(NodeKind::Stmt(StmtKind::ForRange)),
            K(NodeKind::Stmt(StmtKind::While)),
            K(NodeKind::Stmt(StmtKind::DoWhile)),
            K(NodeKind::Stmt(StmtKind::Switch)),
            K(NodeKind::Stmt(StmtKind::Case)),
            K(NodeKind::Stmt(StmtKind::Default)),
            Sub(Category::MetaStatement),
        ],
    ),
    row(
        Category::LoopHeader,
        &[
            K(NodeKind::Stmt(StmtKind::For)),
            K(NodeKind::Stmt(StmtKind::ForRange)),
            K(NodeKind::Meta(MetaKind::For)),
            K(NodeKind::Meta(MetaKind::ForRange)),
        ],
    ),
    row(Category::Statement, &[Fam(Family::Stmt)]),
    row(
        Category::MetaStatement,
        &[
            K(NodeKind::Meta(MetaKind::If)),
            K(NodeKind::Meta(MetaKind::Else)),
            K(NodeKind::Meta(MetaKind::For)),
            K(NodeKind::Meta(MetaKind::ForRange)),
        ],
    ),
    row(
        Category::MetaDecl,
        &[Sub(Category::MetaValueDecl), Sub(Category::MetaTypeDecl), Sub(Category::MetaFunction)],
    ),
    row(
        Category::MetaValueDecl,
        &[K(NodeKind::Meta(MetaKind::Variable)), K(NodeKind::Meta(MetaKind::Parameter))],
    ),
    row(Category::MetaTypeDecl, &[K(NodeKind::Meta(MetaKind::Builtin))]),
    row(Category::MetaFunction, &[K(NodeKind::Meta(MetaKind::Function))]),
    row(Category::Literal, &[Fam(Family::Literal)]),
    row(Category::ExprOp, &[Fam(Family::Op)]),
    row(
        Category::ExprValue,
        &[
            Sub(Category::Literal),
            Sub(Category::ExprOp),
            K(NodeKind::Rval),
            K(NodeKind::Resolve),
            K(NodeKind::Unresolved),
            K(NodeKind::ArgumentList),
            K(NodeKind::Meta(MetaKind::Rval)),
            K(NodeKind::Meta(MetaKind::Resolve)),
        ],
    ),
    row(Category::WithRvalReturn, &[Sub(Category::ExprValue), K(NodeKind::Ctor)]),
    row(
        Category::CompileTimeOnly,
        &[
            Fam(Family::Meta),
            K(NodeKind::Object),
            K(NodeKind::Decl(DeclKind::Builtin)),
            K(NodeKind::Decl(DeclKind::FunctionBuiltin)),
            K(NodeKind::Decl(DeclKind::TypePointer)),
            K(NodeKind::Decl(DeclKind::TypeLref)),
            Sub(Category::GraphDecl),
        ],
    ),
    row(
        Category::Builtin,
        &[
            K(NodeKind::Decl(DeclKind::Builtin)),
            K(NodeKind::Decl(DeclKind::FunctionBuiltin)),
            K(NodeKind::Meta(MetaKind::Builtin)),
        ],
    ),
    row(Category::Constructor, &[K(NodeKind::Ctor), K(NodeKind::Meta(MetaKind::Ctor))]),
];

const fn row(id: Category, members: &'static [Member]) -> CategoryInfo {
    CategoryInfo { id, members }
}

/// Category row for `cat`.
///
/// ## Panics
/// - If the registry is missing a row for `cat` (this indicates a programming error).
pub fn category_info(cat: Category) -> &'static CategoryInfo {
    CATEGORIES.iter().find(|c| c.id == cat).expect("category info missing")
}

/// Return `true` if `kind` is a member of `cat` (directly, by family, or through a sub-category).
pub fn is(kind: NodeKind, cat: Category) -> bool {
    category_info(cat).members.iter().any(|m| match *m {
        Member::Kind(k) => k == kind,
        Member::Family(f) => f.contains(kind),
        Member::Category(c) => is(kind, c),
    })
}

/// Return `true` if `kind` is a member of any of `cats`.
pub fn is_any(kind: NodeKind, cats: &[Category]) -> bool {
    cats.iter().any(|c| is(kind, *c))
}

// ============================================================================
// Display names
// ============================================================================

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Builtin => "builtin",
            DeclKind::FunctionBuiltin => "function-builtin",
            DeclKind::Variable => "variable",
            DeclKind::Parameter => "parameter",
            DeclKind::Function => "function",
            DeclKind::Class => "class",
            DeclKind::TypePointer => "pointer",
            DeclKind::TypeLref => "reference",
            DeclKind::World => "world",
            DeclKind::System => "system",
            DeclKind::Pool => "pool",
            DeclKind::Entity => "entity",
            DeclKind::Component => "component",
            DeclKind::Machine => "machine",
            DeclKind::Chain => "chain",
            DeclKind::Loop => "loop",
            DeclKind::Atom => "atom",
            DeclKind::State => "state",
        }
    }
}

impl StmtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StmtKind::Block => "block",
            StmtKind::Expr => "expr",
            StmtKind::Return => "return",
            StmtKind::Ctor => "ctor",
            StmtKind::If => "if",
            StmtKind::Else => "else",
            StmtKind::For => "for",
            StmtKind::ForRange => "for-range",
            StmtKind::ForCond => "for-cond",
            StmtKind::ForPost => "for-post",
            StmtKind::While => "while",
            StmtKind::DoWhile => "do-while",
            StmtKind::Switch => "switch",
            StmtKind::Case => "case",
            StmtKind::Default => "default",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Symlink => "symlink",
            StmtKind::BlockExpr => "block-expr",
        }
    }
}

impl MetaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetaKind::Builtin => "builtin",
            MetaKind::Variable => "variable",
            MetaKind::Parameter => "parameter",
            MetaKind::Function => "function",
            MetaKind::Ctor => "ctor",
            MetaKind::If => "if",
            MetaKind::Else => "else",
            MetaKind::For => "for",
            MetaKind::ForRange => "for-range",
            MetaKind::Rval => "rval",
            MetaKind::Resolve => "resolve",
        }
    }
}

impl LitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LitKind::Bool => "bool",
            LitKind::Int => "int",
            LitKind::Double => "double",
            LitKind::String => "string",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::TranslationUnit => write!(f, "unit"),
            NodeKind::NamePart => write!(f, "name"),
            NodeKind::Decl(k) => write!(f, "decl.{}", k.as_str()),
            NodeKind::Stmt(k) => write!(f, "stmt.{}", k.as_str()),
            NodeKind::Op(k) => write!(f, "op.{}", k.info().name.replace(' ', "-")),
            NodeKind::Literal(k) => write!(f, "lit.{}", k.as_str()),
            NodeKind::Meta(k) => write!(f, "meta.{}", k.as_str()),
            NodeKind::Rval => write!(f, "rval"),
            NodeKind::Resolve => write!(f, "resolve"),
            NodeKind::Unresolved => write!(f, "unresolved"),
            NodeKind::ArgumentList => write!(f, "args"),
            NodeKind::Argument => write!(f, "arg"),
            NodeKind::Ctor => write!(f, "ctor"),
            NodeKind::Object => write!(f, "object"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_row() {
        let all = [
            Category::Declaration,
            Category::ValueDecl,
            Category::TypeDecl,
            Category::Function,
            Category::Undefined,
            Category::ClassPath,
            Category::GraphDecl,
            Category::EcsDecl,
            Category::Compounding,
            Category::BodyOwner,
            Category::LoopHeader,
            Category::Statement,
            Category::MetaStatement,
            Category::MetaDecl,
            Category::MetaValueDecl,
            Category::MetaTypeDecl,
            Category::MetaFunction,
            Category::Literal,
            Category::ExprOp,
            Category::ExprValue,
            Category::WithRvalReturn,
            Category::CompileTimeOnly,
            Category::Builtin,
            Category::Constructor,
        ];
        for cat in all {
            assert_eq!(category_info(cat).id, cat);
        }
    }

    #[test]
    fn test_sub_categories_are_followed() {
        let meta_param = NodeKind::Meta(MetaKind::Parameter);
        assert!(is(meta_param, Category::MetaValueDecl));
        assert!(is(meta_param, Category::ValueDecl));
        assert!(is(meta_param, Category::MetaDecl));
        assert!(is(meta_param, Category::Declaration));
    }

    #[test]
    fn test_family_membership() {
        assert!(is(NodeKind::Op(OpKind::Add), Category::ExprOp));
        assert!(is(NodeKind::Op(OpKind::Call), Category::ExprValue));
        assert!(is(NodeKind::Literal(LitKind::String), Category::WithRvalReturn));
        assert!(is(NodeKind::Stmt(StmtKind::Symlink), Category::Statement));
    }

    #[test]
    fn test_graph_declarations_are_compile_time_only_containers() {
        for m in GRAPH {
            let Member::Kind(k) = *m else { panic!("graph row holds kinds only") };
            assert!(is(k, Category::Compounding));
            assert!(is(k, Category::ClassPath));
            assert!(is(k, Category::CompileTimeOnly));
        }
    }

    #[test]
    fn test_value_producing_excludes_builtins() {
        assert!(!is(NodeKind::Decl(DeclKind::Builtin), Category::WithRvalReturn));
        assert!(is(NodeKind::Rval, Category::WithRvalReturn));
    }

    #[test]
    fn test_loop_headers_and_builtins() {
        assert!(is(NodeKind::Meta(MetaKind::ForRange), Category::LoopHeader));
        assert!(is(NodeKind::Stmt(StmtKind::For), Category::BodyOwner));
        assert!(!is(NodeKind::Stmt(StmtKind::While), Category::LoopHeader));
        assert!(is(NodeKind::Meta(MetaKind::Builtin), Category::Builtin));
        assert!(is(NodeKind::Decl(DeclKind::FunctionBuiltin), Category::Builtin));
        assert!(!is(NodeKind::Decl(DeclKind::Function), Category::Builtin));
        assert!(is(NodeKind::Meta(MetaKind::Ctor), Category::Constructor));
    }

    #[test]
    fn test_operator_lookup_by_form() {
        use crate::lang::operators::OperatorId;
        assert_eq!(OpKind::lookup(OpForm::Prefix, OperatorId::Minus), Some(OpKind::Negative));
        assert_eq!(OpKind::lookup(OpForm::Infix, OperatorId::Minus), Some(OpKind::Sub));
        assert_eq!(OpKind::lookup(OpForm::Postfix, OperatorId::PlusPlus), Some(OpKind::PostInc));
        assert_eq!(OpKind::lookup(OpForm::Infix, OperatorId::Bang), None);
    }

    #[test]
    fn test_arity_table() {
        for o in OPS {
            let expected = match o.form {
                OpForm::Prefix | OpForm::Postfix => 1,
                OpForm::Infix | OpForm::Call | OpForm::Subscript => 2,
                OpForm::Ternary => 3,
            };
            assert_eq!(o.arity, expected, "{}", o.name);
        }
    }
}
