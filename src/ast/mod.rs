//! Arena-allocated AST shared by the semantic parser, the meta evaluator and the exporter.
//!
//! Nodes live in one `Vec` and are addressed by stable [`NodeId`] handles. Ownership is the
//! `children` list only: every node has at most one owner. All other links (`ty`, `rval`, `arg`,
//! `ctx_next`, `prev`) are plain handles and may form cycles or point into another tree held by the
//! same arena (the meta evaluator builds the residual tree next to the semantic one and links them
//! through `prev`).
//!
//! Nodes are never removed; a handle stays valid for the lifetime of the arena.

mod dump;

use std::fmt;

use eon_core::lang::kinds::{self, Category, LitKind, NodeKind};
use eon_syntax::span::Span;

pub use dump::dump;

/// Stable handle of a node in an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Literal payload of a node, and the value domain of the compile-time evaluator.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

impl Value {
    pub fn lit_kind(&self) -> Option<LitKind> {
        match self {
            Value::None => None,
            Value::Bool(_) => Some(LitKind::Bool),
            Value::Int(_) => Some(LitKind::Int),
            Value::Double(_) => Some(LitKind::Double),
            Value::Str(_) => Some(LitKind::String),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.lit_kind().map(|k| k.as_str()).unwrap_or("none")
    }

    /// C-like truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric view used by the evaluator; bools count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::None | Value::Str(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            other => other.as_f64().map(|d| d as i64),
        }
    }
}

impl fmt::Display for Value {
    /// Source-like rendering: integral doubles print without a fraction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => {
                if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e15 {
                    write!(f, "{}", *d as i64)
                } else {
                    write!(f, "{}", d)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    /// Identifier, empty for anonymous nodes.
    pub id: String,
    pub owner: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Operand slots.
    pub arg: [Option<NodeId>; 4],
    pub ty: Option<NodeId>,
    /// What this node evaluates to.
    pub rval: Option<NodeId>,
    /// Declaration/initializer pairing, and `if` to `else`.
    pub ctx_next: Option<NodeId>,
    /// Origin node from the previous pass.
    pub prev: Option<NodeId>,
    pub value: Value,
    /// Blocks re-merging into this node.
    pub locked: bool,
    /// Block rendered inline, without braces or extra indentation.
    pub flat: bool,
    pub span: Span,
}

impl AstNode {
    fn new(kind: NodeKind, id: String, span: Span) -> Self {
        Self {
            kind,
            id,
            owner: None,
            children: Vec::new(),
            arg: [None; 4],
            ty: None,
            rval: None,
            ctx_next: None,
            prev: None,
            value: Value::None,
            locked: false,
            flat: false,
            span,
        }
    }

    pub fn is(&self, cat: Category) -> bool {
        kinds::is(self.kind, cat)
    }

    /// Operand handles in slot order, stopping at the first empty slot.
    pub fn args(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arg.iter().map_while(|a| *a)
    }
}

/// Node arena with a translation-unit root at index 0.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    pub fn new() -> Self {
        Self {
            nodes: vec![AstNode::new(NodeKind::TranslationUnit, String::new(), Span::default())],
        }
    }

    /// Root of the semantic tree.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn is(&self, id: NodeId, cat: Category) -> bool {
        self.node(id).is(cat)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Allocate a node with no owner (a second root).
    pub fn alloc(&mut self, kind: NodeKind, id: impl Into<String>, span: Span) -> NodeId {
        let handle = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode::new(kind, id.into(), span));
        handle
    }

    /// Append a new child to `owner`.
    pub fn add(&mut self, owner: NodeId, kind: NodeKind, id: impl Into<String>, span: Span) -> NodeId {
        let child = self.alloc(kind, id, span);
        self.attach(owner, child);
        child
    }

    /// Insert a new child into `owner` right before `before`, or append when `before` is not a child.
    pub fn insert_before(
        &mut self,
        owner: NodeId,
        before: NodeId,
        kind: NodeKind,
        id: impl Into<String>,
        span: Span,
    ) -> NodeId {
        let child = self.alloc(kind, id, span);
        self.node_mut(child).owner = Some(owner);
        let children = &mut self.node_mut(owner).children;
        match children.iter().position(|c| *c == before) {
            Some(pos) => children.insert(pos, child),
            None => children.push(child),
        }
        child
    }

    fn attach(&mut self, owner: NodeId, child: NodeId) {
        self.node_mut(child).owner = Some(owner);
        self.node_mut(owner).children.push(child);
    }

    /// Move `child` to the end of `new_owner`'s children.
    pub fn reparent(&mut self, child: NodeId, new_owner: NodeId) {
        if let Some(old) = self.node(child).owner {
            self.node_mut(old).children.retain(|c| *c != child);
        }
        self.attach(new_owner, child);
    }

    /// Move `child` right before its sibling `before` (to the end when `before` is not a sibling).
    pub fn move_before(&mut self, child: NodeId, before: NodeId) {
        let Some(owner) = self.node(child).owner else {
            return;
        };
        let children = &mut self.node_mut(owner).children;
        children.retain(|c| *c != child);
        let pos = children.iter().position(|c| *c == before).unwrap_or(children.len());
        children.insert(pos, child);
    }

    /// Drop every child link of `id`; the nodes stay in the arena.
    pub fn clear_children(&mut self, id: NodeId) {
        self.node_mut(id).children.clear();
    }

    /// Find a child by identifier and kind, or create it.
    pub fn get_add(&mut self, owner: NodeId, kind: NodeKind, id: &str, span: Span) -> NodeId {
        match self.find_child_kind(owner, id, kind) {
            Some(existing) => existing,
            None => self.add(owner, kind, id, span),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// First child named `id`, of any kind.
    pub fn find_child(&self, owner: NodeId, id: &str) -> Option<NodeId> {
        self.children(owner).iter().copied().find(|c| self.node(*c).id == id)
    }

    pub fn find_child_kind(&self, owner: NodeId, id: &str, kind: NodeKind) -> Option<NodeId> {
        self.children(owner)
            .iter()
            .copied()
            .find(|c| self.node(*c).id == id && self.node(*c).kind == kind)
    }

    pub fn find_child_in(&self, owner: NodeId, id: &str, cat: Category) -> Option<NodeId> {
        self.children(owner)
            .iter()
            .copied()
            .find(|c| self.node(*c).id == id && self.is(*c, cat))
    }

    /// First child of `kind`, regardless of identifier.
    pub fn first_child_of(&self, owner: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(owner).iter().copied().find(|c| self.kind(*c) == kind)
    }

    /// Owners of `id`, nearest first (excluding `id`).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).owner, move |n| self.node(*n).owner)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        self.ancestors(of).any(|a| a == ancestor)
    }

    /// Top of the tree `id` belongs to.
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Latest child of `owner` whose `prev` is `prev`.
    pub fn find_prev_in(&self, owner: NodeId, prev: NodeId) -> Option<NodeId> {
        self.children(owner)
            .iter()
            .rev()
            .copied()
            .find(|c| self.node(*c).prev == Some(prev))
    }

    /// Depth-first search under `under` (inclusive) for a node whose `prev` is `prev`.
    pub fn find_prev_deep(&self, under: NodeId, prev: NodeId) -> Option<NodeId> {
        let mut stack = vec![under];
        while let Some(n) = stack.pop() {
            if self.node(n).prev == Some(prev) {
                return Some(n);
            }
            stack.extend(self.children(n).iter().rev().copied());
        }
        None
    }

    /// Number of nodes reachable from `root` through child links (inclusive).
    pub fn count_under(&self, root: NodeId) -> usize {
        1 + self
            .children(root)
            .iter()
            .map(|c| self.count_under(*c))
            .sum::<usize>()
    }

    /// Dotted identifier path from the tree root, for diagnostics.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = self
            .ancestors(id)
            .filter(|a| !self.node(*a).id.is_empty())
            .map(|a| self.node(a).id.as_str())
            .collect();
        parts.reverse();
        if !self.node(id).id.is_empty() {
            parts.push(&self.node(id).id);
        }
        parts.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eon_core::lang::kinds::{DeclKind, StmtKind};

    #[test]
    fn test_add_sets_owner_and_children() {
        let mut ast = Ast::new();
        let root = ast.root();
        let w = ast.add(root, NodeKind::Decl(DeclKind::World), "w", Span::default());
        assert_eq!(ast.node(w).owner, Some(root));
        assert_eq!(ast.children(root), &[w]);
        assert_eq!(ast.path_of(w), "w");
    }

    #[test]
    fn test_insert_before_keeps_order() {
        let mut ast = Ast::new();
        let root = ast.root();
        let stmt = ast.add(root, NodeKind::Stmt(StmtKind::Ctor), "", Span::default());
        let var = ast.insert_before(root, stmt, NodeKind::Decl(DeclKind::Variable), "x", Span::default());
        assert_eq!(ast.children(root), &[var, stmt]);

        let late = ast.add(root, NodeKind::NamePart, "cfg", Span::default());
        ast.move_before(late, stmt);
        assert_eq!(ast.children(root), &[var, late, stmt]);
    }

    #[test]
    fn test_get_add_is_keyed_by_kind() {
        let mut ast = Ast::new();
        let root = ast.root();
        let a = ast.get_add(root, NodeKind::NamePart, "a", Span::default());
        let b = ast.get_add(root, NodeKind::NamePart, "a", Span::default());
        let c = ast.get_add(root, NodeKind::Decl(DeclKind::Class), "a", Span::default());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_prev_lookups() {
        let mut ast = Ast::new();
        let root = ast.root();
        let src = ast.add(root, NodeKind::Decl(DeclKind::Variable), "x", Span::default());
        let result_root = ast.alloc(NodeKind::TranslationUnit, "", Span::default());
        let block = ast.add(result_root, NodeKind::Stmt(StmtKind::Block), "", Span::default());
        let copy = ast.add(block, NodeKind::Decl(DeclKind::Variable), "x", Span::default());
        ast.node_mut(copy).prev = Some(src);
        assert_eq!(ast.find_prev_in(block, src), Some(copy));
        assert_eq!(ast.find_prev_in(result_root, src), None);
        assert_eq!(ast.find_prev_deep(result_root, src), Some(copy));
        assert_eq!(ast.tree_root(copy), result_root);
        assert!(ast.is_ancestor(result_root, copy));
    }

    #[test]
    fn test_value_rendering_and_truthiness() {
        assert_eq!(Value::Double(14.0).to_string(), "14");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Str("a".into()).is_truthy());
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Value::Str("a".into()).as_f64(), None);
    }
}
