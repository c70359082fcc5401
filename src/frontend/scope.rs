//! Scope stack shared by the semantic parser and the meta evaluator.
//!
//! A frame is a node of the tree being built. Pushing a node whose owner is not the current top pushes
//! the whole owner chain below the nearest open frame first, so lookups see every enclosing scope; such
//! a group is popped again as a unit. Expression operands are single frames.

use eon_core::lang::kinds::Category;

use crate::ast::{Ast, NodeId};

/// One open scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub node: NodeId,
    /// First frame of a pushed group; `pop` stops after removing it.
    pub pop_this: bool,
}

/// Stack of open scopes, rooted at a translation unit that is never popped.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new(root: NodeId) -> Self {
        Self {
            frames: vec![Frame { node: root, pop_this: true }],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> NodeId {
        self.frames[self.frames.len() - 1].node
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame nodes, innermost first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.frames.iter().rev().map(|f| f.node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.frames.iter().any(|f| f.node == node)
    }

    /// Push `node` together with any of its owners that are not open yet.
    pub fn push(&mut self, ast: &Ast, node: NodeId) {
        let mut chain = vec![node];
        let mut anchored = false;
        for owner in ast.ancestors(node) {
            if self.contains(owner) {
                anchored = true;
                break;
            }
            chain.push(owner);
        }
        // An owner chain that never meets an open frame belongs to another tree; push `node` alone.
        if !anchored {
            chain.truncate(1);
        }
        for (i, n) in chain.into_iter().rev().enumerate() {
            self.frames.push(Frame { node: n, pop_this: i == 0 });
        }
    }

    /// Push exactly one frame.
    pub fn push_single(&mut self, node: NodeId) {
        self.frames.push(Frame { node, pop_this: true });
    }

    /// Pop the most recent group and return its innermost node. The root frame is never popped.
    pub fn pop(&mut self) -> Option<NodeId> {
        if self.frames.len() <= 1 {
            return None;
        }
        let top = self.top();
        while self.frames.len() > 1 {
            let frame = self.frames.pop()?;
            if frame.pop_this {
                break;
            }
        }
        Some(top)
    }

    /// Restore a depth recorded earlier; used to recover after a failed statement.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    /// Replace the `n` topmost frames (expression operands) with a single frame for `node`.
    pub fn replace_top(&mut self, n: usize, node: NodeId) {
        let keep = self.frames.len().saturating_sub(n).max(1);
        self.frames.truncate(keep);
        self.push_single(node);
    }

    /// The `n` topmost frame nodes, bottom first.
    pub fn top_nodes(&self, n: usize) -> Vec<NodeId> {
        let start = self.frames.len().saturating_sub(n);
        self.frames[start..].iter().map(|f| f.node).collect()
    }

    /// Node of the frame `n` below the top (`0` is the top).
    pub fn nth_from_top(&self, n: usize) -> Option<NodeId> {
        self.frames.iter().rev().nth(n).map(|f| f.node)
    }

    /// Innermost open frame in `cat` that is not locked.
    pub fn nearest(&self, ast: &Ast, cat: Category) -> Option<NodeId> {
        self.nodes().find(|n| ast.is(*n, cat) && !ast.node(*n).locked)
    }

    /// Innermost open frame that is not locked; new nodes are owned by it.
    pub fn non_locked_top(&self, ast: &Ast) -> NodeId {
        self.nodes().find(|n| !ast.node(*n).locked).unwrap_or(self.frames[0].node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eon_core::lang::kinds::{DeclKind, NodeKind, StmtKind};
    use eon_syntax::span::Span;

    fn nested() -> (Ast, NodeId, NodeId, NodeId) {
        let mut ast = Ast::new();
        let root = ast.root();
        let f = ast.add(root, NodeKind::Decl(DeclKind::Function), "f", Span::default());
        let body = ast.add(f, NodeKind::Stmt(StmtKind::Block), "", Span::default());
        let stmt = ast.add(body, NodeKind::Stmt(StmtKind::Expr), "", Span::default());
        (ast, f, body, stmt)
    }

    #[test]
    fn test_push_opens_missing_owners_as_one_group() {
        let (ast, f, body, stmt) = nested();
        let mut scopes = ScopeStack::new(ast.root());
        scopes.push(&ast, stmt);
        assert_eq!(scopes.depth(), 4);
        assert_eq!(scopes.top_nodes(3), vec![f, body, stmt]);

        assert_eq!(scopes.pop(), Some(stmt));
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_push_child_of_top_is_single_frame() {
        let (ast, f, body, _) = nested();
        let mut scopes = ScopeStack::new(ast.root());
        scopes.push(&ast, f);
        scopes.push(&ast, body);
        assert_eq!(scopes.depth(), 3);
        assert_eq!(scopes.pop(), Some(body));
        assert_eq!(scopes.top(), f);
    }

    #[test]
    fn test_root_frame_is_never_popped() {
        let ast = Ast::new();
        let mut scopes = ScopeStack::new(ast.root());
        assert_eq!(scopes.pop(), None);
        scopes.truncate(0);
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_replace_top_collapses_operands() {
        let (ast, f, body, stmt) = nested();
        let mut scopes = ScopeStack::new(ast.root());
        scopes.push_single(f);
        scopes.push_single(body);
        scopes.replace_top(2, stmt);
        assert_eq!(scopes.depth(), 2);
        assert_eq!(scopes.top(), stmt);
    }

    #[test]
    fn test_nearest_skips_locked_frames() {
        let (mut ast, f, body, _) = nested();
        let mut scopes = ScopeStack::new(ast.root());
        scopes.push(&ast, body);
        assert_eq!(scopes.nearest(&ast, Category::Compounding), Some(body));
        ast.node_mut(body).locked = true;
        assert_eq!(scopes.nearest(&ast, Category::Compounding), Some(ast.root()));
        assert_eq!(scopes.non_locked_top(&ast), f);
    }
}
