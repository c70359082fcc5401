//! Dotted paths and declaration lookup over an open scope stack.

use std::fmt;

use eon_core::lang::kinds::{Category, DeclKind, NodeKind, StmtKind};
use eon_syntax::span::Span;

use super::scope::ScopeStack;
use crate::ast::{Ast, NodeId};

/// One segment of a dotted path; `meta` marks a `$name` segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPart {
    pub name: String,
    pub meta: bool,
    pub span: Span,
}

/// Pointer (`#`) or reference (`&`) decoration of a type path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Pointer,
    Lref,
}

impl Decoration {
    pub fn kind(self) -> NodeKind {
        match self {
            Decoration::Pointer => NodeKind::Decl(DeclKind::TypePointer),
            Decoration::Lref => NodeKind::Decl(DeclKind::TypeLref),
        }
    }

    pub fn sigil(self) -> &'static str {
        match self {
            Decoration::Pointer => "#",
            Decoration::Lref => "&",
        }
    }
}

/// A dotted, possibly decorated, identifier path such as `cfg.$field` or `int#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIdentifier {
    pub head: Vec<Decoration>,
    pub parts: Vec<PathPart>,
    pub tail: Vec<Decoration>,
    pub span: Span,
}

impl PathIdentifier {
    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Self {
            head: Vec::new(),
            parts: vec![PathPart { name: name.into(), meta: false, span }],
            tail: Vec::new(),
            span,
        }
    }

    /// Parse the textual form produced by `Display` (without decorations).
    pub fn parse_text(text: &str, span: Span) -> Self {
        let parts = text
            .split('.')
            .map(|seg| match seg.strip_prefix('$') {
                Some(name) => PathPart { name: name.to_string(), meta: true, span },
                None => PathPart { name: seg.to_string(), meta: false, span },
            })
            .collect();
        Self {
            head: Vec::new(),
            parts,
            tail: Vec::new(),
            span,
        }
    }

    /// `$name` in type position names a compile-time type.
    pub fn is_meta(&self) -> bool {
        self.parts.first().is_some_and(|p| p.meta)
    }

    /// Any `$` segment after the first; such paths are resolved by the meta evaluator.
    pub fn has_meta_segments(&self) -> bool {
        self.parts.iter().skip(1).any(|p| p.meta)
    }

    pub fn last_name(&self) -> &str {
        self.parts.last().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn is_decorated(&self) -> bool {
        !self.head.is_empty() || !self.tail.is_empty()
    }

    /// Decorations in application order: trailing ones first, then leading ones.
    pub fn decorations(&self) -> impl Iterator<Item = Decoration> + '_ {
        self.tail.iter().chain(self.head.iter()).copied()
    }
}

impl fmt::Display for PathIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.head {
            f.write_str(d.sigil())?;
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if part.meta {
                f.write_str("$")?;
            }
            f.write_str(&part.name)?;
        }
        for d in &self.tail {
            f.write_str(d.sigil())?;
        }
        Ok(())
    }
}

/// Child of `owner` matching one path segment.
///
/// Only declarations match: operand nodes named after the path they reference never shadow them. `$` segments
/// only match compile-time declarations; plain segments never match compile-time types.
pub fn find_segment(ast: &Ast, owner: NodeId, part: &PathPart, filter: Option<Category>) -> Option<NodeId> {
    ast.children(owner).iter().copied().find(|c| {
        let node = ast.node(*c);
        if node.id != part.name || !node.is(Category::Declaration) {
            return false;
        }
        let shape = if part.meta {
            node.is(Category::MetaDecl)
        } else {
            !node.is(Category::MetaTypeDecl)
        };
        shape && filter.is_none_or(|cat| node.is(cat))
    })
}

/// Resolve `path` starting at `scope`. `filter` constrains the last segment only.
///
/// When a segment is missing inside a function or statement that owns a body block, the lookup
/// retries in that block.
pub fn resolve_from(ast: &Ast, scope: NodeId, path: &PathIdentifier, filter: Option<Category>) -> Option<NodeId> {
    let mut cur = scope;
    let count = path.parts.len();
    for (i, part) in path.parts.iter().enumerate() {
        let seg_filter = if i + 1 == count { filter } else { None };
        cur = match find_segment(ast, cur, part, seg_filter) {
            Some(found) => found,
            None => {
                if !ast.is(cur, Category::BodyOwner) {
                    return None;
                }
                let body = ast.first_child_of(cur, NodeKind::Stmt(StmtKind::Block))?;
                find_segment(ast, body, part, seg_filter)?
            }
        };
    }
    Some(cur)
}

/// Resolve `path` against every open scope, innermost first.
pub fn find_declaration(
    ast: &Ast,
    scopes: &ScopeStack,
    path: &PathIdentifier,
    filter: Option<Category>,
) -> Option<NodeId> {
    scopes.nodes().find_map(|scope| resolve_from(ast, scope, path, filter))
}

/// Apply pointer/reference decorations to a resolved type, creating the wrapper types on first use.
pub fn decorate(ast: &mut Ast, base: NodeId, decorations: impl Iterator<Item = Decoration>) -> NodeId {
    let mut cur = base;
    for d in decorations {
        let span = ast.node(cur).span;
        cur = ast.get_add(cur, d.kind(), d.sigil(), span);
    }
    cur
}
