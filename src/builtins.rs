//! Builtin declarations every program starts with.
//!
//! There are no process-wide singletons: a [`Builtins`] value is built once (usually with
//! [`Builtins::init_default`]) and handed to each compiler instance, which seeds them into the roots
//! of its trees.

use eon_core::lang::kinds::{DeclKind, MetaKind, NodeKind};
use eon_syntax::span::Span;

use crate::ast::{Ast, NodeId};

/// Compile-time type given to `$def` functions whose calls expand to an expression.
pub const META_EXPR: &str = "expr";
/// Compile-time type given to `$def` functions whose calls expand to statements.
pub const META_LOOPSTMT: &str = "loopstmt";
/// Compile-time type given to `$def` functions called only for their effects.
pub const META_VOID: &str = "void";

/// A builtin function visible to programs and the name of its return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub ret: &'static str,
}

/// Builtin tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builtins {
    pub types: Vec<&'static str>,
    pub meta_types: Vec<&'static str>,
    pub functions: Vec<BuiltinFunction>,
}

impl Builtins {
    /// The standard set: runtime types `void int double bool string`, compile-time types
    /// `$int $double $bool $string $expr $loopstmt $void`, and the function `LOG`.
    pub fn init_default() -> Self {
        Self {
            types: vec!["void", "int", "double", "bool", "string"],
            meta_types: vec!["int", "double", "bool", "string", META_EXPR, META_LOOPSTMT, META_VOID],
            functions: vec![BuiltinFunction { name: "LOG", ret: "void" }],
        }
    }

    /// Add the builtin declarations to `root`.
    pub fn seed(&self, ast: &mut Ast, root: NodeId) {
        for name in &self.types {
            ast.add(root, NodeKind::Decl(DeclKind::Builtin), *name, Span::default());
        }
        for name in &self.meta_types {
            ast.add(root, NodeKind::Meta(MetaKind::Builtin), *name, Span::default());
        }
        for f in &self.functions {
            let n = ast.add(root, NodeKind::Decl(DeclKind::FunctionBuiltin), f.name, Span::default());
            let ret = ast.find_child_kind(root, f.ret, NodeKind::Decl(DeclKind::Builtin));
            ast.node_mut(n).ty = ret;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eon_core::lang::kinds::Category;

    #[test]
    fn test_seed_adds_every_builtin() {
        let builtins = Builtins::init_default();
        let mut ast = Ast::new();
        let root = ast.root();
        builtins.seed(&mut ast, root);

        let total = builtins.types.len() + builtins.meta_types.len() + builtins.functions.len();
        assert_eq!(ast.children(root).len(), total);
        let void = ast.find_child_kind(root, "void", NodeKind::Decl(DeclKind::Builtin));
        assert!(void.is_some());

        let int = ast.find_child_in(root, "int", Category::MetaTypeDecl);
        assert!(int.is_some());
        let runtime_int = ast.find_child_kind(root, "int", NodeKind::Decl(DeclKind::Builtin));
        assert_ne!(int, runtime_int);

        let log = ast.find_child_in(root, "LOG", Category::Function);
        assert_eq!(log.and_then(|l| ast.node(l).ty), void);
    }
}
