//! Indented textual rendering of a tree, used by `--parse`/`--meta` and the AST export target.

use std::fmt::Write as _;

use eon_core::lang::kinds::Category;

use super::{Ast, NodeId, Value};

/// Render the tree below `root`, two spaces per level.
///
/// Seeded builtins directly under a root are left out; they are identical for every program.
pub fn dump(ast: &Ast, root: NodeId) -> String {
    let mut out = String::new();
    for child in ast.children(root) {
        if ast.is(*child, Category::Builtin) {
            continue;
        }
        dump_node(ast, *child, 0, &mut out);
    }
    out
}

fn dump_node(ast: &Ast, id: NodeId, depth: usize, out: &mut String) {
    let node = ast.node(id);
    let _ = write!(out, "{}{}", "  ".repeat(depth), node.kind);
    if !node.id.is_empty() {
        let _ = write!(out, " {}", node.id);
    }
    if node.flat {
        out.push_str(" [flat]");
    }
    if let Some(ty) = node.ty {
        let _ = write!(out, " : {}", label(ast, ty));
    }
    if let Some(rval) = node.rval {
        let _ = write!(out, " -> {}", label(ast, rval));
    }
    for (i, arg) in node.args().enumerate() {
        let _ = write!(out, " ${}={}", i, label(ast, arg));
    }
    match &node.value {
        Value::None => {}
        Value::Str(s) => {
            let _ = write!(out, " = {:?}", s);
        }
        v => {
            let _ = write!(out, " = {}", v);
        }
    }
    out.push('\n');
    for child in &node.children {
        dump_node(ast, *child, depth + 1, out);
    }
}

/// Short name for a link target: its path when it has one, else its kind.
fn label(ast: &Ast, id: NodeId) -> String {
    let path = ast.path_of(id);
    if !ast.node(id).id.is_empty() {
        return path;
    }
    match &ast.node(id).value {
        Value::None => ast.kind(id).to_string(),
        v => format!("{}({})", ast.kind(id), v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eon_core::lang::kinds::{DeclKind, LitKind, NodeKind, StmtKind};
    use eon_syntax::span::Span;

    #[test]
    fn test_dump_skips_builtins_and_renders_links() {
        let mut ast = Ast::new();
        let root = ast.root();
        let int = ast.add(root, NodeKind::Decl(DeclKind::Builtin), "int", Span::default());
        let var = ast.add(root, NodeKind::Decl(DeclKind::Variable), "x", Span::default());
        ast.node_mut(var).ty = Some(int);
        let stmt = ast.add(root, NodeKind::Stmt(StmtKind::Expr), "", Span::default());
        let lit = ast.add(stmt, NodeKind::Literal(LitKind::Int), "", Span::default());
        ast.node_mut(lit).value = Value::Int(3);
        ast.node_mut(stmt).rval = Some(lit);

        insta::assert_snapshot!(dump(&ast, root), @r"
        decl.variable x : int
        stmt.expr -> lit.int(3)
          lit.int = 3
        ");
    }
}
