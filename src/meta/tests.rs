use eon_core::lang::kinds::{DeclKind, NodeKind, StmtKind};
use eon_syntax::diagnostics::{CompileError, ErrorKind};
use eon_syntax::{lexer, structure};
use proptest::prelude::*;

use super::{EvalConfig, MetaEvaluator, ResolvedUnit};
use crate::ast::{self, NodeId, Value};
use crate::builtins::Builtins;
use crate::frontend::semantic::SemanticParser;

fn eval_with(src: &str, config: EvalConfig) -> Result<ResolvedUnit, Vec<CompileError>> {
    let tokens = lexer::lex(src).expect("lexes");
    let tree = structure::build(&tokens).expect("structures");
    let unit = SemanticParser::new(&Builtins::init_default())
        .parse(&tokens, &tree)
        .expect("parses");
    MetaEvaluator::new(unit, config).run()
}

fn eval_ok(src: &str) -> ResolvedUnit {
    match eval_with(src, EvalConfig::default()) {
        Ok(unit) => unit,
        Err(errs) => panic!("unexpected errors: {:?}", errs),
    }
}

fn eval_err(src: &str) -> Vec<CompileError> {
    match eval_with(src, EvalConfig::default()) {
        Ok(_) => panic!("expected errors for {:?}", src),
        Err(errs) => errs,
    }
}

/// Residual nodes of `kind`, in allocation order.
fn residual(unit: &ResolvedUnit, kind: NodeKind) -> Vec<NodeId> {
    (0..unit.ast.len() as u32)
        .map(NodeId)
        .filter(|n| unit.ast.kind(*n) == kind && unit.ast.tree_root(*n) == unit.root)
        .collect()
}

/// Residual value of the initializer of variable `name`.
fn initializer(unit: &ResolvedUnit, name: &str) -> NodeId {
    let ast = &unit.ast;
    let ctor = residual(unit, NodeKind::Ctor)
        .into_iter()
        .find(|c| ast.node(*c).rval.is_some_and(|v| ast.node(v).id == name))
        .expect("constructor of the variable");
    let list = ast.node(ctor).arg[0].expect("argument list");
    let arg = ast.children(list)[0];
    ast.node(arg).rval.expect("argument value")
}

fn value_of(unit: &ResolvedUnit, name: &str) -> Value {
    unit.ast.node(initializer(unit, name)).value.clone()
}

// ============================================================================
// Loops and conditionals
// ============================================================================

#[test]
fn test_meta_for_unrolls_into_flat_blocks() {
    let unit = eval_ok("$for $int i = 0; i < 2; i++:\n    LOG(i)\n");
    insta::assert_snapshot!(ast::dump(&unit.ast, unit.root), @r"
    stmt.block [flat]
      object i = 2
      stmt.block [flat]
        stmt.expr -> op.call
          op.call $0=LOG $1=args
            resolve LOG -> LOG
            args
              arg -> lit.int(0)
                lit.int = 0
      stmt.block [flat]
        stmt.expr -> op.call
          op.call $0=LOG $1=args
            resolve LOG -> LOG
            args
              arg -> lit.int(1)
                lit.int = 1
    ");
}

#[test]
fn test_meta_for_without_iterations_leaves_no_statements() {
    let unit = eval_ok("$for $int i = 5; i < 3; i++:\n    LOG(i)\n");
    assert!(residual(&unit, NodeKind::Stmt(StmtKind::Expr)).is_empty());
}

#[test]
fn test_meta_loop_variables_are_scoped_to_the_loop() {
    let src = "$for $int i = 0; i < 1; i++:\n    LOG(i)\n$for $int i = 0; i < 1; i++:\n    LOG(i)\n";
    let unit = eval_ok(src);
    assert_eq!(residual(&unit, NodeKind::Stmt(StmtKind::Expr)).len(), 2);
}

#[test]
fn test_iteration_cap() {
    let config = EvalConfig {
        max_meta_iterations: Some(2),
        ..EvalConfig::default()
    };
    let errs = eval_with("$for $int i = 0; i < 3; i++:\n    LOG(i)\n", config).unwrap_err();
    assert_eq!(errs[0].message, "compile-time loop exceeded 2 iterations");
}

#[test]
fn test_meta_if_selects_one_branch() {
    let unit = eval_ok("$int n = 2\n$if n > 1:\n    LOG(1)\n$else:\n    LOG(2)\n");
    let literals = residual(&unit, NodeKind::Literal(eon_core::lang::kinds::LitKind::Int));
    let values: Vec<Value> = literals.iter().map(|l| unit.ast.node(*l).value.clone()).collect();
    assert_eq!(values, vec![Value::Int(1)]);
}

#[test]
fn test_meta_if_false_without_else_expands_to_nothing() {
    let unit = eval_ok("$if 0:\n    LOG(1)\n");
    assert!(residual(&unit, NodeKind::Stmt(StmtKind::Block)).is_empty());
}

#[test]
fn test_meta_for_range_is_unsupported() {
    let errs = eval_err("int n = 3\n$for $int i in n:\n    LOG(i)\n");
    assert_eq!(errs[0].kind, ErrorKind::Unsupported);
}

// ============================================================================
// Compile-time variables and folding
// ============================================================================

#[test]
fn test_literal_expressions_fold() {
    let unit = eval_ok("int a = 2 * 7\ndouble b = 5 / 2\nbool c = \"a\" == \"a\"\n");
    assert_eq!(value_of(&unit, "a"), Value::Double(14.0));
    assert_eq!(value_of(&unit, "b"), Value::Double(2.5));
    assert_eq!(value_of(&unit, "c"), Value::Bool(true));
}

#[test]
fn test_runtime_operands_are_not_folded() {
    let unit = eval_ok("int a = 1\nint b = a + 1\n");
    let init = initializer(&unit, "b");
    assert_eq!(unit.ast.kind(init), NodeKind::Op(eon_core::lang::kinds::OpKind::Add));
}

#[test]
fn test_meta_variables_become_literals() {
    let unit = eval_ok("$int n = 4\nn = n + 1\nint x = n\n");
    assert_eq!(value_of(&unit, "x"), Value::Double(5.0));
}

#[test]
fn test_duplicate_meta_variable() {
    let errs = eval_err("$int i = 0\n$int i = 1\n");
    assert!(errs.iter().any(|e| e.message == "meta-variable 'i' has already been declared"));
}

#[test]
fn test_uninitialized_meta_variable() {
    let errs = eval_err("$int i\nint x = i\n");
    assert_eq!(errs[0].message, "meta-variable 'i' is not initialized yet");
}

#[test]
fn test_unsupported_operator_is_loud() {
    let errs = eval_err("$int a = 5 % 2\n");
    assert_eq!(errs[0].message, "operator 'modulus' is not supported in compile-time evaluation");
}

#[test]
fn test_non_finite_compile_time_value() {
    let errs = eval_err("$double r = 1 / 0\nLOG(r)\n");
    assert_eq!(errs[0].message, "operator 'division' does not produce a finite number");
}

#[test]
fn test_runtime_value_in_compile_time_context() {
    let errs = eval_err("int r = 1\n$int m = r\n");
    assert!(errs[0].message.contains("'r' is not a compile-time value"));
}

#[test]
fn test_meta_path_segments_are_substituted() {
    let unit = eval_ok("$string f = \"x\"\nint cfg.x = 1\nint y = cfg.$f\n");
    let init = initializer(&unit, "y");
    assert_eq!(unit.ast.kind(init), NodeKind::Rval);
    let target = unit.ast.node(init).rval.expect("target");
    assert_eq!(unit.ast.path_of(target), "cfg.x");
    assert_eq!(unit.ast.tree_root(target), unit.root);
}

// ============================================================================
// Compile-time functions
// ============================================================================

#[test]
fn test_expr_function_returns_its_value() {
    let unit = eval_ok("$def $expr twice($int v):\n    return v * 2\nint x = twice(4)\n");
    assert_eq!(value_of(&unit, "x"), Value::Double(8.0));
}

#[test]
fn test_return_inside_meta_if_stops_the_call() {
    let src = concat!(
        "$def $expr pick($int n):\n    $if n > 0:\n        return 1\n    return 2\n",
        "int a = pick(1)\nint b = pick(0)\n"
    );
    let unit = eval_ok(src);
    assert_eq!(value_of(&unit, "a"), Value::Int(1));
    assert_eq!(value_of(&unit, "b"), Value::Int(2));
}

#[test]
fn test_loopstmt_function_expands_through_a_symlink() {
    let unit = eval_ok("$def $loopstmt both():\n    LOG(1)\n    LOG(2)\ndef void f():\n    both()\n");
    let links = residual(&unit, NodeKind::Stmt(StmtKind::Symlink));
    assert_eq!(links.len(), 1);
    let block = unit.ast.node(links[0]).rval.expect("linked block");
    assert!(unit.ast.node(block).flat);
    assert_eq!(unit.ast.children(block).len(), 2);
}

#[test]
fn test_void_function_runs_for_its_effects() {
    let unit = eval_ok("$int n = 0\n$def $void bump():\n    n++\nbump()\nint x = n\n");
    assert_eq!(value_of(&unit, "x"), Value::Int(1));
}

#[test]
fn test_missing_return_value() {
    let errs = eval_err("$def $expr quiet():\n    LOG(1)\nint x = quiet()\n");
    assert!(errs.iter().any(|e| e.message == "compile-time function 'quiet' did not return a value"));
}

#[test]
fn test_argument_count_mismatch() {
    let errs = eval_err("$def $expr one($int a):\n    return a\nint x = one(1, 2)\n");
    assert_eq!(errs[0].message, "compile-time function 'one' expects 1 arguments, found 2");
}

#[test]
fn test_runaway_recursion_is_bounded() {
    let errs = eval_err("$def $expr f($int n):\n    return f(n)\nint x = f(1)\n");
    assert_eq!(errs.len(), 1, "{:?}", errs);
    assert!(errs[0].message.contains("call depth exceeded"));
}

// ============================================================================
// Merging and retargeting
// ============================================================================

#[test]
fn test_graph_declarations_merge() {
    let unit = eval_ok("world w:\n    int a = 1\nworld w:\n    int b = 2\n");
    let worlds = residual(&unit, NodeKind::Decl(DeclKind::World));
    assert_eq!(worlds.len(), 1);
    assert_eq!(
        residual(&unit, NodeKind::Decl(DeclKind::Variable))
            .iter()
            .filter(|v| unit.ast.node(**v).owner == Some(worlds[0]))
            .count(),
        2
    );
}

#[test]
fn test_entities_expand_per_iteration() {
    let unit = eval_ok("$for $int i = 0; i < 2; i++:\n    entity e:\n        int a = 1\n");
    assert_eq!(residual(&unit, NodeKind::Decl(DeclKind::Entity)).len(), 2);
}

#[test]
fn test_references_point_into_the_residual_tree() {
    let unit = eval_ok("def int f(int a):\n    int b = a\n    return b\n");
    let param = residual(&unit, NodeKind::Decl(DeclKind::Parameter));
    assert_eq!(param.len(), 1);
    assert_eq!(unit.ast.node(initializer(&unit, "b")).rval, Some(param[0]));
}

#[test]
fn test_pointer_types_are_created_on_demand() {
    let unit = eval_ok("int# p\n");
    let var = residual(&unit, NodeKind::Decl(DeclKind::Variable))[0];
    let ty = unit.ast.node(var).ty.expect("type");
    assert_eq!(unit.ast.kind(ty), NodeKind::Decl(DeclKind::TypePointer));
    assert_eq!(unit.ast.tree_root(ty), unit.root);
}

#[test]
fn test_else_is_linked_in_the_residual_tree() {
    let unit = eval_ok("int x = 1\nif x:\n    x = 2\nelse:\n    x = 3\n");
    let ifs = residual(&unit, NodeKind::Stmt(StmtKind::If));
    let elses = residual(&unit, NodeKind::Stmt(StmtKind::Else));
    assert_eq!(unit.ast.node(ifs[0]).ctx_next, Some(elses[0]));
}

// ============================================================================
// Scope balance
// ============================================================================

/// Top-level fragments, some of which fail during evaluation; `{i}` keeps names unique per position.
fn fragment(choice: usize, i: usize) -> String {
    match choice {
        0 => format!("int v{i} = {i} * 2\n"),
        1 => format!("world w{i}:\n    $for $int e{i} = 0; e{i} < 2; e{i}++:\n        entity n{i}\n"),
        2 => format!("$for $int k{i} = 0; k{i} < 3; k{i}++:\n    $if k{i} > 1:\n        LOG(k{i})\n"),
        3 => format!("$def $expr g{i}($int n):\n    return n + 1\nint u{i} = g{i}(g{i}(1))\n"),
        4 => format!(
            "$def $loopstmt r{i}($int n):\n    $for $int j = 0; j < n; j++:\n        LOG(j)\n\
             def void p{i}():\n    r{i}(2)\n"
        ),
        5 => format!("$def $expr h{i}($int n):\n    return h{i}(n)\nint y{i} = h{i}(1)\n"),
        _ => format!("$double d{i} = 1 / 0\nLOG(d{i})\n"),
    }
}

proptest! {
    /// Property: evaluation leaves only the residual root open, whether or not members failed.
    #[test]
    fn scope_stack_is_balanced_after_evaluation(choices in prop::collection::vec(0usize..7, 0..8)) {
        let src: String = choices.iter().enumerate().map(|(i, c)| fragment(*c, i)).collect();
        let tokens = lexer::lex(&src).expect("lexes");
        let tree = structure::build(&tokens).expect("structures");
        let unit = SemanticParser::new(&Builtins::init_default())
            .parse(&tokens, &tree)
            .expect("parses");
        let mut evaluator = MetaEvaluator::new(unit, EvalConfig::default());
        let root = evaluator.semantic_root;
        evaluator.visit_members(root).expect("no internal error");
        prop_assert_eq!(evaluator.scopes.depth(), 1);
    }
}
