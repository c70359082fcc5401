use eon_syntax::diagnostics::{CompileError, ErrorKind};
use eon_syntax::{lexer, structure};

use super::{ExportConfig, ExportError, Target, export};
use crate::ast;
use crate::builtins::Builtins;
use crate::frontend::semantic::SemanticParser;
use crate::meta::{EvalConfig, MetaEvaluator, ResolvedUnit};

fn resolve(src: &str) -> ResolvedUnit {
    let tokens = lexer::lex(src).expect("lexes");
    let tree = structure::build(&tokens).expect("structures");
    let unit = SemanticParser::new(&Builtins::init_default())
        .parse(&tokens, &tree)
        .expect("parses");
    MetaEvaluator::new(unit, EvalConfig::default())
        .run()
        .expect("evaluates")
}

fn cpp_with(src: &str, config: &ExportConfig) -> Result<String, ExportError> {
    export(&resolve(src), Target::Cpp, config)
}

fn cpp(src: &str) -> String {
    match cpp_with(src, &ExportConfig::default()) {
        Ok(text) => text,
        Err(err) => panic!("export failed: {}", err),
    }
}

// ============================================================================
// Compile-time expansion
// ============================================================================

#[test]
fn test_meta_for_exports_one_statement_per_iteration() {
    assert_eq!(cpp("$for $int i = 0; i < 3; i++:\n    LOG(i)\n"), "LOG(0);\nLOG(1);\nLOG(2);\n");
}

#[test]
fn test_meta_if_exports_only_the_taken_branch() {
    let src = "$bool on = true\n$if on:\n    LOG(\"yes\")\n$else:\n    LOG(\"no\")\n";
    assert_eq!(cpp(src), "LOG(\"yes\");\n");
}

#[test]
fn test_loopstmt_call_is_written_inline() {
    let src = "$def $loopstmt both():\n    LOG(1)\n    LOG(2)\ndef void f():\n    both()\n";
    assert_eq!(cpp(src), "void f() {\n\tLOG(1);\n\tLOG(2);\n}\n");
}

#[test]
fn test_void_call_leaves_no_statement() {
    let src = "$int n = 0\n$def $void bump():\n    n++\nbump()\nint x = n\n";
    assert_eq!(cpp(src), "int x = 1;\n");
}

#[test]
fn test_expr_call_is_replaced_by_its_value() {
    let src = "$def $expr twice($int v):\n    return v * 2\nLOG(twice(4))\n";
    assert_eq!(cpp(src), "LOG(8);\n");
}

#[test]
fn test_folded_values() {
    assert_eq!(cpp("double a = 2 + 3 * 4\ndouble b = 5 / 2\n"), "double a = 14;\ndouble b = 2.5;\n");
}

#[test]
fn test_division_by_zero_is_left_unfolded() {
    assert_eq!(cpp("LOG(1 / 0)\n"), "LOG(1 / 0);\n");
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_constructor_forms() {
    assert_eq!(cpp("int x = 5\nint y(1, 2)\nint z\n"), "int x = 5;\nint y(1, 2);\nint z;\n");
}

#[test]
fn test_function_definition_and_prototype() {
    assert_eq!(
        cpp("def int f(int a)\ndef int add(int a, int b):\n    return a + b\n"),
        "int f(int a);\nint add(int a, int b) {\n\treturn a + b;\n}\n"
    );
}

#[test]
fn test_return_without_value() {
    assert_eq!(cpp("def void f():\n    return\n"), "void f() {\n\treturn;\n}\n");
}

#[test]
fn test_dotted_names_are_joined() {
    assert_eq!(cpp("int cfg.x = 1\nint y = cfg.x\n"), "int cfg_x = 1;\nint y = cfg_x;\n");
}

#[test]
fn test_class_members_are_prefixed() {
    assert_eq!(cpp("class Vec:\n    int x = 1\nint y = Vec.x\n"), "int Vec_x = 1;\nint y = Vec_x;\n");
}

#[test]
fn test_pointer_and_reference_types() {
    assert_eq!(cpp("int# p\n"), "int* p;\n");
    assert_eq!(cpp("int x = 1\nint& r = x\n"), "int x = 1;\nint& r = x;\n");
}

#[test]
fn test_graph_declarations_are_not_exported() {
    assert_eq!(cpp("world w:\n    int a = 1\nint b = 2\n"), "int b = 2;\n");
}

// ============================================================================
// Statements and expressions
// ============================================================================

#[test]
fn test_nested_operators_are_parenthesized() {
    assert_eq!(cpp("int a = 1\nint b = a + 2 * a\n"), "int a = 1;\nint b = a + (2 * a);\n");
    assert_eq!(cpp("int a = 1\na = a - 1\n"), "int a = 1;\na = a - 1;\n");
}

#[test]
fn test_if_else() {
    let config = ExportConfig::new().with_indent_width(4);
    let text = cpp_with("int x = 1\nif x > 0:\n    x = 2\nelse:\n    x = 3\n", &config).expect("exports");
    insta::assert_snapshot!(text, @r"
    int x = 1;
    if (x > 0) {
        x = 2;
    } else {
        x = 3;
    }
    ");
}

#[test]
fn test_else_if_chain() {
    let config = ExportConfig::new().with_indent_width(4);
    let src = "int x = 1\nif x > 3:\n    x = 2\nelse if x > 2:\n    x = 3\nelse:\n    x = 4\n";
    let text = cpp_with(src, &config).expect("exports");
    insta::assert_snapshot!(text, @r"
    int x = 1;
    if (x > 3) {
        x = 2;
    } else {
        if (x > 2) {
            x = 3;
        } else {
            x = 4;
        }
    }
    ");
}

#[test]
fn test_runtime_for() {
    assert_eq!(
        cpp("for int i = 0; i < 3; i++:\n    LOG(i)\n"),
        "for (int i = 0; i < 3; i++) {\n\tLOG(i);\n}\n"
    );
}

#[test]
fn test_string_literals_are_escaped() {
    assert_eq!(cpp("LOG(\"a\\tb\")\n"), "LOG(\"a\\tb\");\n");
}

#[test]
fn test_while_is_reported_as_unsupported() {
    let err = cpp_with("int x = 1\nwhile x:\n    x--\n", &ExportConfig::default()).unwrap_err();
    assert!(matches!(err, ExportError::Unsupported { form: "'while' loop", .. }));
    assert_eq!(err.to_string(), "'while' loop cannot be exported yet");

    let diagnostic = CompileError::from(err);
    assert_eq!(diagnostic.kind, ErrorKind::Unsupported);
}

// ============================================================================
// Configuration and targets
// ============================================================================

#[test]
fn test_indent_and_trailing_newline_policy() {
    let config = ExportConfig::new().with_indent_width(2).with_trailing_newline(false);
    let text = cpp_with("def void f():\n    LOG(1)\n", &config).expect("exports");
    assert_eq!(text, "void f() {\n  LOG(1);\n}");
}

#[test]
fn test_blank_lines_between_functions() {
    let config = ExportConfig::new().with_blank_lines_between_functions(1);
    let text = cpp_with("def void f():\n    LOG(1)\ndef void g():\n    LOG(2)\n", &config).expect("exports");
    assert_eq!(text, "void f() {\n\tLOG(1);\n}\n\nvoid g() {\n\tLOG(2);\n}\n");
}

#[test]
fn test_ast_dump_target() {
    let unit = resolve("int x = 1\n");
    let text = export(&unit, Target::AstDump, &ExportConfig::default()).expect("exports");
    assert_eq!(text, ast::dump(&unit.ast, unit.root));
}

#[test]
fn test_target_names() {
    assert_eq!(Target::default(), Target::Cpp);
    assert_eq!(Target::Cpp.to_string(), "cpp");
    assert_eq!(Target::AstDump.extension(), "ast.txt");
}
