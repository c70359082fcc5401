//! End-to-end tests: source text in, exported text or diagnostics out.

use eon::pipeline::Stage;
use eon::{Builtins, CompileOptions, Compiler, PipelineError, Target};

fn compile(src: &str, target: Target) -> Result<String, PipelineError> {
    let builtins = Builtins::init_default();
    Compiler::new(&builtins, CompileOptions::default()).compile(src, "test.eon", target)
}

fn cpp(src: &str) -> String {
    match compile(src, Target::Cpp) {
        Ok(text) => text,
        Err(err) => panic!("compile failed: {} {:?}", err, err.diagnostics()),
    }
}

fn ast(src: &str) -> String {
    match compile(src, Target::AstDump) {
        Ok(text) => text,
        Err(err) => panic!("compile failed: {} {:?}", err, err.diagnostics()),
    }
}

// ============================================================================
// Compile-time layer
// ============================================================================

#[test]
fn meta_counter_unrolls_into_literal_statements() {
    let text = cpp("$for $int i = 0; i < 3; i++:\n    LOG(i)\n");
    assert_eq!(text, "LOG(0);\nLOG(1);\nLOG(2);\n");
}

#[test]
fn meta_if_picks_the_same_branch_every_time() {
    let src = "$int n = 3\n$if n > 2:\n    LOG(1)\n$else:\n    LOG(2)\n";
    let first = cpp(src);
    assert_eq!(first, "LOG(1);\n");
    assert_eq!(cpp(src), first);
}

#[test]
fn meta_variables_are_gone_from_the_output() {
    let dump = ast("$int n = 2\nint x = n * 3\n");
    assert!(!dump.contains("meta."));
    assert!(dump.contains("lit.double = 6"));
}

#[test]
fn generated_functions_from_loopstmt() {
    let src = "\
$def $loopstmt log_range($int n):
    $for $int k = 0; k < n; k++:
        LOG(k)
def void run():
    log_range(3)
";
    assert_eq!(cpp(src), "void run() {\n\tLOG(0);\n\tLOG(1);\n\tLOG(2);\n}\n");
}

#[test]
fn nested_expr_calls_fold() {
    let src = "\
$def $expr sq($int v):
    return v * v
$def $expr sum_sq($int a, $int b):
    return sq(a) + sq(b)
int r = sum_sq(3, 4)
";
    assert_eq!(cpp(src), "int r = 25;\n");
}

#[test]
fn meta_string_selects_field() {
    let src = "\
$string field = \"speed\"
double cfg.speed = 2.5
double cfg.mass = 1
double v = cfg.$field
";
    assert_eq!(
        cpp(src),
        "double cfg_speed = 2.5;\ndouble cfg_mass = 1;\ndouble v = cfg_speed;\n"
    );
}

#[test]
fn placeholders_are_substituted_by_the_caller() {
    let raw = "$int n = ${COUNT}\n$for $int i = 0; i < n; i++:\n    LOG(i)\n";
    let src = raw.replace("${COUNT}", "2");
    assert_eq!(cpp(&src), "LOG(0);\nLOG(1);\n");
}

// ============================================================================
// Runtime code
// ============================================================================

#[test]
fn runtime_program_round_trips_to_cpp() {
    let src = "\
int limit = 10
def int clamp(int v):
    if v > limit:
        return limit
    else:
        return v
def void main():
    for int i = 0; i < 3; i++:
        LOG(clamp(i * 5))
";
    insta::assert_snapshot!(cpp(src).replace('\t', "    "), @r"
    int limit = 10;
    int clamp(int v) {
        if (v > limit) {
            return limit;
        } else {
            return v;
        }
    }
    void main() {
        for (int i = 0; i < 3; i++) {
            LOG(clamp(i * 5));
        }
    }
    ");
}

#[test]
fn graph_declarations_merge_and_stay_compile_time_only() {
    let src = "world app:\n    system phys\nworld app:\n    system render\nint x = 1\n";
    assert_eq!(cpp(src), "int x = 1;\n");
    let dump = ast(src);
    assert_eq!(dump.matches("decl.world app").count(), 1);
    assert!(dump.contains("decl.system phys"));
    assert!(dump.contains("decl.system render"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn failed_compile_yields_diagnostics_and_no_text() {
    let err = compile("int a = 1\nint b = missing\n", Target::Cpp).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Parse));
    let d = &err.diagnostics()[0];
    assert_eq!(d.message, "declaration not found: 'missing'");
    assert_eq!((d.location.line, d.location.col), (2, 9));
}

#[test]
fn conflicting_redeclaration_is_reported() {
    let err = compile("world a\nclass a\n", Target::Cpp).unwrap_err();
    assert!(!err.diagnostics().is_empty());
}

#[test]
fn unsupported_forms_fail_at_export() {
    for src in [
        "int x = 1\nwhile x:\n    x--\n",
        "int x = 1\ndo while x:\n    x--\n",
        "int x = 1\nswitch x:\n    LOG(x)\n",
    ] {
        let err = compile(src, Target::Cpp).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Export), "{}", src);
    }
}

#[test]
fn ast_target_accepts_forms_cpp_cannot_render() {
    let dump = ast("int x = 1\nwhile x:\n    x--\n");
    assert!(dump.contains("stmt.while"));
}
