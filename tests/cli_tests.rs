//! Command line behavior, driven through `execute` so exit codes can be checked.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eon::cli::{Cli, ExitCode, execute};

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eon_cli_tests_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> Result<ExitCode, eon::cli::CliError> {
    let mut argv = vec!["eon"];
    argv.extend_from_slice(args);
    execute(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn build_writes_cpp_to_the_output_file() {
    let src = temp_file("graph.eon", "$for $int i = 0; i < 2; i++:\n    LOG(i)\n");
    let out = src.with_file_name("graph.cpp");
    let code = run(&["build", src.to_str().unwrap(), "-o", out.to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(fs::read_to_string(&out).unwrap(), "LOG(0);\nLOG(1);\n");
}

#[test]
fn build_with_ast_target_writes_the_residual_tree() {
    let src = temp_file("dump.eon", "int x = 2 * 3\n");
    let out = src.with_file_name("dump.ast.txt");
    run(&["build", src.to_str().unwrap(), "--target", "ast", "-o", out.to_str().unwrap()]).unwrap();
    let dump = fs::read_to_string(&out).unwrap();
    assert!(dump.contains("decl.variable x : int"));
    assert!(dump.contains("lit.double = 6"));
}

#[test]
fn defines_fill_placeholders() {
    let src = temp_file("defines.eon", "$for $int i = 0; i < ${N}; i++:\n    LOG(i)\n");
    let out = src.with_file_name("defines.cpp");
    run(&["build", src.to_str().unwrap(), "-D", "N=3", "-o", out.to_str().unwrap()]).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "LOG(0);\nLOG(1);\nLOG(2);\n");
}

#[test]
fn check_failure_carries_the_rendered_diagnostic() {
    let src = temp_file("broken.eon", "int x = nothing\n");
    let err = run(&["check", src.to_str().unwrap()]).unwrap_err();
    assert_eq!(err.exit_code, ExitCode::FAILURE);
    assert!(err.message.contains("declaration not found: 'nothing'"));
    assert!(err.message.contains("broken.eon"));
}

#[test]
fn iteration_limit_flag_stops_runaway_loops() {
    let src = temp_file("loop.eon", "$for $int i = 0; i < 100; i++:\n    LOG(i)\n");
    let err = run(&["check", src.to_str().unwrap(), "--max-meta-iterations", "5"]).unwrap_err();
    assert!(err.message.contains("exceeded 5 iterations"));
}

#[test]
fn missing_input_is_a_failure() {
    let err = run(&["check", "/nonexistent/eon/input.eon"]).unwrap_err();
    assert_eq!(err.exit_code, ExitCode::FAILURE);
    assert!(err.message.contains("Cannot access file"));
}

#[test]
fn debug_flags_stop_early() {
    let src = temp_file("debug.eon", "int x = 1\n");
    for flag in ["--lex", "--structure", "--parse", "--meta"] {
        assert_eq!(run(&[flag, src.to_str().unwrap()]).unwrap(), ExitCode::SUCCESS, "{}", flag);
    }
}
