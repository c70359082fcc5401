//! CLI module for the Eon compiler
//!
//! ## Commands
//!
//! - `build <file>` - Compile and write the exported text (stdout unless `-o` is given)
//! - `check <file>` - Run every stage up to compile-time evaluation without exporting
//!
//! ## Debug flags
//!
//! `--lex`, `--structure`, `--parse` and `--meta` stop after the named stage and print its result.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
mod report;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::backend::Target;
use crate::pipeline::CompileOptions;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The compiler broke one of its own invariants.
    pub const INTERNAL: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Compiler for the Eon graph description language
#[derive(Parser, Debug)]
#[command(name = "eon")]
#[command(version = VERSION)]
#[command(about = "Compiler for the Eon graph description language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Debug/development flags
    /// Tokenize only (debug)
    #[arg(long = "lex", value_name = "FILE")]
    pub lex_file: Option<PathBuf>,

    /// Build the block structure only (debug)
    #[arg(long = "structure", value_name = "FILE")]
    pub structure_file: Option<PathBuf>,

    /// Print the semantic tree (debug)
    #[arg(long = "parse", value_name = "FILE")]
    pub parse_file: Option<PathBuf>,

    /// Print the tree left after compile-time evaluation (debug)
    #[arg(long = "meta", value_name = "FILE")]
    pub meta_file: Option<PathBuf>,

    /// Replace `${NAME}` in the source with VALUE before compiling
    #[arg(long = "define", short = 'D', value_name = "NAME=VALUE", value_parser = parse_define, global = true)]
    pub defines: Vec<(String, String)>,

    /// Fail when a `$for` loop runs more than N iterations
    #[arg(long = "max-meta-iterations", value_name = "N", global = true)]
    pub max_meta_iterations: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a source file
    Build {
        /// Source file to compile
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short = 'o', long = "output", value_name = "OUT")]
        output: Option<PathBuf>,
        /// Output language
        #[arg(long, value_enum, default_value_t = TargetArg::Cpp)]
        target: TargetArg,
    },

    /// Check a source file without exporting it
    Check {
        /// Source file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// `--target` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// C-like source
    Cpp,
    /// Dump of the tree left after compile-time evaluation
    Ast,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Cpp => Target::Cpp,
            TargetArg::Ast => Target::AstDump,
        }
    }
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(format!("expected NAME=VALUE, found '{}'", raw));
    };
    if name.is_empty() {
        return Err("the name of a definition cannot be empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub defines: Vec<(String, String)>,
    pub options: CompileOptions,
}

impl Settings {
    fn from_cli(cli: &Cli) -> Self {
        let mut options = CompileOptions::new();
        if let Some(max) = cli.max_meta_iterations {
            options = options.with_max_meta_iterations(max);
        }
        Self {
            defines: cli.defines.clone(),
            options,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let settings = Settings::from_cli(&cli);

    // Handle debug flags first
    if let Some(file) = &cli.lex_file {
        return commands::lex_file(file, &settings);
    }
    if let Some(file) = &cli.structure_file {
        return commands::structure_file(file, &settings);
    }
    if let Some(file) = &cli.parse_file {
        return commands::parse_file(file, &settings);
    }
    if let Some(file) = &cli.meta_file {
        return commands::meta_file(file, &settings);
    }

    match cli.command {
        Some(Command::Build { file, output, target }) => {
            commands::build_file(&file, output.as_deref(), target.into(), &settings)
        }
        Some(Command::Check { file }) => commands::check_file(&file, &settings),
        None => Err(CliError::failure("no command given; try 'eon --help'")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build() {
        let cli = Cli::try_parse_from(["eon", "build", "graph.eon"]).unwrap();
        if let Some(Command::Build { file, output, target }) = cli.command {
            assert_eq!(file, PathBuf::from("graph.eon"));
            assert!(output.is_none());
            assert_eq!(target, TargetArg::Cpp);
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_parse_build_with_output_and_target() {
        let cli = Cli::try_parse_from(["eon", "build", "graph.eon", "-o", "out.cpp", "--target", "ast"]).unwrap();
        if let Some(Command::Build { output, target, .. }) = cli.command {
            assert_eq!(output, Some(PathBuf::from("out.cpp")));
            assert_eq!(Target::from(target), Target::AstDump);
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["eon", "check", "graph.eon"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check { .. })));
    }

    #[test]
    fn test_cli_parse_debug_flags() {
        let cli = Cli::try_parse_from(["eon", "--lex", "a.eon"]).unwrap();
        assert!(cli.lex_file.is_some());

        let cli = Cli::try_parse_from(["eon", "--structure", "a.eon"]).unwrap();
        assert!(cli.structure_file.is_some());

        let cli = Cli::try_parse_from(["eon", "--parse", "a.eon"]).unwrap();
        assert!(cli.parse_file.is_some());

        let cli = Cli::try_parse_from(["eon", "--meta", "a.eon"]).unwrap();
        assert!(cli.meta_file.is_some());
    }

    #[test]
    fn test_cli_parse_defines() {
        let cli = Cli::try_parse_from(["eon", "build", "a.eon", "--define", "N=3", "-D", "NAME=a=b"]).unwrap();
        assert_eq!(
            cli.defines,
            vec![("N".to_string(), "3".to_string()), ("NAME".to_string(), "a=b".to_string())]
        );
    }

    #[test]
    fn test_cli_rejects_malformed_define() {
        assert!(Cli::try_parse_from(["eon", "build", "a.eon", "--define", "N"]).is_err());
        assert!(Cli::try_parse_from(["eon", "build", "a.eon", "--define", "=3"]).is_err());
    }

    #[test]
    fn test_max_meta_iterations_reaches_options() {
        let cli = Cli::try_parse_from(["eon", "check", "a.eon", "--max-meta-iterations", "10"]).unwrap();
        let settings = Settings::from_cli(&cli);
        assert_eq!(settings.options.eval.max_meta_iterations, Some(10));
    }

    #[test]
    fn test_no_command_is_an_error() {
        let cli = Cli::try_parse_from(["eon"]).unwrap();
        let err = execute(cli).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }
}
