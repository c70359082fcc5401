//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use crate::ast;
use crate::backend::Target;
use crate::builtins::Builtins;
use crate::pipeline::{Compiler, PipelineError, SourceFile};

use super::{CliError, CliResult, ExitCode, Settings, report};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// during compilation.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}

/// Replace every `${NAME}` placeholder with its definition.
pub fn apply_defines(content: &str, defines: &[(String, String)]) -> String {
    defines.iter().fold(content.to_string(), |text, (name, value)| {
        text.replace(&format!("${{{}}}", name), value)
    })
}

fn load(path: &Path, settings: &Settings) -> CliResult<SourceFile> {
    let content = read_source(path)?;
    Ok(SourceFile::new(
        path.to_string_lossy(),
        apply_defines(&content, &settings.defines),
    ))
}

/// Turn a pipeline failure into the rendered message the CLI prints.
fn report_failure(err: PipelineError, file: &SourceFile) -> CliError {
    let color = std::io::stderr().is_terminal();
    let mut message = String::new();
    for d in err.diagnostics() {
        message.push_str(&report::render(d, &file.content, color));
    }
    if message.is_empty() {
        message = format!("error: {}", err);
    }
    let exit_code = match err {
        PipelineError::Internal { .. } => ExitCode::INTERNAL,
        _ => ExitCode::FAILURE,
    };
    CliError::new(message.trim_end(), exit_code)
}

/// Tokenize and print the tokens.
pub fn lex_file(path: &Path, settings: &Settings) -> CliResult<ExitCode> {
    let file = load(path, settings)?;
    let builtins = Builtins::init_default();
    let mut compiler = Compiler::new(&builtins, settings.options.clone());
    let tokens = compiler.tokenize(&file).map_err(|e| report_failure(e, &file))?;
    for tok in &tokens {
        println!("{:?}", tok);
    }
    Ok(ExitCode::SUCCESS)
}

/// Build and print the block structure.
pub fn structure_file(path: &Path, settings: &Settings) -> CliResult<ExitCode> {
    let file = load(path, settings)?;
    let builtins = Builtins::init_default();
    let mut compiler = Compiler::new(&builtins, settings.options.clone());
    let tokens = compiler.tokenize(&file).map_err(|e| report_failure(e, &file))?;
    let tree = compiler
        .parse_structure(&file, &tokens)
        .map_err(|e| report_failure(e, &file))?;
    print!("{}", tree.dump(&tokens));
    Ok(ExitCode::SUCCESS)
}

/// Parse and print the semantic tree.
pub fn parse_file(path: &Path, settings: &Settings) -> CliResult<ExitCode> {
    let file = load(path, settings)?;
    let builtins = Builtins::init_default();
    let mut compiler = Compiler::new(&builtins, settings.options.clone());
    let tokens = compiler.tokenize(&file).map_err(|e| report_failure(e, &file))?;
    let tree = compiler
        .parse_structure(&file, &tokens)
        .map_err(|e| report_failure(e, &file))?;
    let unit = compiler
        .parse(&file, &tokens, &tree)
        .map_err(|e| report_failure(e, &file))?;
    print!("{}", ast::dump(&unit.ast, unit.root));
    Ok(ExitCode::SUCCESS)
}

/// Evaluate the compile-time layer and print the residual tree.
pub fn meta_file(path: &Path, settings: &Settings) -> CliResult<ExitCode> {
    let file = load(path, settings)?;
    let builtins = Builtins::init_default();
    let mut compiler = Compiler::new(&builtins, settings.options.clone());
    let unit = check(&mut compiler, &file)?;
    print!("{}", ast::dump(&unit.ast, unit.root));
    Ok(ExitCode::SUCCESS)
}

/// Run every stage except export.
pub fn check_file(path: &Path, settings: &Settings) -> CliResult<ExitCode> {
    let file = load(path, settings)?;
    let builtins = Builtins::init_default();
    let mut compiler = Compiler::new(&builtins, settings.options.clone());
    check(&mut compiler, &file)?;
    tracing::info!(file = %file.path, "check passed");
    Ok(ExitCode::SUCCESS)
}

fn check(compiler: &mut Compiler<'_>, file: &SourceFile) -> CliResult<crate::meta::ResolvedUnit> {
    let tokens = compiler.tokenize(file).map_err(|e| report_failure(e, file))?;
    let tree = compiler
        .parse_structure(file, &tokens)
        .map_err(|e| report_failure(e, file))?;
    let unit = compiler
        .parse(file, &tokens, &tree)
        .map_err(|e| report_failure(e, file))?;
    compiler.run_meta(file, unit).map_err(|e| report_failure(e, file))
}

/// Compile and write the exported text to `output`, or stdout.
pub fn build_file(path: &Path, output: Option<&Path>, target: Target, settings: &Settings) -> CliResult<ExitCode> {
    let file = load(path, settings)?;
    let builtins = Builtins::init_default();
    let mut compiler = Compiler::new(&builtins, settings.options.clone().with_target(target));
    let text = compiler
        .compile(&file.content, &file.path, target)
        .map_err(|e| report_failure(e, &file))?;
    match output {
        Some(out) => {
            fs::write(out, &text)
                .map_err(|e| CliError::failure(format!("Error writing '{}': {}", out.display(), e)))?;
            tracing::info!(output = %out.display(), bytes = text.len(), "wrote output");
        }
        None => print!("{}", text),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("eon_cli_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_apply_defines() {
        let defines = vec![("N".to_string(), "3".to_string())];
        assert_eq!(apply_defines("$int n = ${N}\nLOG(${N})\n", &defines), "$int n = 3\nLOG(3)\n");
        assert_eq!(apply_defines("LOG(${M})", &defines), "LOG(${M})");
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/nonexistent/eon/file.eon")).unwrap_err();
        assert!(err.message.contains("Cannot access file"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_build_writes_output() {
        let src = write_temp("build.eon", "$for $int i = 0; i < ${N}; i++:\n    LOG(i)\n");
        let out = src.with_extension("cpp");
        let settings = Settings {
            defines: vec![("N".to_string(), "2".to_string())],
            ..Settings::default()
        };
        build_file(&src, Some(&out), Target::Cpp, &settings).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "LOG(0);\nLOG(1);\n");
    }

    #[test]
    fn test_check_reports_rendered_diagnostics() {
        let src = write_temp("broken.eon", "int x = y\n");
        let err = check_file(&src, &Settings::default()).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("declaration not found"));
    }
}
