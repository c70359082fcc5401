//! Diagnostic rendering with source context.

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, MietteDiagnostic, NamedSource, Report};

use eon_syntax::diagnostics::{ErrorKind, Severity};

use crate::pipeline::Diagnostic;

/// Render `diagnostic` against the source it was reported in.
pub fn render(diagnostic: &Diagnostic, source: &str, color: bool) -> String {
    let start = diagnostic.span.start.min(source.len());
    let end = diagnostic.span.end.clamp(start, source.len());

    let mut report = MietteDiagnostic::new(diagnostic.message.clone())
        .with_code(format!("eon::{}", code(diagnostic.kind)))
        .with_severity(match diagnostic.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
        .with_label(LabeledSpan::at(start..end, diagnostic.kind.to_string()));
    let help: Vec<String> = diagnostic
        .notes
        .iter()
        .map(|n| format!("note: {}", n))
        .chain(diagnostic.hints.iter().cloned())
        .collect();
    if !help.is_empty() {
        report = report.with_help(help.join("\n"));
    }

    let report =
        Report::new(report).with_source_code(NamedSource::new(&diagnostic.location.file, source.to_string()));
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let mut out = String::new();
    if GraphicalReportHandler::new_themed(theme)
        .render_report(&mut out, report.as_ref())
        .is_err()
    {
        // Fall back to the one-line form.
        return format!("{}\n", diagnostic);
    }
    out
}

fn code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Syntax => "syntax",
        ErrorKind::Structure => "structure",
        ErrorKind::Resolution => "resolution",
        ErrorKind::Redeclaration => "redeclaration",
        ErrorKind::Evaluation => "evaluation",
        ErrorKind::Unsupported => "unsupported",
        ErrorKind::Internal => "internal",
        ErrorKind::Warning => "warning",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eon_syntax::diagnostics::CompileError;
    use eon_syntax::span::Span;

    #[test]
    fn test_render_names_file_code_and_hint() {
        let source = "int x = y\n";
        let err = CompileError::resolution("declaration not found: 'y'", Span::new(8, 9)).with_hint("declare 'y' first");
        let d = Diagnostic::from_error(&err, "main.eon", source);
        let text = render(&d, source, false);
        assert!(text.contains("eon::resolution"));
        assert!(text.contains("declaration not found: 'y'"));
        assert!(text.contains("main.eon"));
        assert!(text.contains("declare 'y' first"));
    }

    #[test]
    fn test_span_past_the_end_is_clamped() {
        let err = CompileError::structure("unexpected end of input", Span::new(40, 50));
        let d = Diagnostic::from_error(&err, "short.eon", "int x\n");
        let text = render(&d, "int x\n", false);
        assert!(text.contains("unexpected end of input"));
    }
}
