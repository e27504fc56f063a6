//! Error rendering using ariadne
//!
//! Evaluation errors are converted to a [`Diagnostic`] and printed with the
//! offending expression text underneath.

use crate::{Diagnostic, EvalError, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_NAME: &str = "<expression>";

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use reckon::{Engine, EngineOptions, render_error};
/// use reckon::source::Detached;
///
/// let mut engine = Engine::new(EngineOptions::default(), |_| {});
///
/// let source = "max(1 + 2";
/// if let Err(e) = engine.try_evaluate_in("", source, &Detached) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &EvalError, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    error: &EvalError,
    source: &str,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String (useful for logs and UIs)
pub fn render_error_to_string(error: &EvalError, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &EvalError, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &EvalError,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    render_diagnostic(source, &error.to_diagnostic(), writer, use_color)
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    let anchor = diag
        .labels
        .first()
        .map(|(span, _)| span.clone())
        .unwrap_or(0..0);
    let mut report = Report::build(kind, (SOURCE_NAME, anchor))
        .with_message(&diag.message)
        .with_code(diag.code)
        .with_config(ariadne::Config::default().with_color(use_color));

    for (span, note) in &diag.labels {
        let color = colors.next();
        report = report.with_label(
            Label::new((SOURCE_NAME, span.clone()))
                .with_message(note)
                .with_color(color),
        );
    }

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report
        .finish()
        .write((SOURCE_NAME, Source::from(source)), &mut *writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineOptions};
    use reckon_core::source::Detached;

    fn fail(source: &str) -> EvalError {
        Engine::new(EngineOptions::default(), |_| {})
            .try_evaluate_in("", source, &Detached)
            .unwrap_err()
    }

    #[test]
    fn test_renders_message_code_and_label() {
        let source = "1 + 2)";
        let rendered = render_error_to_string_no_color(&fail(source), source);
        assert!(rendered.contains("P001"), "{}", rendered);
        assert!(rendered.contains("unbalanced parentheses"), "{}", rendered);
        assert!(rendered.contains("closes nothing"), "{}", rendered);
        assert!(rendered.contains(source), "{}", rendered);
    }

    #[test]
    fn test_renders_every_residue() {
        let source = "1 ? 2 $";
        let rendered = render_error_to_string_no_color(&fail(source), source);
        assert_eq!(rendered.matches("not part of any token").count(), 2, "{}", rendered);
        assert!(rendered.contains("@(path) references"), "{}", rendered);
    }

    #[test]
    fn test_renders_errors_without_span() {
        let source = "1 2";
        let rendered = render_error_to_string_no_color(&fail(source), source);
        assert!(rendered.contains("2 values are not joined"), "{}", rendered);
    }
}
