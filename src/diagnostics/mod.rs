//! Error reports rendered against the input document

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::ops::Range;

use crate::parser::ParseError;

/// Byte offset of a 1-based line/column position
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

/// Span in `source` the error points at, when one is known
pub fn error_span(error: &ParseError, source: &str) -> Option<Range<usize>> {
    match error {
        ParseError::Json(e) if e.line() > 0 => {
            let start = offset_of(source, e.line(), e.column());
            Some(start..(start + 1).min(source.len()))
        }
        _ => None,
    }
}

fn build<'a>(
    error: &ParseError,
    name: &'a str,
    source: &str,
    color: bool,
) -> Report<'a, (&'a str, Range<usize>)> {
    let (span, label) = match error_span(error, source) {
        Some(span) => (span, "here"),
        None => (0..source.len().min(1), "in this document"),
    };

    let report = Report::build(ReportKind::Error, name, span.start)
        .with_config(Config::default().with_color(color))
        .with_message(error.to_string())
        .with_label(
            Label::new((name, span))
                .with_message(label)
                .with_color(Color::Red),
        );

    let report = match error {
        ParseError::Schema { .. } => report.with_note(
            "the document must be a list whose first entry has `tool`, `start_pos`, `start_dir` and `path`",
        ),
        ParseError::Format { .. } => {
            report.with_note("arc positions are `[x, y, z]` or `[x, y, z, i, j, k]`")
        }
        _ => report,
    };
    report.finish()
}

/// Write a report for `error` to stderr
pub fn eprint(error: &ParseError, name: &str, source: &str) -> std::io::Result<()> {
    build(error, name, source, true).eprint((name, Source::from(source)))
}

/// Render a report for `error` without colors
pub fn render(error: &ParseError, name: &str, source: &str) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    build(error, name, source, false)
        .write((name, Source::from(source)), &mut buffer)
        .ok();
    String::from_utf8_lossy(&buffer).into_owned()
}
