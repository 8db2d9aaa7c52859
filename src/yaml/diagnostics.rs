//! Diagnostics for broken inventory, usage and config files
//!
//! Parse failures point at the offending line of the file and, where the
//! parser message is recognisable, say which field rule was broken.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A YAML file that could not be read into scaf's data types
#[derive(Debug, Error, Diagnostic)]
#[error("cannot read {file}: {reason}")]
#[diagnostic(code(scaf::yaml::parse))]
pub struct YamlParseError {
    file: String,

    reason: String,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    hint: Option<&'static str>,
}

impl YamlParseError {
    pub fn new(err: &serde_yml::Error, source: &str, file: &str) -> Self {
        let offset = err
            .location()
            .map_or(0, |loc| byte_offset(source, loc.line(), loc.column()));
        let reason = err.to_string();

        Self {
            file: file.to_string(),
            hint: hint_for(&reason),
            reason,
            src: NamedSource::new(file, source.to_string()),
            span: SourceSpan::from(offset..offset),
        }
    }

    /// Parser message without the file name
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failures reading or writing project YAML files
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] YamlParseError),

    #[error("file access failed: {0}")]
    #[diagnostic(code(scaf::yaml::io))]
    Io(#[from] std::io::Error),

    #[error("failed to serialize YAML: {0}")]
    #[diagnostic(code(scaf::yaml::serialize))]
    Serialize(String),
}

/// Byte offset of a 1-based line/column, clamped to the source length
fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let within = source[line_start.min(source.len())..]
        .char_indices()
        .nth(column.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    (line_start + within).min(source.len())
}

/// Field rules of the parts, withdrawals and config files
const HINTS: &[(&[&str], &str)] = &[
    (
        &["tab"],
        "indent with spaces; tabs are not valid YAML indentation",
    ),
    (
        &["missing field `id`", "missing field `name`"],
        "every part needs an `id` and a `name`",
    ),
    (
        &["missing field `part_id`", "missing field `date`"],
        "withdrawals need `id`, `part_id`, `part_name`, `quantity` and `date`; record them with 'scaf withdraw new'",
    ),
    (
        &["expected u32", "integer `-"],
        "ids and quantities are whole numbers of zero or more (e.g. quantity: 12)",
    ),
    (
        &["expected f64"],
        "dimensions and weights are plain numbers in meters and kilograms (e.g. length: 2.07)",
    ),
    (
        &["input contains invalid characters", "premature end of input"],
        "dates use RFC 3339, e.g. 2024-05-02T08:30:00Z",
    ),
    (
        &["duplicate"],
        "a key appears twice in the same entry; keep one",
    ),
];

fn hint_for(reason: &str) -> Option<&'static str> {
    let lower = reason.to_lowercase();
    HINTS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, hint)| *hint)
}
