//! Error types for the markup parser

use crate::ast::RootKind;
use std::ops::Range;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Reasons generator output could not be turned into a tree.
///
/// Spans are byte ranges into the sanitized text handed to the tree builder
/// (see [`crate::sanitize`]), not into the raw generator output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Input is empty")]
    Empty,

    #[error("No <{expected}> element found in input")]
    MissingRoot { expected: RootKind },

    #[error("Expected a <{expected}> root, found <{found}>")]
    UnexpectedRoot {
        span: Range<usize>,
        expected: RootKind,
        found: String,
    },

    #[error("Mismatched closing tag at {span:?}: expected </{expected}>, found </{found}>")]
    MismatchedClose {
        span: Range<usize>,
        expected: String,
        found: String,
    },

    #[error("Closing tag </{found}> at {span:?} has no open element")]
    UnexpectedClose { span: Range<usize>, found: String },

    #[error("Element <{name}> opened at {span:?} is never closed")]
    Unclosed { span: Range<usize>, name: String },

    #[error("Text outside the root element at {span:?}")]
    StrayText { span: Range<usize> },

    #[error("Second root element at {span:?}")]
    MultipleRoots { span: Range<usize> },
}

impl ParseError {
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::Empty | ParseError::MissingRoot { .. } => None,
            ParseError::UnexpectedRoot { span, .. }
            | ParseError::MismatchedClose { span, .. }
            | ParseError::UnexpectedClose { span, .. }
            | ParseError::Unclosed { span, .. }
            | ParseError::StrayText { span }
            | ParseError::MultipleRoots { span } => Some(span.clone()),
        }
    }

    /// Whether the failure looks like truncated output, the case the
    /// repair pass is able to fix.
    pub fn is_truncation(&self) -> bool {
        matches!(self, ParseError::Unclosed { .. })
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error
        .span()
        .unwrap_or(source.len().saturating_sub(1)..source.len());

    let label = match error {
        ParseError::MismatchedClose { expected, .. } => format!("expected </{}>", expected),
        ParseError::Unclosed { name, .. } => format!("<{}> opened here", name),
        ParseError::UnexpectedRoot { expected, .. } => format!("expected <{}>", expected),
        other => other.to_string(),
    };

    let report = Report::build(ReportKind::Error, filename, span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, span))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish();

    let mut output = Vec::new();
    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}
