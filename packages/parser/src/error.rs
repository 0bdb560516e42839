//! Error types for the Trellis markup parser

use std::ops::Range;
use thiserror::Error;

/// Byte range in the source text
pub type Span = Range<usize>;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Why a piece of markup could not be turned into a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Unknown element: <{name}>")]
    UnknownElement { name: String, span: Span },

    #[error("Unclosed tag: <{name}>")]
    UnclosedTag { name: String, span: Span },

    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected closing tag: </{name}>")]
    UnexpectedClosingTag { name: String, span: Span },

    #[error("Unterminated tag")]
    UnterminatedTag { span: Span },

    #[error("Malformed tag: {message}")]
    MalformedTag { message: String, span: Span },

    #[error("No valid element found")]
    NoElement,

    #[error("Expected a single root element, found {count}")]
    MultipleRoots { count: usize },
}

impl ParseError {
    pub fn unknown_element(name: impl Into<String>, span: Span) -> Self {
        Self::UnknownElement {
            name: name.into(),
            span,
        }
    }

    pub fn unclosed_tag(name: impl Into<String>, span: Span) -> Self {
        Self::UnclosedTag {
            name: name.into(),
            span,
        }
    }

    pub fn malformed_tag(message: impl Into<String>, span: Span) -> Self {
        Self::MalformedTag {
            message: message.into(),
            span,
        }
    }

    /// Source location, when the error points at one
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnknownElement { span, .. }
            | ParseError::UnclosedTag { span, .. }
            | ParseError::MismatchedTag { span, .. }
            | ParseError::UnexpectedClosingTag { span, .. }
            | ParseError::UnterminatedTag { span }
            | ParseError::MalformedTag { span, .. } => Some(span.clone()),
            ParseError::EmptyInput | ParseError::NoElement | ParseError::MultipleRoots { .. } => {
                None
            }
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error.span().unwrap_or_else(|| {
        let end = source.len();
        end.saturating_sub(1)..end
    });

    let label = match error {
        ParseError::UnknownElement { .. } => "not an element or formatting tag".to_string(),
        ParseError::UnclosedTag { name, .. } => format!("expected a matching </{}>", name),
        ParseError::MismatchedTag { expected, .. } => format!("expected </{}>", expected),
        ParseError::UnexpectedClosingTag { .. } => "nothing open here".to_string(),
        ParseError::UnterminatedTag { .. } => "missing '>'".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ParseError::EmptyInput.to_string(), "Empty input");
        assert_eq!(
            ParseError::unknown_element("card", 0..6).to_string(),
            "Unknown element: <card>"
        );
        assert_eq!(
            ParseError::unclosed_tag("box", 0..5).to_string(),
            "Unclosed tag: <box>"
        );
        assert_eq!(ParseError::NoElement.to_string(), "No valid element found");
    }

    #[test]
    fn test_span() {
        assert_eq!(ParseError::unknown_element("x", 3..7).span(), Some(3..7));
        assert_eq!(ParseError::MultipleRoots { count: 2 }.span(), None);
    }

    #[cfg(feature = "pretty-errors")]
    #[test]
    fn test_format_error_mentions_message() {
        let source = "<box>\n  <card />\n</box>";
        let error = ParseError::unknown_element("card", 8..16);
        let report = format_error(source, "layout.tui", &error);
        assert!(report.contains("Unknown element: <card>"));
    }
}
