//! Error types for formula parsing and evaluation
//!
//! Formula failures are never fatal: the engine logs them per formula and
//! moves on. Parse errors keep their source span so the log line can carry
//! an ariadne-rendered excerpt of the offending expression.

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use super::lexer::Span;

#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("parse error at {span:?}: {message}")]
    Parse {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("evaluation error: {0}")]
    Eval(String),
}

impl FormulaError {
    pub fn eval(message: impl Into<String>) -> Self {
        Self::Eval(message.into())
    }

    /// Render the error with source context; parse errors get an ariadne
    /// report, evaluation errors fall back to the plain message.
    pub fn format(&self, source: &str, origin: &str) -> String {
        match self {
            FormulaError::Parse {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let mut buf = Vec::new();
                let write_result = Report::build(ReportKind::Error, origin, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((origin, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((origin, Source::from(source)), &mut buf);
                match write_result {
                    Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
                    Err(_) => self.to_string(),
                }
            }
            FormulaError::Eval(_) => self.to_string(),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, super::lexer::Token>> for FormulaError {
    fn from(err: chumsky::error::Rich<'a, super::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Unexpected {:?}", tok),
                None => "Unexpected end of formula".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format!("{:?}", tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of formula".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        FormulaError::Parse {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}
