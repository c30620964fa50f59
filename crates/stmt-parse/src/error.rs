use thiserror::Error;

use stmt_ingest::IngestError;
use stmt_model::ModelError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("no parser settings configured")]
    NoParserSettings,

    #[error("row {row}: both debit and credit present")]
    BothDebitAndCredit { row: usize },

    #[error("row {row}: joined legs for document {doc:?} have the same direction")]
    SameDirection { row: usize, doc: String },

    #[error("row {row}: cannot parse date {value:?} with format {format:?}")]
    DateParse {
        row: usize,
        value: String,
        format: String,
    },

    #[error("row {row}: cannot parse amount {value:?}")]
    AmountParse { row: usize, value: String },

    #[error("every format attempt failed: {}", format_attempts(.0))]
    AllAttemptsFailed(Vec<AttemptFailure>),
}

/// One failed settings attempt inside a multi-format parse.
#[derive(Debug)]
pub struct AttemptFailure {
    pub label: String,
    pub error: ParseError,
}

fn format_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| format!("[{}] {}", a.label, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ParseError>;
