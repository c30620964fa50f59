use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unknown text encoding label {label:?}")]
    UnknownEncoding { label: String },

    #[error("CSV separator {separator:?} is not a single-byte character")]
    InvalidSeparator { separator: char },

    #[error("failed to read delimited text: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("failed to read spreadsheet: {message}")]
    Spreadsheet { message: String },

    #[error("failed to extract PDF text: {message}")]
    Pdf { message: String },

    #[error("header not found")]
    HeaderNotFound,

    #[error("no header candidate found (best row has {best} non-empty cells)")]
    NoHeaderCandidate { best: usize },

    #[error("possible header is the last row")]
    HeaderIsLastRow,
}

pub type Result<T> = std::result::Result<T, IngestError>;
