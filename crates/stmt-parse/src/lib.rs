//! Statement parsing: binds configured column roles to raw rows, joins
//! two-row transfers, and proposes settings for unknown layouts.

mod dates;
pub mod error;
pub mod infer;
pub mod parser;

pub use error::{AttemptFailure, ParseError, Result};
pub use infer::{InferredSettings, infer_parser_settings};
pub use parser::{ParseContext, parse_rows, parse_statement, parse_with_any};
