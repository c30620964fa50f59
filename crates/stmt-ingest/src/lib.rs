pub mod error;
pub mod header;
pub mod reader;

pub use error::{IngestError, Result};
pub use header::{heuristic_header, rows_after_header};
pub use reader::TableReader;
