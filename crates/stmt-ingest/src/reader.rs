//! Format-specific table readers.
//!
//! A reader turns a byte stream into pages of fixed-width rows of typed
//! cells. Delimited text yields one page, a spreadsheet one page per
//! sheet, a PDF one page per extracted text table. Formats are a closed
//! set: adding one means adding a variant here, not subclassing.

use std::io::Cursor;

use calamine::{Data, Reader};
use encoding_rs::Encoding;

use stmt_model::{RawCell, RawPage, RawRow, StatementFormat};

use crate::error::{IngestError, Result};

/// Dispatches on the configured format once at construction.
#[derive(Debug, Clone)]
pub enum TableReader {
    Csv {
        delimiter: u8,
        encoding: &'static Encoding,
    },
    Xlsx,
    Pdf,
}

impl TableReader {
    pub fn for_format(format: &StatementFormat) -> Result<Self> {
        match format {
            StatementFormat::Csv {
                separator,
                encoding,
            } => {
                let delimiter = u8::try_from(*separator).map_err(|_| {
                    IngestError::InvalidSeparator {
                        separator: *separator,
                    }
                })?;
                let encoding = Encoding::for_label(encoding.as_bytes()).ok_or_else(|| {
                    IngestError::UnknownEncoding {
                        label: encoding.clone(),
                    }
                })?;
                Ok(TableReader::Csv {
                    delimiter,
                    encoding,
                })
            }
            StatementFormat::Xlsx => Ok(TableReader::Xlsx),
            StatementFormat::Pdf => Ok(TableReader::Pdf),
        }
    }

    /// Read every page of the input. Malformed input surfaces as an error;
    /// no partial page is ever returned.
    pub fn read_pages(&self, data: &[u8]) -> Result<Vec<RawPage>> {
        match self {
            TableReader::Csv {
                delimiter,
                encoding,
            } => read_csv(data, *delimiter, encoding),
            TableReader::Xlsx => read_xlsx(data),
            TableReader::Pdf => read_pdf(data),
        }
    }
}

fn read_csv(data: &[u8], delimiter: u8, encoding: &'static Encoding) -> Result<Vec<RawPage>> {
    let (text, _, _) = encoding.decode(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut page: RawPage = Vec::new();
    for record in reader.records() {
        let record = record?;
        page.push(record.iter().map(RawCell::from).collect::<RawRow>());
    }

    tracing::debug!(rows = page.len(), "read delimited text page");
    Ok(vec![page])
}

fn read_xlsx(data: &[u8]) -> Result<Vec<RawPage>> {
    let cursor = Cursor::new(data.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor).map_err(|e| {
        IngestError::Spreadsheet {
            message: e.to_string(),
        }
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut pages = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| IngestError::Spreadsheet {
                message: format!("sheet {name:?}: {e}"),
            })?;
        let page: RawPage = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect::<RawRow>())
            .collect();
        tracing::debug!(sheet = %name, rows = page.len(), "read spreadsheet page");
        pages.push(page);
    }

    Ok(pages)
}

/// Native cell types are kept; anything else falls back to its string form.
fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::from(s.as_str()),
        Data::Float(v) => RawCell::Decimal(*v),
        Data::Int(v) => RawCell::Integer(*v),
        Data::Bool(v) => RawCell::Bool(*v),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => RawCell::DateTime(naive),
            None => RawCell::Text(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::from(s.as_str()),
        Data::Error(e) => RawCell::Text(format!("#{e:?}")),
    }
}

fn read_pdf(data: &[u8]) -> Result<Vec<RawPage>> {
    let text = pdf_extract::extract_text_from_mem(data).map_err(|e| IngestError::Pdf {
        message: e.to_string(),
    })?;
    Ok(pages_from_text(&text))
}

/// Split extracted PDF text into pages of rows.
///
/// Form feeds delimit pages; non-empty lines are rows; a run of two or
/// more spaces (or a tab) separates cells. Line-based extraction means
/// embedded newlines inside a logical cell arrive as flattened rows,
/// matching how text exports render multi-line cells.
pub(crate) fn pages_from_text(text: &str) -> Vec<RawPage> {
    text.split('\u{c}')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(split_columns)
                .collect::<RawPage>()
        })
        .filter(|page| !page.is_empty())
        .collect()
}

fn split_columns(line: &str) -> RawRow {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut space_run = 0usize;

    for c in line.trim().chars() {
        match c {
            '\t' => {
                cells.push(std::mem::take(&mut current));
                space_run = 0;
            }
            ' ' => space_run += 1,
            _ => {
                if space_run >= 2 {
                    cells.push(std::mem::take(&mut current));
                } else if space_run == 1 && !current.is_empty() {
                    current.push(' ');
                }
                space_run = 0;
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        cells.push(current);
    }

    cells.iter().map(|c| RawCell::from(c.as_str())).collect()
}
