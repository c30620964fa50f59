//! Locating the data-start row inside the extracted pages.
//!
//! Exact mode compares rows against the configured header by value and is
//! used for normal parsing. Heuristic mode has no header to compare
//! against and picks the densest row; it only backs settings inference.

use stmt_model::{RawPage, RawRow};

use crate::error::{IngestError, Result};

/// Minimum number of non-empty cells for a heuristic header candidate.
const MIN_HEADER_CELLS: usize = 3;

/// Scan rows across pages in order; the first row equal to `header` marks
/// the data start. Everything after it, across page boundaries, is data.
pub fn rows_after_header(pages: Vec<RawPage>, header: &[&str]) -> Result<Vec<RawRow>> {
    let mut pages = pages.into_iter();
    for page in pages.by_ref() {
        let mut rows = page.into_iter();
        for row in rows.by_ref() {
            if row_matches_header(&row, header) {
                let mut data: Vec<RawRow> = rows.collect();
                for later_page in pages {
                    data.extend(later_page);
                }
                return Ok(data);
            }
        }
    }
    Err(IngestError::HeaderNotFound)
}

/// A row matches when its leading cells equal the header texts and any
/// trailing cells (spreadsheet padding) are empty.
fn row_matches_header(row: &RawRow, header: &[&str]) -> bool {
    if row.len() < header.len() {
        return false;
    }
    row.iter()
        .zip(header)
        .all(|(cell, name)| cell.as_text() == *name)
        && row[header.len()..].iter().all(|cell| cell.is_empty())
}

/// Heuristic data-start location for settings inference.
///
/// Scores each row of the first page by its non-empty cell count, breaking
/// ties toward the earliest row. Returns the winning header row and all
/// rows after it.
pub fn heuristic_header(first_page: &[RawRow]) -> Result<(RawRow, Vec<RawRow>)> {
    let mut best_index = 0usize;
    let mut best_score = 0usize;
    for (index, row) in first_page.iter().enumerate() {
        let score = row.iter().filter(|cell| !cell.is_empty()).count();
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    if best_score < MIN_HEADER_CELLS {
        return Err(IngestError::NoHeaderCandidate { best: best_score });
    }
    if best_index + 1 == first_page.len() {
        return Err(IngestError::HeaderIsLastRow);
    }

    Ok((
        first_page[best_index].clone(),
        first_page[best_index + 1..].to_vec(),
    ))
}
