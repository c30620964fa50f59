//! Advisory settings inference for statements with no stored configuration.
//!
//! Locates a probable header heuristically, then proposes DATE and AMOUNT
//! role bindings from the data rows. The result is a suggestion for the
//! user to review; it is never applied automatically.

use stmt_model::{ColumnInfo, ColumnRole, RawCell, RawPage, RawRow};

use stmt_ingest::heuristic_header;

use crate::dates;
use crate::error::Result;

/// Date formats tried against string samples, most specific first.
const DATE_FORMAT_CANDIDATES: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y",
    "%m/%d/%Y",
];

/// Fraction of non-empty values that must parse as dates for a column to
/// qualify as the date column.
const DATE_FRACTION_CUTOFF: f64 = 0.5;

/// A proposed partial configuration. Only DATE and AMOUNT are ever bound.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredSettings {
    pub columns: Vec<ColumnInfo>,
    pub date_format: Option<String>,
    pub decimal_separator: Option<char>,
}

/// Infer a partial column role map from raw pages.
pub fn infer_parser_settings(pages: &[RawPage]) -> Result<InferredSettings> {
    let first_page = pages.first().map(Vec::as_slice).unwrap_or(&[]);
    let (header, rows) = heuristic_header(first_page)?;

    let width = header.len();
    let mut columns: Vec<ColumnInfo> = header
        .iter()
        .map(|cell| ColumnInfo::new(cell.as_text()))
        .collect();

    let date = best_date_column(&rows, width);
    let mut date_format = None;
    if let Some((index, format)) = date {
        columns[index] = columns[index].clone().with_role(ColumnRole::Date);
        date_format = Some(format.to_string());
    }

    let mut decimal_separator = None;
    let date_index = date.map(|(index, _)| index);
    if let Some((index, separator)) = first_amount_column(&rows, width, date_index) {
        columns[index] = columns[index].clone().with_role(ColumnRole::Amount);
        decimal_separator = separator;
    }

    tracing::debug!(
        date_column = ?date_index,
        date_format = ?date_format,
        decimal_separator = ?decimal_separator,
        "inferred parser settings"
    );

    Ok(InferredSettings {
        columns,
        date_format,
        decimal_separator,
    })
}

fn column_cells<'a>(rows: &'a [RawRow], index: usize) -> impl Iterator<Item = &'a RawCell> {
    rows.iter()
        .filter_map(move |row| row.get(index))
        .filter(|cell| !cell.is_empty())
}

/// Score each column by the fraction of its values parseable as dates;
/// return the best column above the cutoff with its winning format.
/// Ties go to the earliest column.
fn best_date_column(rows: &[RawRow], width: usize) -> Option<(usize, &'static str)> {
    let mut best: Option<(usize, &'static str, f64)> = None;
    for index in 0..width {
        let Some((format, fraction)) = date_score(rows, index) else {
            continue;
        };
        if fraction <= DATE_FRACTION_CUTOFF {
            continue;
        }
        if best.is_none_or(|(_, _, best_fraction)| fraction > best_fraction) {
            best = Some((index, format, fraction));
        }
    }
    best.map(|(index, format, _)| (index, format))
}

fn date_score(rows: &[RawRow], index: usize) -> Option<(&'static str, f64)> {
    let total = column_cells(rows, index).count();
    if total == 0 {
        return None;
    }
    // First format wins ties, so the more specific candidates take
    // priority over their prefixes.
    let mut best: Option<(&'static str, f64)> = None;
    for format in DATE_FORMAT_CANDIDATES {
        let parsed = column_cells(rows, index)
            .filter(|cell| match cell {
                RawCell::DateTime(_) => true,
                other => dates::parse_naive(other.as_text().trim(), format).is_some(),
            })
            .count();
        let fraction = parsed as f64 / total as f64;
        if best.is_none_or(|(_, b)| fraction > b) {
            best = Some((format, fraction));
        }
    }
    best
}

/// First column, in original order, where a decimal separator can be
/// derived from the non-digit character set and every value then parses
/// as an amount.
fn first_amount_column(
    rows: &[RawRow],
    width: usize,
    skip: Option<usize>,
) -> Option<(usize, Option<char>)> {
    for index in 0..width {
        if Some(index) == skip {
            continue;
        }
        if column_cells(rows, index).next().is_none() {
            continue;
        }
        let Some(separator) = derive_separator(rows, index) else {
            continue;
        };
        let all_parse = column_cells(rows, index).all(|cell| cell.as_money(separator).is_some());
        if all_parse {
            return Some((index, separator));
        }
    }
    None
}

/// Derive a candidate separator from the column's text values. Returns
/// `None` when the character set is ambiguous (more than one candidate).
fn derive_separator(rows: &[RawRow], index: usize) -> Option<Option<char>> {
    let mut candidates: Vec<char> = Vec::new();
    for cell in column_cells(rows, index) {
        let RawCell::Text(text) = cell else { continue };
        for ch in text.chars() {
            if ch.is_ascii_digit() || matches!(ch, '-' | '+' | ' ' | '\u{a0}') {
                continue;
            }
            if !candidates.contains(&ch) {
                candidates.push(ch);
            }
        }
    }
    match candidates.as_slice() {
        [] => Some(None),
        ['.'] => Some(None),
        [sep] => Some(Some(*sep)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &[&[&str]]) -> RawPage {
        rows.iter()
            .map(|row| row.iter().map(|c| RawCell::from(*c)).collect())
            .collect()
    }

    #[test]
    fn infers_date_and_amount_with_comma_separator() {
        let pages = vec![page(&[
            &["Account statement", "", ""],
            &["Дата", "Опис", "Сума"],
            &["19.08.2025 12:30", "WalMart", "-1 234,56"],
            &["18.08.2025 09:00", "Refund", "100,00"],
        ])];
        let inferred = infer_parser_settings(&pages).unwrap();
        assert_eq!(inferred.columns[0].role, Some(ColumnRole::Date));
        assert_eq!(inferred.columns[1].role, None);
        assert_eq!(inferred.columns[2].role, Some(ColumnRole::Amount));
        assert_eq!(inferred.date_format.as_deref(), Some("%d.%m.%Y %H:%M"));
        assert_eq!(inferred.decimal_separator, Some(','));
    }

    #[test]
    fn plain_dot_amounts_need_no_separator() {
        let pages = vec![page(&[
            &["Date", "Name", "Amount"],
            &["2025-08-19", "a", "-10.50"],
            &["2025-08-18", "b", "3.25"],
        ])];
        let inferred = infer_parser_settings(&pages).unwrap();
        assert_eq!(inferred.columns[2].role, Some(ColumnRole::Amount));
        assert_eq!(inferred.decimal_separator, None);
        assert_eq!(inferred.date_format.as_deref(), Some("%Y-%m-%d"));
    }

    #[test]
    fn mixed_text_column_is_not_an_amount() {
        let pages = vec![page(&[
            &["Date", "Ref", "Amount"],
            &["2025-08-19", "AB/12", "10.00"],
            &["2025-08-18", "CD/34", "20.00"],
        ])];
        let inferred = infer_parser_settings(&pages).unwrap();
        // "Ref" mixes letters, so its separator set is ambiguous.
        assert_eq!(inferred.columns[1].role, None);
        assert_eq!(inferred.columns[2].role, Some(ColumnRole::Amount));
    }

    #[test]
    fn date_column_needs_majority_of_parses() {
        let pages = vec![page(&[
            &["Date", "Name", "Amount"],
            &["yesterday", "a", "1.00"],
            &["2025-08-18", "b", "2.00"],
            &["sometime", "c", "3.00"],
        ])];
        let inferred = infer_parser_settings(&pages).unwrap();
        assert!(inferred.columns.iter().all(|c| c.role != Some(ColumnRole::Date)));
        assert!(inferred.date_format.is_none());
    }

    #[test]
    fn native_datetime_cells_count_as_dates() {
        use chrono::NaiveDate;
        let header: RawRow = ["Дата", "Опис", "Сума"]
            .iter()
            .map(|c| RawCell::from(*c))
            .collect();
        let naive = NaiveDate::from_ymd_opt(2025, 8, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let data: RawRow = vec![
            RawCell::DateTime(naive),
            RawCell::Text("WalMart".into()),
            RawCell::Decimal(-10.5),
        ];
        let inferred = infer_parser_settings(&[vec![header, data]]).unwrap();
        assert_eq!(inferred.columns[0].role, Some(ColumnRole::Date));
        assert_eq!(inferred.columns[2].role, Some(ColumnRole::Amount));
    }
}
