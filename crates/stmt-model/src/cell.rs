use chrono::NaiveDateTime;

use crate::money::Money;

/// One raw cell as read from a statement file, before any role binding.
///
/// Spreadsheet readers keep native cell types; text-based readers only ever
/// produce `Text` and `Empty`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum RawCell {
    Text(String),
    Integer(i64),
    Decimal(f64),
    DateTime(NaiveDateTime),
    Bool(bool),
    Empty,
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell the way a text export would show it.
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Text(s) => s.clone(),
            RawCell::Integer(v) => v.to_string(),
            RawCell::Decimal(v) => v.to_string(),
            RawCell::DateTime(v) => v.to_string(),
            RawCell::Bool(v) => v.to_string(),
            RawCell::Empty => String::new(),
        }
    }

    /// Interpret the cell as an amount, if it can carry one.
    pub fn as_money(&self, decimal_separator: Option<char>) -> Option<Money> {
        match self {
            RawCell::Integer(v) => Some(Money::from_minor(v * 100)),
            RawCell::Decimal(v) => Some(Money::from_f64(*v)),
            RawCell::Text(s) => Money::parse(s, decimal_separator).ok(),
            _ => None,
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(value.to_string())
        }
    }
}

/// One row of cells; fixed width within a page.
pub type RawRow = Vec<RawCell>;

/// One extracted table: a CSV file, a spreadsheet sheet, or a PDF table.
pub type RawPage = Vec<RawRow>;
