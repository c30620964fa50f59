use thiserror::Error;

use crate::settings::ColumnRole;

/// A single violated column-configuration rule.
///
/// Validation reports every violation it finds, not just the first, so a
/// settings document with several problems surfaces them all in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsViolation {
    #[error("role {0:?} is assigned to more than one column")]
    DuplicateRole(ColumnRole),
    #[error("amount and amount debit/credit cannot be used together")]
    AmountConflict,
    #[error("foreign currency code and foreign amount must be used together")]
    ForeignPairMismatch,
    #[error("amount credit and amount debit must be used together")]
    DebitCreditPairMismatch,
    #[error("doc number must be used together with IBAN")]
    DocNumberRequiresIban,
    #[error("date column is required")]
    MissingDate,
    #[error("name column is required")]
    MissingName,
    #[error("an amount-bearing column is required")]
    MissingAmount,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid parser settings: {}", format_violations(.0))]
    InvalidSettings(Vec<SettingsViolation>),
    #[error("cannot parse money value {value:?}")]
    MoneyParse { value: String },
}

fn format_violations(violations: &[SettingsViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ModelError>;
