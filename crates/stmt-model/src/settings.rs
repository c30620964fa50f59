//! User-editable statement parser configuration.
//!
//! A settings document declares the file format and binds column positions
//! to semantic roles. It is validated once at load; all row-level logic
//! afterwards trusts the resolved indices and never re-checks the rules.

use std::collections::BTreeMap;

use crate::error::{ModelError, SettingsViolation};

/// Semantic role of a statement column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Name,
    Iban,
    CurrencyCode,
    Amount,
    AmountDebit,
    AmountCredit,
    ForeignCurrencyCode,
    ForeignAmount,
    DocNumber,
    Commission,
    RemainingBalance,
}

/// One column of the statement table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColumnInfo {
    /// How the column is named in the statement header.
    pub name: String,
    /// Label under which the column's value is rendered into notes.
    #[serde(default)]
    pub notes_label: Option<String>,
    #[serde(default)]
    pub role: Option<ColumnRole>,
    /// Position in the row; assigned from list order during validation.
    #[serde(default)]
    pub index: usize,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes_label: None,
            role: None,
            index: 0,
        }
    }

    pub fn with_role(mut self, role: ColumnRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_notes_label(mut self, label: impl Into<String>) -> Self {
        self.notes_label = Some(label.into());
        self
    }
}

/// Format descriptor: which table reader to use and how to decode it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum StatementFormat {
    Csv { separator: char, encoding: String },
    Xlsx,
    Pdf,
}

impl StatementFormat {
    /// Short label used in aggregated multi-format error reports.
    pub fn label(&self) -> &'static str {
        match self {
            StatementFormat::Csv { .. } => "csv",
            StatementFormat::Xlsx => "xlsx",
            StatementFormat::Pdf => "pdf",
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

/// Declarative statement parser configuration. Immutable once validated.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParserSettings {
    pub format: StatementFormat,
    pub columns: Vec<ColumnInfo>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Only for non-standard decimal separators (i.e. not ".").
    #[serde(default)]
    pub decimal_separator: Option<char>,
}

impl ParserSettings {
    /// Assign column indices from list order and check every binding rule.
    ///
    /// All violations are collected and reported together.
    pub fn validated(mut self) -> Result<Self, ModelError> {
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.index = index;
        }

        let mut role_counts: BTreeMap<ColumnRole, usize> = BTreeMap::new();
        for column in &self.columns {
            if let Some(role) = column.role {
                *role_counts.entry(role).or_default() += 1;
            }
        }
        let count = |role: ColumnRole| role_counts.get(&role).copied().unwrap_or(0);

        let mut violations = Vec::new();

        for (role, n) in &role_counts {
            if *n > 1 {
                violations.push(SettingsViolation::DuplicateRole(*role));
            }
        }
        if count(ColumnRole::Amount) > 0
            && (count(ColumnRole::AmountDebit) > 0 || count(ColumnRole::AmountCredit) > 0)
        {
            violations.push(SettingsViolation::AmountConflict);
        }
        if count(ColumnRole::ForeignCurrencyCode) != count(ColumnRole::ForeignAmount) {
            violations.push(SettingsViolation::ForeignPairMismatch);
        }
        if count(ColumnRole::AmountCredit) != count(ColumnRole::AmountDebit) {
            violations.push(SettingsViolation::DebitCreditPairMismatch);
        }
        if count(ColumnRole::DocNumber) > 0 && count(ColumnRole::Iban) == 0 {
            violations.push(SettingsViolation::DocNumberRequiresIban);
        }
        if count(ColumnRole::Date) == 0 {
            violations.push(SettingsViolation::MissingDate);
        }
        if count(ColumnRole::Name) == 0 {
            violations.push(SettingsViolation::MissingName);
        }
        if count(ColumnRole::Amount) == 0
            && count(ColumnRole::AmountDebit) == 0
            && count(ColumnRole::AmountCredit) == 0
        {
            violations.push(SettingsViolation::MissingAmount);
        }

        if violations.is_empty() {
            Ok(self)
        } else {
            Err(ModelError::InvalidSettings(violations))
        }
    }

    /// The column carrying `role`, if configured.
    pub fn column_with_role(&self, role: ColumnRole) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.role == Some(role))
    }

    /// Columns that contribute to the notes field, in column order.
    pub fn notes_columns(&self) -> impl Iterator<Item = (&ColumnInfo, &str)> {
        self.columns
            .iter()
            .filter_map(|c| c.notes_label.as_deref().map(|label| (c, label)))
    }

    /// Expected header row, by configured column names.
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Per-account settings envelope as stored by the attachment mechanism.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AccountSettings {
    /// Case-insensitive substrings; matching transactions are dropped.
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default)]
    pub parser_settings: Option<ParserSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    fn csv_format() -> StatementFormat {
        StatementFormat::Csv {
            separator: ',',
            encoding: "utf-8".to_string(),
        }
    }

    fn minimal_columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::new("Date").with_role(ColumnRole::Date),
            ColumnInfo::new("Description").with_role(ColumnRole::Name),
            ColumnInfo::new("Amount").with_role(ColumnRole::Amount),
        ]
    }

    fn settings(columns: Vec<ColumnInfo>) -> ParserSettings {
        ParserSettings {
            format: csv_format(),
            columns,
            date_format: default_date_format(),
            decimal_separator: None,
        }
    }

    fn violations(result: Result<ParserSettings, ModelError>) -> Vec<SettingsViolation> {
        match result {
            Err(ModelError::InvalidSettings(v)) => v,
            other => panic!("expected invalid settings, got {other:?}"),
        }
    }

    #[test]
    fn minimal_settings_validate() {
        let validated = settings(minimal_columns()).validated().unwrap();
        assert_eq!(validated.columns[2].index, 2);
        assert_eq!(
            validated.column_with_role(ColumnRole::Amount).unwrap().name,
            "Amount"
        );
    }

    #[test]
    fn amount_and_debit_credit_conflict() {
        let mut columns = minimal_columns();
        columns.push(ColumnInfo::new("Debit").with_role(ColumnRole::AmountDebit));
        columns.push(ColumnInfo::new("Credit").with_role(ColumnRole::AmountCredit));
        let v = violations(settings(columns).validated());
        assert!(v.contains(&SettingsViolation::AmountConflict));
    }

    #[test]
    fn foreign_pair_must_be_complete() {
        let mut columns = minimal_columns();
        columns.push(ColumnInfo::new("FX Amount").with_role(ColumnRole::ForeignAmount));
        let v = violations(settings(columns).validated());
        assert_eq!(v, vec![SettingsViolation::ForeignPairMismatch]);
    }

    #[test]
    fn debit_requires_credit() {
        let columns = vec![
            ColumnInfo::new("Date").with_role(ColumnRole::Date),
            ColumnInfo::new("Description").with_role(ColumnRole::Name),
            ColumnInfo::new("Debit").with_role(ColumnRole::AmountDebit),
        ];
        let v = violations(settings(columns).validated());
        assert_eq!(v, vec![SettingsViolation::DebitCreditPairMismatch]);
    }

    #[test]
    fn doc_number_requires_iban() {
        let mut columns = minimal_columns();
        columns.push(ColumnInfo::new("Document").with_role(ColumnRole::DocNumber));
        let v = violations(settings(columns).validated());
        assert_eq!(v, vec![SettingsViolation::DocNumberRequiresIban]);
    }

    #[test]
    fn duplicate_role_reported() {
        let mut columns = minimal_columns();
        columns.push(ColumnInfo::new("Date 2").with_role(ColumnRole::Date));
        let v = violations(settings(columns).validated());
        assert_eq!(v, vec![SettingsViolation::DuplicateRole(ColumnRole::Date)]);
    }

    #[test]
    fn all_violations_reported_together() {
        // No date, no name, no amount, dangling doc number
        let columns = vec![ColumnInfo::new("Document").with_role(ColumnRole::DocNumber)];
        let v = violations(settings(columns).validated());
        assert_eq!(
            v,
            vec![
                SettingsViolation::DocNumberRequiresIban,
                SettingsViolation::MissingDate,
                SettingsViolation::MissingName,
                SettingsViolation::MissingAmount,
            ]
        );
    }
}
