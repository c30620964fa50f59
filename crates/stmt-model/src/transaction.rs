//! Transaction value types flowing between the parser, the reconciliation
//! engine, and the caller.

use chrono::{DateTime, FixedOffset};

use crate::money::Money;

/// Canonical transaction produced by the row parser.
///
/// `amount` is signed: negative means an outflow from the own account.
/// A foreign amount, when present, always carries the same sign.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatementTransaction {
    pub name: String,
    pub date: DateTime<FixedOffset>,
    pub amount: Money,
    pub foreign_amount: Option<Money>,
    pub foreign_currency_code: Option<String>,
    pub notes: Option<String>,
}

/// Transaction type as recorded by the bookkeeping service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Withdrawal,
    Transfer,
    Deposit,
    Reconciliation,
}

/// Previously recorded ledger transaction (external, read-only input).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LedgerTransaction {
    pub id: u64,
    pub kind: TransactionType,
    pub date: DateTime<FixedOffset>,
    pub amount: Money,
    pub description: String,
    pub currency_id: u64,
    #[serde(default)]
    pub foreign_amount: Option<Money>,
    #[serde(default)]
    pub foreign_currency_id: Option<u64>,
    #[serde(default)]
    pub source_id: Option<u64>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub destination_id: Option<u64>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Reconciliation state of one display row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Matched,
    Annotated,
    Unmatched,
    New,
}

/// Account-relative transaction direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayTransactionType {
    Withdrawal,
    TransferIn,
    TransferOut,
    Deposit,
}

/// Identity of a display row: either a transaction the ledger already
/// knows, or a synthetic, content-derived id for a freshly parsed row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TransactionId {
    Persisted(u64),
    Synthetic(String),
}

/// Deduplicated, scored ledger-transaction projection offered as a
/// suggested match. Frozen value; built once, never mutated.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
    pub description: String,
    pub date: DateTime<FixedOffset>,
    pub kind: DisplayTransactionType,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One row of the merged, reviewable output list. Created fresh per
/// reconciliation run, never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayTransaction {
    pub id: TransactionId,
    pub kind: DisplayTransactionType,
    pub state: TransactionState,
    pub description: String,
    pub date: DateTime<FixedOffset>,
    pub amount: Money,
    #[serde(default)]
    pub foreign_amount: Option<Money>,
    #[serde(default)]
    pub foreign_currency_id: Option<u64>,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_id_serializes_tagged() {
        let persisted = serde_json::to_value(TransactionId::Persisted(42)).unwrap();
        assert_eq!(persisted["kind"], "persisted");
        assert_eq!(persisted["value"], 42);

        let synthetic = serde_json::to_value(TransactionId::Synthetic("abc".into())).unwrap();
        assert_eq!(synthetic["kind"], "synthetic");
        assert_eq!(synthetic["value"], "abc");
    }

    #[test]
    fn statement_transaction_roundtrips() {
        let tx = StatementTransaction {
            name: "WalMart".into(),
            date: "2025-08-19T12:00:00+00:00".parse().unwrap(),
            amount: Money::from_minor(-10000),
            foreign_amount: None,
            foreign_currency_code: None,
            notes: Some("Description: WalMart".into()),
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"-100.00\""));
        let round: StatementTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(round, tx);
    }
}
