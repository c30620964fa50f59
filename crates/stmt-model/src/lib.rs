pub mod catalog;
pub mod cell;
pub mod error;
pub mod money;
pub mod settings;
pub mod transaction;

pub use catalog::{Account, Currency};
pub use cell::{RawCell, RawPage, RawRow};
pub use error::{ModelError, Result, SettingsViolation};
pub use money::Money;
pub use settings::{AccountSettings, ColumnInfo, ColumnRole, ParserSettings, StatementFormat};
pub use transaction::{
    Candidate, DisplayTransaction, DisplayTransactionType, LedgerTransaction,
    StatementTransaction, TransactionId, TransactionState, TransactionType,
};
