//! The reconciliation pass: match parsed statement rows against ledger
//! transactions and produce one reviewable display list.
//!
//! Never fails on well-formed input; anything that cannot participate is
//! skipped with a log line rather than aborting the run.

use std::collections::HashMap;

use chrono::TimeDelta;
use sha2::{Digest, Sha256};

use stmt_model::{
    Candidate, Currency, DisplayTransaction, DisplayTransactionType, LedgerTransaction,
    StatementTransaction, TransactionId, TransactionState,
};

use crate::candidates::{best_candidates, deduplicate_candidates, project_candidate};
use crate::similarity;

/// Tunable knobs of the matching pass.
#[derive(Debug, Clone, Copy)]
pub struct ReconOptions {
    /// Minimum similarity (0-100) for a fuzzy match to count.
    pub score_cutoff: f64,
    /// Upper bound on suggested candidates per new transaction.
    pub max_candidates: usize,
}

impl Default for ReconOptions {
    fn default() -> Self {
        ReconOptions {
            score_cutoff: 93.0,
            max_candidates: 10,
        }
    }
}

/// A ledger transaction still available for matching, with its
/// account-relative projection computed up front.
struct PoolEntry<'a> {
    tx: &'a LedgerTransaction,
    projection: Candidate,
}

/// Merge freshly parsed statement transactions with the ledger's recent
/// transactions into one display list, newest first.
pub fn reconcile(
    ledger: &[LedgerTransaction],
    statement: &[StatementTransaction],
    currencies: &[Currency],
    account_id: u64,
    options: &ReconOptions,
) -> Vec<DisplayTransaction> {
    let mut pool: Vec<PoolEntry<'_>> = ledger
        .iter()
        .filter_map(|tx| {
            project_candidate(tx, account_id).map(|projection| PoolEntry { tx, projection })
        })
        .collect();
    pool.sort_by(|a, b| b.tx.date.cmp(&a.tx.date));

    let candidate_pool =
        deduplicate_candidates(pool.iter().map(|entry| entry.projection.clone()), false);
    let currency_ids: HashMap<&str, u64> = currencies
        .iter()
        .map(|currency| (currency.code.as_str(), currency.id))
        .collect();

    let mut result = Vec::with_capacity(statement.len() + pool.len());
    for st in statement {
        match take_match(&mut pool, st, options) {
            Some(entry) => {
                let state = if entry.tx.notes == st.notes {
                    TransactionState::Matched
                } else {
                    TransactionState::Annotated
                };
                tracing::debug!(id = entry.tx.id, ?state, "statement row matched");
                result.push(DisplayTransaction {
                    notes: st.notes.clone(),
                    state,
                    ..display_from_ledger(&entry)
                });
            }
            None => {
                result.push(new_transaction(st, &candidate_pool, &currency_ids, options));
            }
        }
    }

    // Leftover ledger entries inside the statement window surface as
    // Unmatched; with no statement rows there is no window.
    if let Some(earliest) = statement.iter().map(|st| st.date).min() {
        let min_date = earliest - TimeDelta::days(1);
        for entry in pool {
            if entry.tx.date >= min_date {
                result.push(display_from_ledger(&entry));
            }
        }
    }

    result.sort_by(|a, b| b.date.cmp(&a.date));
    result
}

/// Pull the best pool entry for one statement row, if any.
///
/// The pool is ordered newest-first, so when no entry clears the fuzzy
/// cutoff the most recent amount/date match wins.
fn take_match<'a>(
    pool: &mut Vec<PoolEntry<'a>>,
    st: &StatementTransaction,
    options: &ReconOptions,
) -> Option<PoolEntry<'a>> {
    let near: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            entry.tx.amount.abs() == st.amount.abs()
                && (entry.tx.date - st.date).abs() < TimeDelta::days(1)
        })
        .map(|(index, _)| index)
        .collect();
    let first = *near.first()?;

    let mut chosen = first;
    if let Some(query) = st.notes.as_deref() {
        let mut best: Option<f64> = None;
        for &index in &near {
            let Some(notes) = pool[index].tx.notes.as_deref() else {
                continue;
            };
            let score = similarity::score(query, notes);
            if score >= options.score_cutoff && best.is_none_or(|b| score > b) {
                best = Some(score);
                chosen = index;
            }
        }
    }
    Some(pool.remove(chosen))
}

fn display_from_ledger(entry: &PoolEntry<'_>) -> DisplayTransaction {
    DisplayTransaction {
        id: TransactionId::Persisted(entry.tx.id),
        kind: entry.projection.kind,
        state: TransactionState::Unmatched,
        description: entry.tx.description.clone(),
        date: entry.tx.date,
        amount: entry.tx.amount,
        foreign_amount: entry.tx.foreign_amount,
        foreign_currency_id: entry.tx.foreign_currency_id,
        account_id: entry.projection.account_id,
        notes: entry.tx.notes.clone(),
        candidates: Vec::new(),
    }
}

fn new_transaction(
    st: &StatementTransaction,
    candidate_pool: &[Candidate],
    currency_ids: &HashMap<&str, u64>,
    options: &ReconOptions,
) -> DisplayTransaction {
    let kind = if st.amount.is_negative() {
        DisplayTransactionType::Withdrawal
    } else {
        DisplayTransactionType::Deposit
    };
    let foreign_currency_id = st.foreign_currency_code.as_deref().and_then(|code| {
        let id = currency_ids.get(code).copied();
        if id.is_none() {
            tracing::warn!(code, "statement names a currency missing from the catalog");
        }
        id
    });

    DisplayTransaction {
        id: synthetic_id(st),
        kind,
        state: TransactionState::New,
        description: st.name.clone(),
        date: st.date,
        amount: st.amount.abs(),
        foreign_amount: st.foreign_amount.map(|amount| amount.abs()),
        foreign_currency_id,
        account_id: None,
        notes: st.notes.clone(),
        candidates: best_candidates(candidate_pool, st.notes.as_deref(), options),
    }
}

/// Stable, content-derived identity for a statement row the ledger does
/// not know yet.
fn synthetic_id(st: &StatementTransaction) -> TransactionId {
    let fingerprint = format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
        st.name,
        st.date.to_rfc3339(),
        st.amount,
        st.foreign_amount.map(|m| m.to_string()).unwrap_or_default(),
        st.foreign_currency_code.as_deref().unwrap_or_default(),
        st.notes.as_deref().unwrap_or_default(),
    );
    let digest = Sha256::digest(fingerprint.as_bytes());
    TransactionId::Synthetic(hex::encode(&digest[..16]))
}
