//! Projecting ledger transactions into account-relative candidates.

use std::collections::HashMap;

use stmt_model::{Candidate, DisplayTransactionType, LedgerTransaction, TransactionType};

use crate::ReconOptions;
use crate::similarity;

/// Project a ledger transaction into a candidate as seen from `account_id`.
///
/// Returns `None` for reconciliation entries and for transfers that do not
/// touch the account; those cannot be offered as suggestions.
pub fn project_candidate(tx: &LedgerTransaction, account_id: u64) -> Option<Candidate> {
    let (kind, partner) = match tx.kind {
        TransactionType::Transfer => {
            if tx.source_id == Some(account_id) {
                (DisplayTransactionType::TransferOut, tx.destination_id)
            } else if tx.destination_id == Some(account_id) {
                (DisplayTransactionType::TransferIn, tx.source_id)
            } else {
                tracing::warn!(
                    id = tx.id,
                    account_id,
                    "transfer does not touch the account, skipping"
                );
                return None;
            }
        }
        TransactionType::Withdrawal => (DisplayTransactionType::Withdrawal, tx.destination_id),
        TransactionType::Deposit => (DisplayTransactionType::Deposit, tx.source_id),
        TransactionType::Reconciliation => return None,
    };

    Some(Candidate {
        description: tx.description.clone(),
        date: tx.date,
        kind,
        account_id: partner,
        score: None,
        notes: tx.notes.clone(),
    })
}

/// Identity of a candidate with timestamp and score (and optionally notes)
/// masked out.
fn dedup_key(candidate: &Candidate, ignore_notes: bool) -> String {
    let mut key = serde_json::json!({
        "description": candidate.description,
        "kind": candidate.kind,
        "account_id": candidate.account_id,
    });
    if !ignore_notes {
        key["notes"] = serde_json::json!(candidate.notes);
    }
    key.to_string()
}

/// Collapse candidates identical except for timestamp/score, keeping the
/// later timestamp and the highest score seen. First-seen order is kept.
pub fn deduplicate_candidates(
    candidates: impl IntoIterator<Item = Candidate>,
    ignore_notes: bool,
) -> Vec<Candidate> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let key = dedup_key(&candidate, ignore_notes);
        match seen.get(&key) {
            None => {
                seen.insert(key, result.len());
                result.push(candidate);
            }
            Some(&index) => {
                let kept = &mut result[index];
                let best_score = match (kept.score, candidate.score) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
                if candidate.date > kept.date {
                    *kept = candidate;
                }
                kept.score = best_score;
            }
        }
    }
    result
}

/// Rank the candidate pool against a statement's notes.
///
/// Scores every candidate, keeps those at or above the cutoff, deduplicates
/// ignoring notes, and returns at most `max_candidates`, best first.
pub fn best_candidates(
    pool: &[Candidate],
    query: Option<&str>,
    options: &ReconOptions,
) -> Vec<Candidate> {
    let Some(query) = query else {
        return Vec::new();
    };

    let mut scored: Vec<Candidate> = pool
        .iter()
        .filter_map(|candidate| {
            let notes = candidate.notes.as_deref()?;
            let score = similarity::score(query, notes);
            (score >= options.score_cutoff).then(|| Candidate {
                score: Some(score),
                ..candidate.clone()
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        let (a_score, b_score) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
        b_score
            .total_cmp(&a_score)
            .then_with(|| b.date.cmp(&a.date))
    });
    scored.truncate(options.max_candidates);

    let mut deduplicated = deduplicate_candidates(scored, true);
    deduplicated.sort_by(|a, b| {
        let (a_score, b_score) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
        b_score
            .total_cmp(&a_score)
            .then_with(|| b.date.cmp(&a.date))
    });
    deduplicated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use stmt_model::Money;

    fn dt(s: &str) -> DateTime<FixedOffset> {
        s.parse().unwrap()
    }

    fn ledger(
        id: u64,
        kind: TransactionType,
        source_id: Option<u64>,
        destination_id: Option<u64>,
    ) -> LedgerTransaction {
        LedgerTransaction {
            id,
            kind,
            date: dt("2025-08-19T12:00:00+00:00"),
            amount: Money::from_minor(10000),
            description: format!("tx {id}"),
            currency_id: 1,
            foreign_amount: None,
            foreign_currency_id: None,
            source_id,
            source_name: None,
            destination_id,
            destination_name: None,
            notes: None,
        }
    }

    #[test]
    fn transfer_direction_is_account_relative() {
        let tx = ledger(1, TransactionType::Transfer, Some(7), Some(9));

        let out = project_candidate(&tx, 7).unwrap();
        assert_eq!(out.kind, DisplayTransactionType::TransferOut);
        assert_eq!(out.account_id, Some(9));

        let inbound = project_candidate(&tx, 9).unwrap();
        assert_eq!(inbound.kind, DisplayTransactionType::TransferIn);
        assert_eq!(inbound.account_id, Some(7));

        assert!(project_candidate(&tx, 5).is_none());
    }

    #[test]
    fn withdrawal_and_deposit_point_at_the_partner() {
        let w = ledger(1, TransactionType::Withdrawal, Some(7), Some(42));
        assert_eq!(project_candidate(&w, 7).unwrap().account_id, Some(42));

        let d = ledger(2, TransactionType::Deposit, Some(42), Some(7));
        assert_eq!(project_candidate(&d, 7).unwrap().account_id, Some(42));
    }

    #[test]
    fn reconciliation_entries_are_never_candidates() {
        let tx = ledger(1, TransactionType::Reconciliation, Some(7), Some(7));
        assert!(project_candidate(&tx, 7).is_none());
    }

    fn candidate(description: &str, date: &str, score: Option<f64>) -> Candidate {
        Candidate {
            description: description.into(),
            date: dt(date),
            kind: DisplayTransactionType::Withdrawal,
            account_id: Some(42),
            score,
            notes: None,
        }
    }

    #[test]
    fn dedup_keeps_later_date_and_best_score() {
        let merged = deduplicate_candidates(
            vec![
                candidate("Groceries", "2025-08-10T00:00:00+00:00", Some(95.0)),
                candidate("Groceries", "2025-08-15T00:00:00+00:00", Some(94.0)),
                candidate("Rent", "2025-08-01T00:00:00+00:00", None),
            ],
            false,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, dt("2025-08-15T00:00:00+00:00"));
        assert_eq!(merged[0].score, Some(95.0));
        assert_eq!(merged[1].description, "Rent");
    }

    #[test]
    fn notes_distinguish_candidates_unless_ignored() {
        let a = Candidate {
            notes: Some("first".into()),
            ..candidate("Groceries", "2025-08-10T00:00:00+00:00", None)
        };
        let b = Candidate {
            notes: Some("second".into()),
            ..candidate("Groceries", "2025-08-10T00:00:00+00:00", None)
        };
        assert_eq!(deduplicate_candidates(vec![a.clone(), b.clone()], false).len(), 2);
        assert_eq!(deduplicate_candidates(vec![a, b], true).len(), 1);
    }

    #[test]
    fn best_candidates_apply_cutoff_and_limit() {
        let mut pool: Vec<Candidate> = (0..15)
            .map(|i| Candidate {
                notes: Some("Monthly rent payment".into()),
                ..candidate(&format!("Rent {i}"), "2025-08-10T00:00:00+00:00", None)
            })
            .collect();
        pool.push(Candidate {
            notes: Some("Something else entirely".into()),
            ..candidate("Noise", "2025-08-10T00:00:00+00:00", None)
        });

        let options = ReconOptions::default();
        let best = best_candidates(&pool, Some("Monthly rent payment"), &options);
        assert_eq!(best.len(), options.max_candidates);
        assert!(best.iter().all(|c| c.score == Some(100.0)));
        assert!(best.iter().all(|c| c.description.starts_with("Rent")));

        assert!(best_candidates(&pool, None, &options).is_empty());
    }
}
