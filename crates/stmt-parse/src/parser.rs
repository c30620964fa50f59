//! The configuration-driven row parser.
//!
//! Converts rows located below the statement header into canonical
//! transactions, joining two-sided transfer records by document number
//! where the configuration declares one. Any row-level problem aborts the
//! whole attempt; a partial statement is never returned.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use stmt_ingest::{TableReader, rows_after_header};
use stmt_model::{
    Account, AccountSettings, ColumnRole, Currency, Money, ParserSettings, RawCell, RawRow,
    StatementTransaction,
};

use crate::error::{AttemptFailure, ParseError, Result};
use crate::dates;

/// Everything a single parse attempt needs besides the bytes.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub account: &'a Account,
    pub settings: &'a ParserSettings,
    /// Case-insensitive note substrings whose transactions are dropped.
    pub blacklist: &'a [String],
    pub primary_currency: &'a Currency,
    pub timezone: FixedOffset,
}

/// Column indices resolved from the validated settings, read-only for the
/// whole attempt.
struct RoleIndex {
    date: usize,
    name: usize,
    iban: Option<usize>,
    currency_code: Option<usize>,
    amount: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    foreign_code: Option<usize>,
    foreign_amount: Option<usize>,
    doc_number: Option<usize>,
    commission: Option<usize>,
    balance: Option<usize>,
    /// (index, label) of every notes-contributing column, in column order.
    notes: Vec<(usize, String)>,
}

impl RoleIndex {
    fn resolve(settings: &ParserSettings) -> Self {
        let find = |role: ColumnRole| settings.column_with_role(role).map(|c| c.index);
        RoleIndex {
            // Validation guarantees these two exist.
            date: find(ColumnRole::Date).unwrap_or(0),
            name: find(ColumnRole::Name).unwrap_or(0),
            iban: find(ColumnRole::Iban),
            currency_code: find(ColumnRole::CurrencyCode),
            amount: find(ColumnRole::Amount),
            debit: find(ColumnRole::AmountDebit),
            credit: find(ColumnRole::AmountCredit),
            foreign_code: find(ColumnRole::ForeignCurrencyCode),
            foreign_amount: find(ColumnRole::ForeignAmount),
            doc_number: find(ColumnRole::DocNumber),
            commission: find(ColumnRole::Commission),
            balance: find(ColumnRole::RemainingBalance),
            notes: settings
                .notes_columns()
                .map(|(c, label)| (c.index, label.to_string()))
                .collect(),
        }
    }
}

/// One row after role binding, before join resolution.
#[derive(Debug, Clone)]
struct BoundRow {
    row: usize,
    date: DateTime<FixedOffset>,
    name: String,
    amount: Money,
    iban: Option<String>,
    currency_code: Option<String>,
    doc_number: Option<String>,
    foreign_code: Option<String>,
    foreign_amount: Option<Money>,
    balance: Option<Money>,
    /// (label, value) pairs for notes, in column order.
    notes_fields: Vec<(String, String)>,
}

/// Parse a whole statement: read pages, locate the header, parse rows,
/// then apply the notes-blacklist post-filter.
pub fn parse_statement(data: &[u8], ctx: &ParseContext<'_>) -> Result<Vec<StatementTransaction>> {
    let reader = TableReader::for_format(&ctx.settings.format)?;
    let pages = reader.read_pages(data)?;
    let header = ctx.settings.header();
    let rows = rows_after_header(pages, &header)?;
    let parsed = parse_rows(&rows, ctx)?;
    Ok(apply_blacklist(parsed, ctx.blacklist))
}

/// Parse data rows already located below the header.
pub fn parse_rows(rows: &[RawRow], ctx: &ParseContext<'_>) -> Result<Vec<StatementTransaction>> {
    let roles = RoleIndex::resolve(ctx.settings);

    let mut bound = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        bound.push(bind_row(index, row, &roles, ctx)?);
    }

    apply_balance_deltas(&mut bound, &roles);

    // Zero rows never join and never surface.
    bound.retain(|r| !r.amount.is_zero());

    let (own, partners) = partition_rows(bound, &roles, ctx);
    build_transactions(own, &partners, &roles, ctx)
}

fn cell<'a>(row: &'a RawRow, index: usize) -> &'a RawCell {
    row.get(index).unwrap_or(&RawCell::Empty)
}

fn text_at(row: &RawRow, index: usize) -> Option<String> {
    let c = cell(row, index);
    if c.is_empty() { None } else { Some(c.as_text()) }
}

fn bind_row(
    index: usize,
    row: &RawRow,
    roles: &RoleIndex,
    ctx: &ParseContext<'_>,
) -> Result<BoundRow> {
    let sep = ctx.settings.decimal_separator;

    let money_at = |idx: usize| -> Result<Option<Money>> {
        let c = cell(row, idx);
        if c.is_empty() {
            return Ok(None);
        }
        c.as_money(sep)
            .map(Some)
            .ok_or_else(|| ParseError::AmountParse {
                row: index,
                value: c.as_text(),
            })
    };

    // Amount resolution: a single signed column, or a debit/credit pair.
    let mut amount = if let Some(idx) = roles.amount {
        money_at(idx)?.unwrap_or(Money::ZERO)
    } else {
        let debit = roles.debit.map(|i| money_at(i)).transpose()?.flatten();
        let credit = roles.credit.map(|i| money_at(i)).transpose()?.flatten();
        match (debit, credit) {
            (Some(_), Some(_)) => return Err(ParseError::BothDebitAndCredit { row: index }),
            (Some(d), None) => -d.abs(),
            (None, Some(c)) => c.abs(),
            (None, None) => Money::ZERO,
        }
    };

    // Commission folds into the amount with the amount's own sign;
    // an unparseable commission is ignored, not fatal.
    if let Some(idx) = roles.commission {
        if !amount.is_zero() {
            if let Some(fee) = cell(row, idx).as_money(sep) {
                amount += fee.abs().with_sign_of(amount);
            }
        }
    }

    let date_cell = cell(row, roles.date);
    let naive = match date_cell {
        RawCell::DateTime(naive) => Some(*naive),
        other => {
            let value = other.as_text();
            dates::parse_naive(value.trim(), &ctx.settings.date_format)
        }
    };
    let date = naive
        .and_then(|n| dates::attach_offset(n, ctx.timezone))
        .ok_or_else(|| ParseError::DateParse {
            row: index,
            value: date_cell.as_text(),
            format: ctx.settings.date_format.clone(),
        })?;

    let balance = roles
        .balance
        .and_then(|idx| cell(row, idx).as_money(sep));

    let notes_fields = roles
        .notes
        .iter()
        .filter_map(|(idx, label)| text_at(row, *idx).map(|value| (label.clone(), value)))
        .collect();

    Ok(BoundRow {
        row: index,
        date,
        name: text_at(row, roles.name).unwrap_or_default(),
        amount,
        iban: roles.iban.and_then(|idx| text_at(row, idx)),
        currency_code: roles.currency_code.and_then(|idx| text_at(row, idx)),
        doc_number: roles.doc_number.and_then(|idx| text_at(row, idx)),
        foreign_code: roles.foreign_code.and_then(|idx| text_at(row, idx)),
        foreign_amount: roles
            .foreign_amount
            .map(|idx| money_at(idx))
            .transpose()?
            .flatten(),
        balance,
        notes_fields,
    })
}

/// Recompute amount signs from consecutive remaining balances.
///
/// Rows arrive in strict reverse chronological order, so the effect of a
/// row on the balance is this row's balance minus the next row's. Only
/// the sign is taken; the parsed magnitude stays.
fn apply_balance_deltas(rows: &mut [BoundRow], roles: &RoleIndex) {
    if roles.balance.is_none() {
        return;
    }
    for i in 0..rows.len().saturating_sub(1) {
        let (Some(this), Some(next)) = (rows[i].balance, rows[i + 1].balance) else {
            continue;
        };
        let delta = this - next;
        if !delta.is_zero() {
            rows[i].amount = rows[i].amount.abs().with_sign_of(delta);
        }
    }
}

/// Split rows into own-account rows and a doc-number index of
/// counter-party rows. Without an IBAN role every row is an own row.
fn partition_rows(
    rows: Vec<BoundRow>,
    roles: &RoleIndex,
    ctx: &ParseContext<'_>,
) -> (Vec<BoundRow>, HashMap<String, BoundRow>) {
    let mut partners = HashMap::new();
    if roles.iban.is_none() {
        return (rows, partners);
    }

    let mut own = Vec::new();
    for row in rows {
        if row.iban == ctx.account.iban {
            own.push(row);
        } else if roles.doc_number.is_some() {
            if let Some(doc) = row.doc_number.clone() {
                partners.insert(doc, row);
            }
        }
        // Counter-party rows without a join key are someone else's legs.
    }

    // Own rows are emitted oldest-first.
    own.sort_by_key(|r| r.date);
    (own, partners)
}

fn build_transactions(
    own: Vec<BoundRow>,
    partners: &HashMap<String, BoundRow>,
    roles: &RoleIndex,
    ctx: &ParseContext<'_>,
) -> Result<Vec<StatementTransaction>> {
    let mut result = Vec::with_capacity(own.len());
    for row in own {
        let partner = roles
            .doc_number
            .and(row.doc_number.as_ref())
            .and_then(|doc| partners.get(doc));

        let tx = match partner {
            Some(partner) => joined_transaction(&row, partner, ctx)?,
            None => single_transaction(&row, ctx),
        };
        result.push(tx);
    }
    Ok(result)
}

fn render_notes(fields: &[(String, String)], suffix: &str) -> Vec<String> {
    fields
        .iter()
        .map(|(label, value)| format!("{label}{suffix}: {value}"))
        .collect()
}

fn finish_notes(lines: Vec<String>) -> Option<String> {
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn single_transaction(row: &BoundRow, ctx: &ParseContext<'_>) -> StatementTransaction {
    // Direct foreign columns only count when they name another currency.
    let (foreign_amount, foreign_currency_code) = match (&row.foreign_code, row.foreign_amount) {
        (Some(code), Some(amount)) if *code != ctx.primary_currency.code => {
            (Some(amount.with_sign_of(row.amount)), Some(code.clone()))
        }
        _ => (None, None),
    };

    StatementTransaction {
        name: row.name.clone(),
        date: row.date,
        amount: row.amount,
        foreign_amount,
        foreign_currency_code,
        notes: finish_notes(render_notes(&row.notes_fields, "")),
    }
}

/// Merge the two legs of a transfer joined by document number.
fn joined_transaction(
    own: &BoundRow,
    partner: &BoundRow,
    ctx: &ParseContext<'_>,
) -> Result<StatementTransaction> {
    if own.amount.signum() * partner.amount.signum() >= 0 {
        return Err(ParseError::SameDirection {
            row: own.row,
            doc: own.doc_number.clone().unwrap_or_default(),
        });
    }

    // The partner leg carries the foreign side when its currency differs.
    let (foreign_amount, foreign_currency_code) = match &partner.currency_code {
        Some(code) if *code != ctx.primary_currency.code => (
            Some(partner.amount.with_sign_of(own.amount)),
            Some(code.clone()),
        ),
        _ => (None, None),
    };

    // Debit leg renders first, whichever side of the join it is.
    let (debit_leg, credit_leg) = if own.amount.is_negative() {
        (own, partner)
    } else {
        (partner, own)
    };
    let mut lines = render_notes(&debit_leg.notes_fields, " [D]");
    lines.extend(render_notes(&credit_leg.notes_fields, " [C]"));

    Ok(StatementTransaction {
        name: own.name.clone(),
        date: own.date.min(partner.date),
        amount: own.amount,
        foreign_amount,
        foreign_currency_code,
        notes: finish_notes(lines),
    })
}

fn apply_blacklist(
    transactions: Vec<StatementTransaction>,
    blacklist: &[String],
) -> Vec<StatementTransaction> {
    if blacklist.is_empty() {
        return transactions;
    }
    let needles: Vec<String> = blacklist.iter().map(|b| b.to_lowercase()).collect();
    transactions
        .into_iter()
        .filter(|tx| {
            let Some(notes) = &tx.notes else { return true };
            let haystack = notes.to_lowercase();
            !needles.iter().any(|needle| haystack.contains(needle))
        })
        .collect()
}

/// Try each candidate settings document in turn; the first attempt that
/// parses wins. Every attempt's error is kept and reported together when
/// all of them fail.
pub fn parse_with_any(
    data: &[u8],
    attempts: &[(String, AccountSettings)],
    account: &Account,
    primary_currency: &Currency,
    timezone: FixedOffset,
) -> Result<Vec<StatementTransaction>> {
    let mut failures = Vec::new();
    for (label, settings) in attempts {
        let outcome = match &settings.parser_settings {
            None => Err(ParseError::NoParserSettings),
            Some(parser_settings) => {
                let ctx = ParseContext {
                    account,
                    settings: parser_settings,
                    blacklist: &settings.blacklist,
                    primary_currency,
                    timezone,
                };
                parse_statement(data, &ctx)
            }
        };
        match outcome {
            Ok(transactions) => {
                tracing::debug!(label = %label, count = transactions.len(), "statement parsed");
                return Ok(transactions);
            }
            Err(error) => {
                tracing::debug!(label = %label, %error, "format attempt failed");
                failures.push(AttemptFailure {
                    label: label.clone(),
                    error,
                });
            }
        }
    }
    Err(ParseError::AllAttemptsFailed(failures))
}
