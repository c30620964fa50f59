//! Reconciliation of parsed bank statements against ledger transactions.
//!
//! Produces a display list where every row is Matched, Annotated, New, or
//! Unmatched; the caller reviews it and pushes accepted rows back to the
//! bookkeeping service.

pub mod candidates;
pub mod engine;
pub mod similarity;

pub use candidates::{best_candidates, deduplicate_candidates, project_candidate};
pub use engine::{ReconOptions, reconcile};
