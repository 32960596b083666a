//! Edit-set reconciliation and session orchestration.
//!
//! # Responsibility
//! - Merge operator edits back into the authoritative record set.
//! - Hold session-scoped state between load and save.
//! - Keep operator surfaces decoupled from storage details.

pub mod reconcile;
pub mod session;
