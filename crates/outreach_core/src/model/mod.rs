//! Outreach tracking domain model.
//!
//! # Responsibility
//! - Define canonical record structures used by store, filter and
//!   reconciliation logic.
//! - Own the flat-file column schema and date coercion rules.
//!
//! # Invariants
//! - Every in-memory record is identified by a stable `RecordId`.
//! - Status/date pairs are not cross-validated by the model itself.

pub mod record;
