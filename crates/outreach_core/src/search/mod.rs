//! Record filtering entry points.
//!
//! # Responsibility
//! - Derive operator views from the authoritative record set.
//!
//! # Invariants
//! - Filtering never mutates the record set.

pub mod filter;
