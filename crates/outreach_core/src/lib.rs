//! Core logic for the company outreach tracker.
//! This crate owns the record model, flat-file store, filtering,
//! edit reconciliation and reporting.

pub mod logging;
pub mod model;
pub mod report;
pub mod search;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{
    format_date, parse_date, ContactStatus, Record, RecordId, RecordPatch, RecordSet,
    RECORD_COLUMNS,
};
pub use report::{build_report, render_text, DateCount, Report, StatusDistribution};
pub use search::filter::{filter_records, FilterParams, StatusFilter};
pub use service::reconcile::{
    reconcile, ReconcileMode, ReconcileSummary, Reconciled, ViewRow, ViewSubset,
};
pub use service::session::{OutreachSession, SessionError, SessionResult};
pub use store::csv_store::CsvRecordStore;
pub use store::{RecordStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
