//! Session-scoped record state.
//!
//! # Responsibility
//! - Load the record set once per operator session.
//! - Route every edit through reconciliation.
//! - Persist on explicit save and surface save failures.
//!
//! # Invariants
//! - Edits are volatile until `save` succeeds.
//! - The in-memory set is replaced only by reconciliation results.
//! - After a successful save every id equals the id the next load derives.

use std::error::Error;
use std::fmt::{Display, Formatter};

use uuid::Uuid;

use crate::model::record::{Record, RecordId, RecordPatch, RecordSet};
use crate::report::{build_report, Report};
use crate::search::filter::{filter_records, FilterParams};
use crate::service::reconcile::{reconcile, ReconcileMode, ReconcileSummary, ViewRow, ViewSubset};
use crate::store::{RecordStore, StoreError};

pub type SessionResult<T> = Result<T, SessionError>;

/// Session error for store failures and unknown record ids.
#[derive(Debug)]
pub enum SessionError {
    Store(StoreError),
    NotFound(RecordId),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// One operator session over a record store.
pub struct OutreachSession<S: RecordStore> {
    store: S,
    records: RecordSet,
    dirty: bool,
}

impl<S: RecordStore> OutreachSession<S> {
    /// Starts a session by loading the store's record set.
    pub fn open(store: S) -> SessionResult<Self> {
        let records = store.load()?;
        Ok(Self {
            store,
            records,
            dirty: false,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Authoritative in-memory record set.
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Returns whether the in-memory set differs from the last load/save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Records matching `params`, in set order.
    pub fn filter(&self, params: &FilterParams) -> Vec<&Record> {
        filter_records(&self.records, params)
    }

    /// Editable view of the records matching `params`.
    pub fn view(&self, params: &FilterParams) -> ViewSubset {
        ViewSubset::from_records(self.filter(params))
    }

    /// Reconciles an edited view into the session's record set.
    pub fn apply(&mut self, view: &ViewSubset, mode: ReconcileMode) -> ReconcileSummary {
        let reconciled = reconcile(&self.records, view, mode);
        if reconciled.records != self.records {
            self.dirty = true;
            self.records = reconciled.records;
        }
        reconciled.summary
    }

    /// Appends one new record and returns its id.
    ///
    /// The id is session-local; `save` reports the id it is stored under.
    pub fn insert(&mut self, patch: RecordPatch) -> RecordId {
        let id = Uuid::new_v4();
        self.apply(
            &ViewSubset {
                rows: vec![ViewRow {
                    id: Some(id),
                    patch,
                    deleted: false,
                }],
            },
            ReconcileMode::Grid,
        );
        id
    }

    /// Merges `patch` into the record carrying `id`.
    ///
    /// # Errors
    /// - `SessionError::NotFound` when `id` is not in the record set.
    pub fn update(&mut self, id: RecordId, patch: RecordPatch) -> SessionResult<()> {
        if !self.records.contains(id) {
            return Err(SessionError::NotFound(id));
        }
        self.apply(
            &ViewSubset {
                rows: vec![ViewRow {
                    id: Some(id),
                    patch,
                    deleted: false,
                }],
            },
            ReconcileMode::Grid,
        );
        Ok(())
    }

    /// Deletes the records carrying `ids`; unknown ids are ignored.
    ///
    /// Returns the number of removed records.
    pub fn delete(&mut self, ids: &[RecordId]) -> usize {
        let view = ViewSubset {
            rows: ids
                .iter()
                .map(|id| ViewRow {
                    id: Some(*id),
                    patch: RecordPatch::default(),
                    deleted: true,
                })
                .collect(),
        };
        self.apply(&view, ReconcileMode::Grid).deleted
    }

    /// Writes the in-memory set back to the store.
    ///
    /// Records are then re-keyed the way a load derives ids. Returns
    /// `(previous, current)` pairs for every id that changed.
    ///
    /// # Errors
    /// - `SessionError::Store` when the store rejects the write; the
    ///   session stays dirty and ids are unchanged.
    pub fn save(&mut self) -> SessionResult<Vec<(RecordId, RecordId)>> {
        self.store.save(&self.records)?;
        self.dirty = false;
        Ok(self.records.assign_stored_ids())
    }

    /// Fresh summaries of the current record set.
    pub fn report(&self) -> Report {
        build_report(&self.records)
    }
}
