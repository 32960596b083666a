//! Edit reconciliation.
//!
//! # Responsibility
//! - Merge an edited view subset (field edits, appended rows, deletion
//!   flags) into the authoritative record set.
//!
//! # Invariants
//! - Records absent from the view are never touched.
//! - Updates and insertions are applied before deletions; a record that is
//!   both edited and flagged for deletion is removed.
//! - Appended rows keep their edit-surface order at the end of the set.
//! - Deletion flags on unknown ids are ignored.
//! - `Panel` mode never inserts or deletes, only changes the tracking
//!   fields, and clears any date whose status is not `Yes` on the records
//!   it touches.

use std::collections::HashSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::record::{Record, RecordId, RecordPatch, RecordSet};

/// One row of an edited view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRow {
    /// `None` marks a row appended on the edit surface.
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub patch: RecordPatch,
    #[serde(default)]
    pub deleted: bool,
}

impl ViewRow {
    /// Full-row view of an existing record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: Some(record.id),
            patch: RecordPatch::full(record),
            deleted: false,
        }
    }

    /// Operator-appended row.
    pub fn appended(patch: RecordPatch) -> Self {
        Self {
            id: None,
            patch,
            deleted: false,
        }
    }
}

/// Filtered, possibly edited projection of the record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSubset {
    pub rows: Vec<ViewRow>,
}

impl ViewSubset {
    /// Builds an unedited grid view of `records`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        Self {
            rows: records.into_iter().map(ViewRow::from_record).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the view row carrying `id`.
    pub fn row_mut(&mut self, id: RecordId) -> Option<&mut ViewRow> {
        self.rows.iter_mut().find(|row| row.id == Some(id))
    }

    /// Appends a new row at the end of the view.
    pub fn append(&mut self, patch: RecordPatch) {
        self.rows.push(ViewRow::appended(patch));
    }

    /// Flags the row carrying `id` for deletion.
    ///
    /// Returns `false` when no row carries `id`.
    pub fn mark_deleted(&mut self, id: RecordId) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.deleted = true;
                true
            }
            None => false,
        }
    }
}

/// Shape of the edit surface that produced a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Editable grid: updates, appended rows and deletions.
    #[default]
    Grid,
    /// One panel per existing record: updates to statuses, dates and notes
    /// only, with dates cleared whenever their status is not `Yes`.
    Panel,
}

impl ReconcileMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Panel => "panel",
        }
    }
}

/// Counts of what a reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub updated: usize,
    pub inserted: usize,
    pub deleted: usize,
    /// Deletion flags whose id is not in the record set, or any flag in
    /// `Panel` mode.
    pub ignored_deletions: usize,
    /// Appended rows dropped in `Panel` mode.
    pub ignored_rows: usize,
    /// Records whose dates were cleared by the `Panel` date rule.
    pub cleared_dates: usize,
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub records: RecordSet,
    pub summary: ReconcileSummary,
}

/// Merges `view` into `base`, producing a new authoritative record set.
pub fn reconcile(base: &RecordSet, view: &ViewSubset, mode: ReconcileMode) -> Reconciled {
    let mut records = base.clone();
    let mut summary = ReconcileSummary::default();
    let mut deletions = HashSet::new();

    for row in &view.rows {
        let existing = row.id.filter(|id| records.contains(*id));

        if row.deleted {
            match (existing, mode) {
                (Some(id), ReconcileMode::Grid) => {
                    deletions.insert(id);
                }
                _ => summary.ignored_deletions += 1,
            }
        }

        if let Some(id) = existing {
            if let Some(record) = records.get_mut(id) {
                match mode {
                    ReconcileMode::Grid => row.patch.apply_to(record),
                    ReconcileMode::Panel => {
                        row.patch.tracking_only().apply_to(record);
                        if record.clear_dates_without_status() {
                            summary.cleared_dates += 1;
                        }
                    }
                }
                summary.updated += 1;
            }
            continue;
        }

        if row.deleted {
            continue;
        }
        if mode == ReconcileMode::Panel {
            summary.ignored_rows += 1;
            continue;
        }

        let id = match row.id {
            Some(id) => {
                debug!("event=reconcile_insert module=service status=ok explicit_id={id}");
                id
            }
            None => Uuid::new_v4(),
        };
        records.push(row.patch.to_record(id));
        summary.inserted += 1;
    }

    summary.deleted = records.remove_where(|record| deletions.contains(&record.id));

    info!(
        "event=reconcile module=service status=ok mode={} view_rows={} updated={} inserted={} deleted={} ignored_deletions={} ignored_rows={} cleared_dates={}",
        mode.as_str(),
        view.len(),
        summary.updated,
        summary.inserted,
        summary.deleted,
        summary.ignored_deletions,
        summary.ignored_rows,
        summary.cleared_dates
    );

    Reconciled { records, summary }
}
