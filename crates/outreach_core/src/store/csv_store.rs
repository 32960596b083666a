//! Flat-file record store.
//!
//! # Responsibility
//! - Decode the ten-column company file into a `RecordSet`.
//! - Encode a `RecordSet` back in canonical column order.
//! - Replace the target file atomically on save.
//!
//! # Invariants
//! - Columns are looked up by header name; extra columns are ignored.
//! - Every save writes all ten columns, even for empty optional fields.
//! - Saves inside one process are serialized.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use log::{error, info, warn};
use tempfile::NamedTempFile;

use super::codec::{parse_rows, push_row};
use super::{RecordStore, StoreError, StoreResult};
use crate::model::record::{
    parse_date, ContactStatus, Record, RecordSet, RECORD_COLUMNS,
};

static SAVE_LOCK: Mutex<()> = Mutex::new(());

/// Record store backed by one delimited text file.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&self) -> StoreResult<RecordSet> {
        let started_at = Instant::now();
        info!("event=store_load module=store status=start");

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=store_load module=store status=ok rows=0 missing_file=true duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(RecordSet::new());
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error duration_ms={} error_code=read_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(StoreError::io(&self.path, err));
            }
        };

        match decode_records(&text) {
            Ok(records) => {
                info!(
                    "event=store_load module=store status=ok rows={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(records)
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error duration_ms={} error_code=decode_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn save(&self, records: &RecordSet) -> StoreResult<()> {
        let _guard = SAVE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let started_at = Instant::now();
        info!(
            "event=store_save module=store status=start rows={}",
            records.len()
        );

        let payload = encode_records(records);
        match replace_file(&self.path, payload.as_bytes()) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok rows={} bytes={} duration_ms={}",
                    records.len(),
                    payload.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error duration_ms={} error_code=write_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Decodes file content into records.
///
/// Empty content yields an empty set. Record ids are derived from each
/// row's normalized content and its occurrence among identical rows.
///
/// # Errors
/// - `MissingColumns` when the header lacks schema columns.
/// - `InvalidData` when a row has more fields than the header or a quote
///   is left open.
pub fn decode_records(text: &str) -> StoreResult<RecordSet> {
    let mut rows = parse_rows(text)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(RecordSet::new());
    };

    let header_names = header
        .fields
        .iter()
        .map(|name| name.trim())
        .collect::<Vec<_>>();
    let mut column_index = [0usize; RECORD_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, column) in column_index.iter_mut().zip(RECORD_COLUMNS) {
        match header_names.iter().position(|name| *name == column) {
            Some(index) => *slot = index,
            None => missing.push(column.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(StoreError::MissingColumns(missing));
    }

    let extra_columns = extra_column_count(&header_names);
    if extra_columns > 0 {
        warn!("event=store_schema module=store status=ok extra_columns={extra_columns}");
    }

    let mut records = RecordSet::new();
    let mut unknown_statuses = 0usize;
    for row in rows {
        if row.fields.len() > header_names.len() {
            return Err(StoreError::InvalidData {
                line: row.line,
                message: format!(
                    "expected at most {} fields, found {}",
                    header_names.len(),
                    row.fields.len()
                ),
            });
        }

        let value = |column: usize| cell(&row.fields, column_index[column]);
        let mut status = |column: usize| -> ContactStatus {
            ContactStatus::parse(value(column)).unwrap_or_else(|| {
                unknown_statuses += 1;
                ContactStatus::Unset
            })
        };

        let contacted = status(5);
        let response_received = status(7);
        let mut record = Record::with_id(uuid::Uuid::nil(), value(0));
        record.address = value(1).to_string();
        record.phone = value(2).to_string();
        record.website = value(3).to_string();
        record.description = value(4).to_string();
        record.contacted = contacted;
        record.date_contacted = parse_date(value(6));
        record.response_received = response_received;
        record.response_date = parse_date(value(8));
        record.notes = value(9).to_string();
        records.push(record);
    }

    if unknown_statuses > 0 {
        warn!(
            "event=store_load module=store status=ok unknown_status_values={unknown_statuses} coerced_to=empty"
        );
    }

    records.assign_stored_ids();
    Ok(records)
}

/// Encodes records with the canonical header.
pub fn encode_records(records: &RecordSet) -> String {
    let mut out = String::new();
    push_row(&mut out, RECORD_COLUMNS);
    for record in records {
        let fields = record.to_row();
        push_row(&mut out, fields.iter().map(String::as_str));
    }
    out
}

// Duplicated schema columns are not extras.
fn extra_column_count(header_names: &[&str]) -> usize {
    header_names
        .iter()
        .filter(|name| !RECORD_COLUMNS.iter().any(|column| column == *name))
        .count()
}

fn cell(fields: &[String], index: usize) -> &str {
    fields.get(index).map(String::as_str).unwrap_or("")
}

fn replace_file(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| StoreError::io(temp.path(), err))?;

    // Keep the permissions of the file being replaced.
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|err| StoreError::io(temp.path(), err))?;
    }

    temp.persist(path)
        .map_err(|err| StoreError::io(path, err.error))?;
    Ok(())
}
