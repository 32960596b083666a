//! Company outreach record model.
//!
//! # Responsibility
//! - Define the canonical company record and its ordered collection.
//! - Define field-level patches used by the edit surface.
//! - Coerce loosely formatted date text into calendar dates.
//!
//! # Invariants
//! - Stored-row ids depend only on a row's content and its occurrence among
//!   rows with identical content, never on its position in the file.
//! - Unparseable dates become `None`, never an error.
//! - `date_contacted`/`response_date` may be set while the matching status
//!   is not `Yes`; enforcing that is a reconciliation policy.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable identifier of a record inside one session.
pub type RecordId = Uuid;

/// Namespace for identifiers derived from stored rows.
const STORED_ROW_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a47_93d5_4b0e_a8c1_5e27_d04b_9f36);

/// Canonical column order of the flat-file schema.
pub const RECORD_COLUMNS: [&str; 10] = [
    "Company Name",
    "Address",
    "Phone Number",
    "Website (Profile Link)",
    "Description",
    "Contacted",
    "Date Contacted",
    "Response Received",
    "Response Date",
    "Notes",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Yes/No/empty marker used by the `Contacted` and `Response Received` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactStatus {
    Yes,
    No,
    /// Serialized as an empty value.
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl ContactStatus {
    /// Returns the flat-file literal for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Unset => "",
        }
    }

    /// Parses a stored literal, trimming whitespace and ignoring case.
    ///
    /// Returns `None` for anything other than `yes`, `no` or blank.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Some(Self::Unset);
        }
        if trimmed.eq_ignore_ascii_case("yes") {
            Some(Self::Yes)
        } else if trimmed.eq_ignore_ascii_case("no") {
            Some(Self::No)
        } else {
            None
        }
    }

    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

/// One company's outreach-tracking entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub description: String,
    pub contacted: ContactStatus,
    /// Meaningful only when `contacted == ContactStatus::Yes`.
    pub date_contacted: Option<NaiveDate>,
    pub response_received: ContactStatus,
    /// Meaningful only when `response_received == ContactStatus::Yes`.
    pub response_date: Option<NaiveDate>,
    pub notes: String,
}

impl Record {
    /// Creates an empty record with a freshly generated identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an empty record with a caller-provided identifier.
    pub fn with_id(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: String::new(),
            phone: String::new(),
            website: String::new(),
            description: String::new(),
            contacted: ContactStatus::Unset,
            date_contacted: None,
            response_received: ContactStatus::Unset,
            response_date: None,
            notes: String::new(),
        }
    }

    /// Renders the record as stored fields in canonical column order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.phone.clone(),
            self.website.clone(),
            self.description.clone(),
            self.contacted.as_str().to_string(),
            format_date(self.date_contacted),
            self.response_received.as_str().to_string(),
            format_date(self.response_date),
            self.notes.clone(),
        ]
    }

    /// Clears each date whose status is not `Yes`.
    ///
    /// Returns `true` when at least one date was cleared.
    pub fn clear_dates_without_status(&mut self) -> bool {
        let mut cleared = false;
        if !self.contacted.is_yes() && self.date_contacted.take().is_some() {
            cleared = true;
        }
        if !self.response_received.is_yes() && self.response_date.take().is_some() {
            cleared = true;
        }
        cleared
    }
}

/// Derives the identifier of a row read from storage.
///
/// `occurrence` counts earlier rows with identical content, so duplicate
/// rows still get distinct ids. Inserting, deleting or editing other rows
/// never changes the result.
pub fn stored_row_id(row: &[String], occurrence: usize) -> RecordId {
    let mut name = occurrence.to_string();
    for field in row {
        name.push('\u{1f}');
        name.push_str(field);
    }
    Uuid::new_v5(&STORED_ROW_NAMESPACE, name.as_bytes())
}

/// Coerces date-like text into a calendar date.
///
/// Accepts ISO dates, slash dates, date-times with optional fractional
/// seconds and RFC 3339 timestamps. Everything else yields `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Formats an optional date as `YYYY-MM-DD`, or empty when unset.
pub fn format_date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Field-level edit of one record.
///
/// `None` leaves a field untouched. The date fields distinguish
/// "untouched" (`None`) from "cleared" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacted: Option<ContactStatus>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_contacted: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_received: Option<ContactStatus>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecordPatch {
    /// Builds a patch carrying every field of `record` (grid row shape).
    pub fn full(record: &Record) -> Self {
        Self {
            name: Some(record.name.clone()),
            address: Some(record.address.clone()),
            phone: Some(record.phone.clone()),
            website: Some(record.website.clone()),
            description: Some(record.description.clone()),
            contacted: Some(record.contacted),
            date_contacted: Some(record.date_contacted),
            response_received: Some(record.response_received),
            response_date: Some(record.response_date),
            notes: Some(record.notes.clone()),
        }
    }

    /// Keeps only the outreach-tracking fields (statuses, dates and notes).
    pub fn tracking_only(&self) -> Self {
        Self {
            contacted: self.contacted,
            date_contacted: self.date_contacted,
            response_received: self.response_received,
            response_date: self.response_date,
            notes: self.notes.clone(),
            ..Self::default()
        }
    }

    /// Returns whether this patch touches no field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges present fields into `record`, leaving absent ones untouched.
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(value) = &self.name {
            record.name.clone_from(value);
        }
        if let Some(value) = &self.address {
            record.address.clone_from(value);
        }
        if let Some(value) = &self.phone {
            record.phone.clone_from(value);
        }
        if let Some(value) = &self.website {
            record.website.clone_from(value);
        }
        if let Some(value) = &self.description {
            record.description.clone_from(value);
        }
        if let Some(value) = self.contacted {
            record.contacted = value;
        }
        if let Some(value) = self.date_contacted {
            record.date_contacted = value;
        }
        if let Some(value) = self.response_received {
            record.response_received = value;
        }
        if let Some(value) = self.response_date {
            record.response_date = value;
        }
        if let Some(value) = &self.notes {
            record.notes.clone_from(value);
        }
    }

    /// Materializes a new record from this patch; absent fields stay empty.
    pub fn to_record(&self, id: RecordId) -> Record {
        let mut record = Record::with_id(id, "");
        self.apply_to(&mut record);
        record
    }
}

// Maps an explicit `null` to `Some(None)`; an absent key stays `None` via `default`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Ordered, authoritative collection of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the current position of `id`, if present.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Appends a record at the end of the set.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Re-derives every id from record content, as a fresh load would.
    ///
    /// Returns `(previous, current)` pairs for the ids that changed.
    pub fn assign_stored_ids(&mut self) -> Vec<(RecordId, RecordId)> {
        let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
        let mut changed = Vec::new();
        for record in &mut self.records {
            let row = record.to_row();
            let id = {
                let occurrence = seen.entry(row.clone()).or_insert(0);
                let id = stored_row_id(&row, *occurrence);
                *occurrence += 1;
                id
            };
            if record.id != id {
                changed.push((record.id, id));
                record.id = id;
            }
        }
        changed
    }

    /// Removes every record for which `remove` returns `true`.
    ///
    /// Returns the number of removed records.
    pub fn remove_where(&mut self, mut remove: impl FnMut(&Record) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !remove(record));
        before - self.records.len()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
