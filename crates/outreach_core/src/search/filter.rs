//! Name/status filter over company records.
//!
//! # Responsibility
//! - Select records matching a name query and two status filters.
//!
//! # Invariants
//! - Sound and complete: a record is returned iff it satisfies every
//!   predicate.
//! - Name matching is a case-insensitive literal substring match; the
//!   query is never interpreted as a pattern.
//! - Input order is preserved.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use crate::model::record::{ContactStatus, Record, RecordSet};

/// Status filter choice for `Contacted` / `Response Received`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Yes,
    No,
}

impl StatusFilter {
    /// Returns whether `status` passes this filter.
    ///
    /// An unset status only passes `All`.
    pub fn matches(self, status: ContactStatus) -> bool {
        match self {
            Self::All => true,
            Self::Yes => status == ContactStatus::Yes,
            Self::No => status == ContactStatus::No,
        }
    }
}

/// Rejected status filter literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatusFilter(pub String);

impl Display for InvalidStatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported status filter `{}`; expected all|yes|no",
            self.0
        )
    }
}

impl Error for InvalidStatusFilter {}

impl FromStr for StatusFilter {
    type Err = InvalidStatusFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(InvalidStatusFilter(value.to_string())),
        }
    }
}

/// Filter parameters collected from the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Company name substring. Blank means "match every name".
    pub name_query: String,
    pub contacted: StatusFilter,
    pub response: StatusFilter,
}

impl FilterParams {
    /// Creates parameters with only a name query set.
    pub fn by_name(name_query: impl Into<String>) -> Self {
        Self {
            name_query: name_query.into(),
            ..Self::default()
        }
    }
}

/// Returns the records satisfying every predicate in `params`.
pub fn filter_records<'a>(records: &'a RecordSet, params: &FilterParams) -> Vec<&'a Record> {
    let name_matcher = NameMatcher::new(&params.name_query);

    records
        .iter()
        .filter(|record| {
            name_matcher.matches(&record.name)
                && params.contacted.matches(record.contacted)
                && params.response.matches(record.response_received)
        })
        .collect()
}

enum NameMatcher {
    Any,
    Pattern(Regex),
    /// Used when the escaped query exceeds the regex size limit.
    Lowercase(String),
}

impl NameMatcher {
    fn new(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            return Self::Any;
        }

        match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Self::Pattern(pattern),
            Err(_) => Self::Lowercase(query.to_lowercase()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Pattern(pattern) => pattern.is_match(name),
            Self::Lowercase(query) => name.to_lowercase().contains(query.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_records, FilterParams, StatusFilter};
    use crate::model::record::{ContactStatus, Record, RecordSet};

    fn record(name: &str, contacted: ContactStatus, response: ContactStatus) -> Record {
        let mut record = Record::new(name);
        record.contacted = contacted;
        record.response_received = response;
        record
    }

    fn sample() -> RecordSet {
        RecordSet::from_records(vec![
            record("Acme Holdings", ContactStatus::Yes, ContactStatus::Yes),
            record("Botswana Cargo", ContactStatus::Yes, ContactStatus::No),
            record("acme (Pty) Ltd", ContactStatus::No, ContactStatus::Unset),
            record("Kalahari Tech", ContactStatus::Unset, ContactStatus::Unset),
        ])
    }

    fn names<'a>(records: &[&'a Record]) -> Vec<&'a str> {
        records.iter().map(|record| record.name.as_str()).collect()
    }

    #[test]
    fn default_params_return_everything_in_order() {
        let records = sample();
        let view = filter_records(&records, &FilterParams::default());
        assert_eq!(view.len(), 4);
        assert_eq!(view[0].name, "Acme Holdings");
        assert_eq!(view[3].name, "Kalahari Tech");
    }

    #[test]
    fn name_query_is_case_insensitive_substring() {
        let records = sample();
        let view = filter_records(&records, &FilterParams::by_name("ACME"));
        assert_eq!(names(&view), vec!["Acme Holdings", "acme (Pty) Ltd"]);
    }

    #[test]
    fn name_query_metacharacters_are_literal() {
        let records = sample();
        let view = filter_records(&records, &FilterParams::by_name("(pty)"));
        assert_eq!(names(&view), vec!["acme (Pty) Ltd"]);

        let none = filter_records(&records, &FilterParams::by_name(".*"));
        assert!(none.is_empty());
    }

    #[test]
    fn blank_name_query_is_vacuous() {
        let records = sample();
        assert_eq!(filter_records(&records, &FilterParams::by_name("   ")).len(), 4);
    }

    #[test]
    fn status_filters_exclude_unset_values() {
        let records = sample();
        let params = FilterParams {
            contacted: StatusFilter::No,
            ..FilterParams::default()
        };
        assert_eq!(names(&filter_records(&records, &params)), vec!["acme (Pty) Ltd"]);

        let params = FilterParams {
            name_query: "a".to_string(),
            contacted: StatusFilter::Yes,
            response: StatusFilter::No,
        };
        assert_eq!(names(&filter_records(&records, &params)), vec!["Botswana Cargo"]);
    }

    #[test]
    fn status_filter_parses_operator_input() {
        assert_eq!(" Yes ".parse::<StatusFilter>().unwrap(), StatusFilter::Yes);
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("maybe".parse::<StatusFilter>().is_err());
    }
}
