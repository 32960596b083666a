//! Read-only summaries of the record set.
//!
//! # Responsibility
//! - Count records per contact status.
//! - Count responses and contacts per calendar date.
//! - Render the summaries as text charts.
//!
//! # Invariants
//! - Summaries are recomputed from the record set on every call.
//! - The status distribution always carries both `Yes` and `No`.
//! - A date series with no dated record is omitted (`None`), never empty.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::record::{ContactStatus, Record, RecordSet};

const BAR_WIDTH: usize = 40;

/// Record count per `Contacted` value; unset values are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub yes: usize,
    pub no: usize,
}

/// Number of records dated on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// All three summaries for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub status_distribution: StatusDistribution,
    pub responses_over_time: Option<Vec<DateCount>>,
    pub contacts_over_time: Option<Vec<DateCount>>,
}

pub fn status_distribution(records: &RecordSet) -> StatusDistribution {
    records
        .iter()
        .fold(StatusDistribution::default(), |mut acc, record| {
            match record.contacted {
                ContactStatus::Yes => acc.yes += 1,
                ContactStatus::No => acc.no += 1,
                ContactStatus::Unset => {}
            }
            acc
        })
}

/// Responses per `response_date`, ascending.
pub fn responses_over_time(records: &RecordSet) -> Option<Vec<DateCount>> {
    count_by_date(records, |record| record.response_date)
}

/// Contacts per `date_contacted`, ascending.
pub fn contacts_over_time(records: &RecordSet) -> Option<Vec<DateCount>> {
    count_by_date(records, |record| record.date_contacted)
}

pub fn build_report(records: &RecordSet) -> Report {
    Report {
        status_distribution: status_distribution(records),
        responses_over_time: responses_over_time(records),
        contacts_over_time: contacts_over_time(records),
    }
}

fn count_by_date(
    records: &RecordSet,
    date_of: impl Fn(&Record) -> Option<NaiveDate>,
) -> Option<Vec<DateCount>> {
    let mut counts = BTreeMap::new();
    for date in records.iter().filter_map(date_of) {
        *counts.entry(date).or_insert(0usize) += 1;
    }
    if counts.is_empty() {
        return None;
    }

    Some(
        counts
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect(),
    )
}

/// Renders the report as labelled horizontal bar charts.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    let distribution = report.status_distribution;
    push_chart(
        &mut out,
        "Contacted Distribution",
        &[
            ("Yes".to_string(), distribution.yes),
            ("No".to_string(), distribution.no),
        ],
    );

    let series = [
        ("Responses Over Time", &report.responses_over_time),
        ("Contacts Over Time", &report.contacts_over_time),
    ];
    for (title, points) in series {
        let Some(points) = points else {
            continue;
        };
        let bars = points
            .iter()
            .map(|point| (point.date.format("%Y-%m-%d").to_string(), point.count))
            .collect::<Vec<_>>();
        out.push('\n');
        push_chart(&mut out, title, &bars);
    }

    out
}

fn push_chart(out: &mut String, title: &str, bars: &[(String, usize)]) {
    let label_width = bars.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = bars.iter().map(|(_, count)| *count).max().unwrap_or(0);

    let _ = writeln!(out, "{title}");
    for (label, count) in bars {
        let length = if max == 0 {
            0
        } else {
            (count * BAR_WIDTH).div_ceil(max)
        };
        let _ = writeln!(
            out,
            "  {label:<label_width$}  {} {count}",
            "#".repeat(length)
        );
    }
}
