use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use outreach_core::{
    format_date, render_text, CsvRecordStore, FilterParams, OutreachSession, ReconcileMode,
    ReconcileSummary, Record, RecordId, RecordPatch, ViewSubset,
};

type Session = OutreachSession<CsvRecordStore>;

fn open(file: &Path) -> Result<Session> {
    OutreachSession::open(CsvRecordStore::new(file))
        .with_context(|| format!("failed to load `{}`", file.display()))
}

fn save(session: &mut Session) -> Result<Vec<(RecordId, RecordId)>> {
    session.save().with_context(|| {
        format!(
            "changes were NOT saved to `{}`",
            session.store().path().display()
        )
    })
}

// Id of a record after a save re-keyed it.
fn stored_id(changed: &[(RecordId, RecordId)], id: RecordId) -> RecordId {
    changed
        .iter()
        .find(|(previous, _)| *previous == id)
        .map_or(id, |(_, current)| *current)
}

fn parse_id(value: &str) -> Result<RecordId> {
    RecordId::parse_str(value.trim()).with_context(|| format!("invalid record id `{value}`"))
}

pub fn list(file: &Path, params: &FilterParams, json: bool) -> Result<()> {
    let session = open(file)?;
    let records = session.filter(params);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!(
        "{:<36}  {:<32}  {:<9}  {:<10}  {:<8}  {:<10}",
        "ID", "COMPANY", "CONTACTED", "DATE", "RESPONSE", "DATE"
    );
    for record in &records {
        print_row(record);
    }
    println!("{} of {} companies", records.len(), session.records().len());
    Ok(())
}

fn print_row(record: &Record) {
    println!(
        "{:<36}  {:<32}  {:<9}  {:<10}  {:<8}  {:<10}",
        record.id,
        record.name,
        record.contacted.as_str(),
        format_date(record.date_contacted),
        record.response_received.as_str(),
        format_date(record.response_date)
    );
}

pub fn view(file: &Path, params: &FilterParams, output: Option<&Path>) -> Result<()> {
    let session = open(file)?;
    let view = session.view(params);
    let json = serde_json::to_string_pretty(&view)?;

    match output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("failed to write view to `{}`", path.display()))?;
            println!("wrote {} rows to {}", view.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn apply(file: &Path, input: &str, panel: bool, dry_run: bool) -> Result<()> {
    let text = if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read view from stdin")?;
        text
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read view `{input}`"))?
    };
    let view: ViewSubset =
        serde_json::from_str(&text).with_context(|| format!("invalid view document `{input}`"))?;

    let mode = if panel {
        ReconcileMode::Panel
    } else {
        ReconcileMode::Grid
    };
    let mut session = open(file)?;
    let summary = session.apply(&view, mode);
    print_summary(&summary);

    if dry_run {
        println!("dry run: nothing saved");
        return Ok(());
    }
    if session.is_dirty() {
        save(&mut session)?;
        println!("saved {} companies", session.records().len());
    } else {
        println!("no changes to save");
    }
    Ok(())
}

fn print_summary(summary: &ReconcileSummary) {
    println!(
        "updated={} inserted={} deleted={}",
        summary.updated, summary.inserted, summary.deleted
    );
    if summary.ignored_deletions > 0 || summary.ignored_rows > 0 {
        println!(
            "ignored: deletions={} new_rows={}",
            summary.ignored_deletions, summary.ignored_rows
        );
    }
    if summary.cleared_dates > 0 {
        println!("cleared dates on {} companies", summary.cleared_dates);
    }
}

pub fn add(file: &Path, patch: RecordPatch) -> Result<()> {
    if patch.name.as_deref().map_or(true, |name| name.trim().is_empty()) {
        anyhow::bail!("--name is required when adding a company");
    }

    let mut session = open(file)?;
    let id = session.insert(patch);
    let changed = save(&mut session)?;
    let id = stored_id(&changed, id);
    println!("{id}");
    Ok(())
}

pub fn set(file: &Path, id: &str, patch: RecordPatch) -> Result<()> {
    let id = parse_id(id)?;
    if patch.is_empty() {
        anyhow::bail!("nothing to change; pass at least one field flag");
    }

    let mut session = open(file)?;
    session.update(id, patch)?;
    let changed = save(&mut session)?;
    let id = stored_id(&changed, id);
    if let Some(record) = session.records().get(id) {
        print_row(record);
    }
    Ok(())
}

pub fn delete(file: &Path, ids: &[String]) -> Result<()> {
    let ids = ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<_>>>()?;

    let mut session = open(file)?;
    let removed = session.delete(&ids);
    if removed > 0 {
        save(&mut session)?;
    }
    println!("deleted {removed} of {} requested", ids.len());
    Ok(())
}

pub fn report(file: &Path, json: bool) -> Result<()> {
    let session = open(file)?;
    let report = session.report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}
