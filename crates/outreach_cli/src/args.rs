use anyhow::{bail, Result};
use clap::Args;
use outreach_core::{parse_date, ContactStatus, FilterParams, RecordPatch, StatusFilter};

/// Filter options shared by `list` and `view`
#[derive(Args)]
pub struct FilterArgs {
    /// Case-insensitive company name substring
    #[arg(short, long, default_value = "")]
    pub name: String,
    /// Contacted filter (all|yes|no)
    #[arg(long, default_value = "all")]
    pub contacted: StatusFilter,
    /// Response filter (all|yes|no)
    #[arg(long, default_value = "all")]
    pub response: StatusFilter,
}

impl FilterArgs {
    pub fn to_params(&self) -> FilterParams {
        FilterParams {
            name_query: self.name.clone(),
            contacted: self.contacted,
            response: self.response,
        }
    }
}

/// Record fields; omitted flags leave the field untouched
#[derive(Args)]
pub struct FieldArgs {
    /// Company name
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// yes|no|unset
    #[arg(long, value_parser = parse_status)]
    pub contacted: Option<ContactStatus>,
    /// YYYY-MM-DD, or an empty value to clear
    #[arg(long)]
    pub date_contacted: Option<String>,
    /// yes|no|unset
    #[arg(long, value_parser = parse_status)]
    pub response_received: Option<ContactStatus>,
    /// YYYY-MM-DD, or an empty value to clear
    #[arg(long)]
    pub response_date: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl FieldArgs {
    pub fn to_patch(self) -> Result<RecordPatch> {
        Ok(RecordPatch {
            name: self.name,
            address: self.address,
            phone: self.phone,
            website: self.website,
            description: self.description,
            contacted: self.contacted,
            date_contacted: parse_date_arg("--date-contacted", self.date_contacted)?,
            response_received: self.response_received,
            response_date: parse_date_arg("--response-date", self.response_date)?,
            notes: self.notes,
        })
    }
}

fn parse_status(value: &str) -> Result<ContactStatus, String> {
    if value.trim().eq_ignore_ascii_case("unset") {
        return Ok(ContactStatus::Unset);
    }
    ContactStatus::parse(value).ok_or_else(|| format!("expected yes|no|unset, got `{value}`"))
}

fn parse_date_arg(
    flag: &str,
    value: Option<String>,
) -> Result<Option<Option<chrono::NaiveDate>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return Ok(Some(None));
    }
    match parse_date(&value) {
        Some(date) => Ok(Some(Some(date))),
        None => bail!("{flag}: cannot read `{value}` as a date (expected YYYY-MM-DD)"),
    }
}
