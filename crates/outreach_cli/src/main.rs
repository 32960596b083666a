//! Operator command line for the company outreach tracker.
//!
//! Every invocation is one session: load, filter/edit, save, report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod args;
mod commands;

use args::{FieldArgs, FilterArgs};

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Track outreach to a list of companies stored in a flat file")]
#[command(version)]
struct Cli {
    /// Company file to read and write
    #[arg(
        long,
        global = true,
        env = "OUTREACH_FILE",
        default_value = "gaborone_companies_with_tracking.csv"
    )]
    file: PathBuf,
    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "OUTREACH_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "OUTREACH_LOG_LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records matching the filters
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export an editable view of the matching records as JSON
    View {
        #[command(flatten)]
        filter: FilterArgs,
        /// Write the view here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge an edited view back into the file and save
    Apply {
        /// Edited view document, or `-` for stdin
        input: String,
        /// Treat the view as per-record panels: no inserts or deletes, and
        /// dates are cleared whenever their status is not Yes
        #[arg(long)]
        panel: bool,
        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Append a new company
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit fields of one company by id
    Set {
        /// Record id as printed by `list`
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete companies by id
    Delete {
        /// Record ids as printed by `list`
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print contact status and date summaries
    Report {
        /// Print the summaries as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }
    log::debug!(
        "event=cli_start module=cli status=ok core_version={}",
        outreach_core::core_version()
    );

    let file = cli.file.as_path();
    match cli.command {
        Commands::List { filter, json } => commands::list(file, &filter.to_params(), json),
        Commands::View { filter, output } => {
            commands::view(file, &filter.to_params(), output.as_deref())
        }
        Commands::Apply {
            input,
            panel,
            dry_run,
        } => commands::apply(file, &input, panel, dry_run),
        Commands::Add { fields } => commands::add(file, fields.to_patch()?),
        Commands::Set { id, fields } => commands::set(file, &id, fields.to_patch()?),
        Commands::Delete { ids } => commands::delete(file, &ids),
        Commands::Report { json } => commands::report(file, json),
    }
}

fn start_logging(log_dir: &std::path::Path, level: Option<&str>) -> Result<()> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot resolve current directory for --log-dir")?
            .join(log_dir)
    };
    let level = level.unwrap_or_else(|| outreach_core::default_log_level());
    outreach_core::init_logging(level, &log_dir.to_string_lossy())?;
    Ok(())
}
