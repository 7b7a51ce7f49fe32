//! ticketdash - reports from exported support ticket logs
//!
//! This tool provides commands for:
//! - Importing a `;`-delimited ticket export and remembering it
//! - Printing a report for all periods or a single month, optionally
//!   narrowed to some analysts and one client, work item or tag
//! - Listing the months present in a log
//! - Clearing everything stored
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/ticketdash/ticketdash.db
//! - Config: $XDG_CONFIG_HOME/ticketdash/config.toml
//! - Logs: $XDG_STATE_HOME/ticketdash/

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use render::Report;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use ticketdash_core::analytics::{
    aggregate, available_periods, group_by_period, AnalystSelection, Dashboard, DimensionFilter,
    PeriodSelection,
};
use ticketdash_core::db::fingerprint_source;
use ticketdash_core::{Config, Database, Import, SessionState, UserInfo};

#[derive(Parser)]
#[command(name = "ticketdash")]
#[command(about = "Dashboard reports for exported support ticket logs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a ticket export and store it for later reports
    Setup {
        /// Path to the `;`-delimited export
        file: PathBuf,

        /// Your name, shown in report headers
        #[arg(long)]
        name: String,

        /// Your role, shown in report headers
        #[arg(long)]
        role: String,
    },

    /// Print a report
    Report {
        /// Report on this export instead of the stored one
        #[arg(long)]
        file: Option<PathBuf>,

        /// Month label to report on (default: all periods)
        #[arg(long)]
        month: Option<String>,

        /// Only tickets assigned to this analyst (repeatable)
        #[arg(long = "analyst")]
        analysts: Vec<String>,

        /// Only tickets of this client ("all" disables)
        #[arg(long, conflicts_with_all = ["work_item", "tag"])]
        client: Option<String>,

        /// Only tickets of this work item type ("all" disables)
        #[arg(long, conflicts_with = "tag")]
        work_item: Option<String>,

        /// Only tickets carrying this tag ("all" disables)
        #[arg(long)]
        tag: Option<String>,

        /// Export format (md = markdown, json = JSON)
        #[arg(long)]
        export: Option<String>,
    },

    /// List the months present in the log
    Months {
        /// Read this export instead of the stored one
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete all stored data
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = ticketdash_core::logging::init(&config.logging).ok();

    match args.command {
        Command::Setup { file, name, role } => cmd_setup(&config, file, name, role),
        Command::Report {
            file,
            month,
            analysts,
            client,
            work_item,
            tag,
            export,
        } => {
            let dimension = match (client, work_item, tag) {
                (Some(client), _, _) => DimensionFilter::client(&client),
                (_, Some(work_item), _) => DimensionFilter::work_item(&work_item),
                (_, _, Some(tag)) => DimensionFilter::tag(&tag),
                _ => DimensionFilter::none(),
            };
            let options = ReportOptions {
                period: month
                    .as_deref()
                    .map(PeriodSelection::parse)
                    .unwrap_or_default(),
                analysts: if analysts.is_empty() {
                    AnalystSelection::Overall
                } else {
                    AnalystSelection::selected(analysts)
                },
                dimension,
            };
            cmd_report(&config, file, options, export.as_deref())
        }
        Command::Months { file } => cmd_months(&config, file),
        Command::Reset { yes } => cmd_reset(yes),
    }
}

fn open_database() -> Result<Database> {
    let db_path = Config::database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    db.migrate().context("failed to run database migrations")?;
    Ok(db)
}

fn print_setup_hint() {
    println!("No ticket log stored yet.");
    println!();
    println!("Import one with:");
    println!();
    println!("  ticketdash setup <file.csv> --name <your name> --role <your role>");
}

fn cmd_setup(config: &Config, file: PathBuf, name: String, role: String) -> Result<()> {
    let name = name.trim().to_string();
    let role = role.trim().to_string();
    if name.is_empty() || role.is_empty() {
        anyhow::bail!("--name and --role must not be blank");
    }

    let import = Import::from_path(&file, &config.columns)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let user = UserInfo { name, role };
    let db = open_database()?;
    db.save_session(&import.rows, &user)
        .context("failed to store ticket log")?;

    // warm the cache for the default report
    let snapshot = aggregate(&import.records, &config.analytics);
    let source_hash = fingerprint_source(&import.rows, &config.columns, &config.analytics);
    db.save_snapshot(&snapshot, &source_hash)
        .context("failed to store snapshot")?;

    let periods = available_periods(&import.records);

    println!("Setup complete:");
    println!("  File:     {}", file.display());
    println!("  Tickets:  {}", import.records.len());
    println!(
        "  Periods:  {}",
        if periods.is_empty() {
            "-".to_string()
        } else {
            periods.join(", ")
        }
    );
    println!("  User:     {} ({})", user.name, user.role);

    Ok(())
}

struct ReportOptions {
    period: PeriodSelection,
    analysts: AnalystSelection,
    dimension: DimensionFilter,
}

impl ReportOptions {
    fn is_default_view(&self) -> bool {
        self.period == PeriodSelection::All
            && matches!(self.analysts, AnalystSelection::Overall)
            && !self.dimension.is_active()
    }

    fn describe_filters(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let AnalystSelection::Selected(analysts) = &self.analysts {
            if !analysts.is_empty() {
                let names: Vec<&str> = analysts.iter().map(String::as_str).collect();
                parts.push(format!("analysts {}", names.join(", ")));
            }
        }
        if let (true, Some(value)) = (self.dimension.is_active(), &self.dimension.value) {
            parts.push(format!("{} {}", self.dimension.dimension.name(), value));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

fn cmd_report(
    config: &Config,
    file: Option<PathBuf>,
    options: ReportOptions,
    export: Option<&str>,
) -> Result<()> {
    if let Some(format) = export {
        if !matches!(format, "md" | "json") {
            anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", format);
        }
    }

    // Load the rows from the file or the store
    let (import, user, db) = match file {
        Some(path) => {
            let import = Import::from_path(&path, &config.columns)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (import, None, None)
        }
        None => {
            let db = open_database()?;
            match db
                .load_session_or_setup()
                .context("failed to load stored ticket log")?
            {
                SessionState::Ready(session) => {
                    let import = Import::from_rows(session.rows, &config.columns);
                    (import, Some(session.user), Some(db))
                }
                SessionState::NeedsSetup => {
                    print_setup_hint();
                    return Ok(());
                }
            }
        }
    };

    let filters = options.describe_filters();

    // The unfiltered all-period view of a stored log can come from the cache
    if let (Some(db), true) = (&db, options.is_default_view()) {
        let source_hash = fingerprint_source(&import.rows, &config.columns, &config.analytics);
        let cached = db
            .load_snapshot(&source_hash)
            .context("failed to read snapshot cache")?;
        let snapshot = match cached {
            Some(stored) => {
                tracing::debug!(computed_at = %stored.computed_at, "Using cached snapshot");
                stored.snapshot
            }
            None => {
                let snapshot = aggregate(&import.records, &config.analytics);
                db.save_snapshot(&snapshot, &source_hash)
                    .context("failed to store snapshot")?;
                snapshot
            }
        };
        let periods = available_periods(&import.records);
        let report = Report {
            user: user.as_ref(),
            period: &options.period,
            snapshot: &snapshot,
            periods: periods.iter().map(String::as_str).collect(),
            variations: &[],
            filters,
        };
        return print_report(&report, export);
    }

    let mut dashboard = Dashboard::new(import.records, config.analytics.clone());
    dashboard.select_analysts(options.analysts);
    dashboard.set_dimension_filter(options.dimension);
    dashboard.set_period(options.period);

    if let PeriodSelection::Month(label) = dashboard.period() {
        if !dashboard.available_periods().contains(&label.as_str()) {
            eprintln!("No tickets for month '{}'.", label);
        }
    }

    let view = dashboard.view();
    let report = Report {
        user: user.as_ref(),
        period: view.period,
        snapshot: view.snapshot,
        periods: view.periods,
        variations: view.variations,
        filters,
    };
    print_report(&report, export)
}

fn print_report(report: &Report, export: Option<&str>) -> Result<()> {
    match export {
        Some("json") => render::print_json(report)?,
        Some("md") => render::print_markdown(report),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => render::print_terminal(report),
    }
    Ok(())
}

fn cmd_months(config: &Config, file: Option<PathBuf>) -> Result<()> {
    let import = match file {
        Some(path) => Import::from_path(&path, &config.columns)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let db = open_database()?;
            match db
                .load_session_or_setup()
                .context("failed to load stored ticket log")?
            {
                SessionState::Ready(session) => Import::from_rows(session.rows, &config.columns),
                SessionState::NeedsSetup => {
                    print_setup_hint();
                    return Ok(());
                }
            }
        }
    };

    let buckets = group_by_period(&import.records);
    if buckets.is_empty() {
        println!("No months found.");
        return Ok(());
    }

    for (label, records) in &buckets {
        println!("{:<12} {:>6} tickets", label, records.len());
    }

    Ok(())
}

fn cmd_reset(yes: bool) -> Result<()> {
    if !yes && !confirm("Delete all stored ticket data? This cannot be undone. [y/N] ")? {
        println!("Aborted.");
        return Ok(());
    }

    let db = open_database()?;
    let removed = db.clear().context("failed to clear stored data")?;
    println!("Cleared {} stored item(s).", removed);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
