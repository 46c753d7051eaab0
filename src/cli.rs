//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_catalog_adapter::CsvCatalogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_store::InMemoryStore;
use crate::domain::error::PricelensError;
use crate::domain::fetch_cache::FetchCache;
use crate::domain::instrument::{parse_instruments, InstrumentId, InstrumentSet};
use crate::domain::performance::{format_performance, Trend};
use crate::domain::price_table::PriceTable;
use crate::domain::session::{Selection, Session, ViewOutcome, Window};
use crate::domain::settings::Settings;

pub const NO_SELECTION_MESSAGE: &str = "No instruments selected.";
pub const NO_DATA_MESSAGE: &str = "No data in range.";

pub type CsvSession = Session<CsvPriceAdapter, InMemoryStore>;

#[derive(Parser, Debug)]
#[command(
    name = "pricelens",
    about = "Closing prices and window performance for a set of equities"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the instruments in the catalog
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the first and last dates with data
    Bounds {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show prices and performance for a selection over a date window
    Show {
        #[arg(short, long)]
        config: PathBuf,
        /// Instrument codes, repeatable or comma-separated
        #[arg(short, long, value_delimiter = ',')]
        instrument: Vec<String>,
        /// Select every catalog instrument
        #[arg(long, conflicts_with = "instrument")]
        all: bool,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

/// Logs to stderr; `RUST_LOG` overrides the default `pricelens=info`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pricelens=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::List { config } => run_list(&config),
        Command::Bounds { config } => run_bounds(&config),
        Command::Show {
            config,
            instrument,
            all,
            from,
            to,
        } => run_show(&config, &instrument, all, Window { from, to }),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn load_settings(path: &PathBuf) -> Result<Settings, ExitCode> {
    let adapter = load_config(path)?;
    Settings::from_config(&adapter).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn open_session(settings: &Settings) -> Result<CsvSession, PricelensError> {
    let catalog = CsvCatalogAdapter {
        path: settings.catalog.path.clone(),
        delimiter: settings.catalog.delimiter,
        code_column: settings.catalog.code_column.clone(),
        suffix: settings.catalog.suffix.clone(),
    };
    let cache = FetchCache::new(
        CsvPriceAdapter::new(settings.prices_dir.clone()),
        InMemoryStore::new(),
    );
    Session::open(&catalog, cache, settings.fetch_range)
}

/// Builds the selection from CLI flags. Codes without an exchange suffix get
/// the catalog suffix appended.
pub fn resolve_selection(
    all: bool,
    codes: &[String],
    suffix: &str,
) -> Result<Selection, PricelensError> {
    if all {
        return Ok(Selection::All);
    }
    if codes.is_empty() {
        return Ok(Selection::None);
    }
    let parsed = parse_instruments(&codes.join(",")).map_err(|e| PricelensError::ConfigInvalid {
        section: "cli".into(),
        key: "instrument".into(),
        reason: e.to_string(),
    })?;
    let qualified: InstrumentSet = parsed
        .iter()
        .map(|id| qualify(id, suffix))
        .collect();
    Ok(Selection::from_picked(qualified))
}

fn qualify(id: &InstrumentId, suffix: &str) -> InstrumentId {
    if suffix.is_empty() || id.as_str().contains('.') {
        id.clone()
    } else {
        InstrumentId::new(format!("{}{}", id, suffix.to_uppercase()))
    }
}

fn run_list(config_path: &PathBuf) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let session = match open_session(&settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for instrument in session.instruments() {
        println!("{}", instrument);
    }
    eprintln!("{} instruments in catalog", session.instruments().len());
    ExitCode::SUCCESS
}

fn run_bounds(config_path: &PathBuf) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let bounds = open_session(&settings).and_then(|session| session.bounds());
    match bounds {
        Ok(Some(range)) => {
            println!("{}\t{}", range.start, range.end);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("{}", NO_DATA_MESSAGE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_show(config_path: &PathBuf, codes: &[String], all: bool, window: Window) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let outcome = resolve_selection(all, codes, &settings.catalog.suffix).and_then(|selection| {
        let session = open_session(&settings)?;
        for code in session.unknown(&selection) {
            eprintln!("warning: {code} is not in the catalog");
        }
        session.view(&selection, window)
    });

    match outcome {
        Ok(outcome) => {
            print!("{}", render_outcome(&outcome, settings.show_table));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Text rendering of a view: optional price table, then one performance line
/// per instrument.
pub fn render_outcome(outcome: &ViewOutcome, show_table: bool) -> String {
    let mut out = String::new();
    match outcome {
        ViewOutcome::NoSelection => {
            let _ = writeln!(out, "{}", NO_SELECTION_MESSAGE);
        }
        ViewOutcome::NoDataInRange { range } => {
            match range {
                Some(range) => {
                    let _ = writeln!(out, "{} ({})", NO_DATA_MESSAGE, range);
                }
                None => {
                    let _ = writeln!(out, "{}", NO_DATA_MESSAGE);
                }
            }
        }
        ViewOutcome::Ready { view, report } => {
            if show_table {
                out.push_str(&render_table(view.table()));
                out.push('\n');
            }
            let _ = writeln!(out, "=== Performance ({}) ===", view.range);
            for (instrument, pct) in &report.performance {
                let marker = match Trend::of(*pct) {
                    Trend::Gain => "▲",
                    Trend::Loss => "▼",
                    Trend::Unchanged => "=",
                };
                let _ = writeln!(out, "{} {}", marker, format_performance(instrument, *pct));
            }
            for degenerate in &report.degenerate {
                let _ = writeln!(out, "  {}: n/a (zero baseline)", degenerate.instrument);
            }
            for instrument in &report.excluded {
                let _ = writeln!(out, "  {}: n/a (no quote at window edge)", instrument);
            }
        }
    }
    out
}

pub fn render_table(table: &PriceTable) -> String {
    let ids: Vec<&InstrumentId> = table.instruments().collect();
    let widths: Vec<usize> = ids.iter().map(|id| id.as_str().len().max(10)).collect();

    let mut out = String::new();
    let _ = write!(out, "{:<10}", "date");
    for (id, width) in ids.iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", id.as_str(), width = *width);
    }
    out.push('\n');

    for (row, date) in table.dates().iter().enumerate() {
        let _ = write!(out, "{:<10}", date);
        for (id, width) in ids.iter().zip(&widths) {
            let cell = match table.value(row, id) {
                Some(v) => format!("{:.2}", v),
                None => "-".to_string(),
            };
            let _ = write!(out, "  {:>width$}", cell, width = *width);
        }
        out.push('\n');
    }
    out
}
