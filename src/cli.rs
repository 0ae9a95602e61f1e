use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use crate::api::{self, CoreRepo, Engine};
use crate::storage::{self, FileSystem, scenarios_from_yaml};

#[derive(Parser)]
#[clap(name = "tesorera", version = env!("CARGO_PKG_VERSION"), about = "Allocates incomes to expenses by priority")]
struct Cli {
    /// Storage root; defaults to the platform data directory
    #[clap(long, global = true)]
    root: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the allocation over the records file and save the report
    #[clap(alias = "run")]
    Prioritize {
        /// Reference date of the run; defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Show the records file as the engine sees it
    #[clap(alias = "show")]
    Records,

    /// Re-run the pipeline under scenario overrides from a YAML file
    Simulate {
        scenarios: PathBuf,
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// List saved report ids
    History {
        #[clap(long)]
        from: Option<String>,
        #[clap(long, default_value_t = 10)]
        limit: usize,
    },

    /// Print a saved report
    Report { id: String },

    /// Project upcoming payout dates of recurring incomes
    Schedule {
        #[clap(long, default_value_t = 6)]
        count: usize,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cant init storage: {0}")]
    StorageInit(String),
    #[error("no readable records at the storage root")]
    NoRecords,
    #[error("report {0} not found")]
    ReportNotFound(String),
    #[error("cant load scenarios: {0:?}")]
    Scenarios(storage::Error),
    #[error(transparent)]
    Api(#[from] api::Error),
}

fn default_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tesorera")
}

/// Entry point behind `main`: parses the command line and drives the
/// engine against file storage.
///
/// # Errors
/// Storage and lookup failures; engine runs themselves cannot fail.
pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let root = cli.root.clone().unwrap_or_else(default_root);
    let repo = FileSystem::init(&root).map_err(Error::StorageInit)?;
    info!("storage: {}", repo.location());

    match cli.command {
        Commands::Prioritize { date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let stored = api::run_and_save(&repo, &Engine::default(), today)?;
            println!("{stored}");
        }
        Commands::Records => {
            let records = api::get_records(&repo).ok_or(Error::NoRecords)?;
            println!(
                "{} incomes / {} expenses",
                records.incomes.len(),
                records.expenses.len()
            );
            for income in &records.incomes {
                println!("  {income}");
            }
            for expense in &records.expenses {
                println!("  {expense}");
            }
        }
        Commands::Simulate { scenarios, date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let scenarios = scenarios_from_yaml(&scenarios).map_err(Error::Scenarios)?;
            let records = api::get_records(&repo).ok_or(Error::NoRecords)?;
            let engine = Engine::default();
            for run in engine.simulate(&records.incomes, &records.expenses, &scenarios, today) {
                println!("=== scenario: {}", run.scenario);
                println!("{}", run.report);
            }
        }
        Commands::History { from, limit } => {
            let page = api::report_ids(&repo, from, limit);
            for id in page.iter() {
                println!("{id}");
            }
            if let Some(cursor) = page.next_cursor {
                println!("... more, continue with --from {cursor}");
            }
        }
        Commands::Report { id } => {
            let stored = api::report_by_id(&repo, &id).ok_or(Error::ReportNotFound(id))?;
            println!("{stored}");
        }
        Commands::Schedule { count } => {
            let records = api::get_records(&repo).ok_or(Error::NoRecords)?;
            for income in &records.incomes {
                println!("{} ({} monthly)", income, income.monthly_equivalent());
                for date in income.upcoming_dates(count) {
                    println!("  {date}");
                }
            }
        }
    }
    Ok(())
}
