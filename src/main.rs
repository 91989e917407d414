//! Vacancy Watch main entry point
//!
//! This is the command-line interface for the Vacancy Watch job-listing tracker.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vacancy_watch::config::{load_config_with_hash, Config};
use vacancy_watch::crawler::{watch, CycleOutcome, RunCoordinator};
use vacancy_watch::output::{
    format_cycle_report, format_vacancy_list, load_statistics, print_statistics,
    write_cycle_report,
};
use vacancy_watch::storage::{open_storage, SqliteStorage, VacancyStore};

/// Vacancy Watch: an incremental job-vacancy tracker
///
/// Vacancy Watch scrapes paginated vacancy listings, works out which
/// vacancies are new or changed since the last run, keeps them in a local
/// database and notifies subscribed chats.
#[derive(Parser, Debug)]
#[command(name = "vacancy-watch")]
#[command(version = "1.0.0")]
#[command(about = "An incremental job-vacancy tracker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a cycle now and then repeatedly until Ctrl-C (default)
    Run,

    /// Run a single cycle and print its report
    Once {
        /// Search term for this cycle instead of the configured one
        #[arg(long)]
        term: Option<String>,

        /// Number of pages for this cycle instead of the configured count
        #[arg(long)]
        pages: Option<u32>,

        /// Also write the markdown report to this file
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Show the most recently added vacancies
    Latest {
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Search stored vacancies by title or skill
    Search {
        term: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show statistics from the database
    Stats,

    /// Subscribe a chat to new-vacancy notifications
    Subscribe {
        #[arg(allow_negative_numbers = true)]
        chat_id: i64,
    },

    /// Unsubscribe a chat
    Unsubscribe {
        #[arg(allow_negative_numbers = true)]
        chat_id: i64,
    },

    /// List subscribed chats
    Subscribers,

    /// Validate the configuration and show what would be scraped
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => handle_run(config).await,
        Command::Once { term, pages, report } => {
            handle_once(config, term, pages, report.as_deref()).await
        }
        Command::Latest { limit } => handle_latest(&config, limit),
        Command::Search { term, limit } => handle_search(&config, &term, limit),
        Command::Stats => handle_stats(&config),
        Command::Subscribe { chat_id } => handle_subscribe(&config, chat_id),
        Command::Unsubscribe { chat_id } => handle_unsubscribe(&config, chat_id),
        Command::Subscribers => handle_subscribers(&config),
        Command::CheckConfig => {
            handle_check_config(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vacancy_watch=info,warn"),
            1 => EnvFilter::new("vacancy_watch=debug,info"),
            2 => EnvFilter::new("vacancy_watch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Repeating mode until Ctrl-C
async fn handle_run(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Watching '{}' in region {} ({} pages per cycle)",
        config.scraper.search_term,
        config.scraper.region,
        config.scraper.page_count
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupt received, shutting down"),
            Err(e) => {
                tracing::error!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let cycles = watch(config, shutdown).await?;
    tracing::info!("Stopped after {} cycles", cycles);
    Ok(())
}

async fn handle_once(
    config: Config,
    term: Option<String>,
    pages: Option<u32>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let term = term.unwrap_or_else(|| config.scraper.search_term.clone());
    let pages = pages.unwrap_or(config.scraper.page_count);
    let coordinator = RunCoordinator::from_config(config)?;

    match coordinator.run_cycle_for(&term, pages).await? {
        CycleOutcome::Completed(report) => {
            println!("{}", format_cycle_report(&report));
            if let Some(path) = report_path {
                write_cycle_report(&report, path)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                println!("✓ Report written to: {}", path.display());
            }
        }
        CycleOutcome::AlreadyRunning => {
            println!(
                "A cycle is already running on {}",
                coordinator.config().storage.snapshot_dir
            )
        }
    }

    Ok(())
}

fn handle_latest(config: &Config, limit: usize) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let records = storage.query_latest(limit)?;

    if records.is_empty() {
        println!("No vacancies stored yet.");
    } else {
        println!("Latest {} vacancies:\n", records.len());
        print!("{}", format_vacancy_list(&records));
    }
    Ok(())
}

fn handle_search(config: &Config, term: &str, limit: usize) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let records = storage.query_by_keyword(term, limit)?;

    if records.is_empty() {
        println!("No vacancies matching '{}'.", term);
    } else {
        println!("Found {} vacancies matching '{}':\n", records.len(), term);
        print!("{}", format_vacancy_list(&records));
    }
    Ok(())
}

fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

fn handle_subscribe(config: &Config, chat_id: i64) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;
    if storage.add_subscription(chat_id)? {
        println!("✓ Chat {} subscribed", chat_id);
    } else {
        println!("Chat {} is already subscribed", chat_id);
    }
    Ok(())
}

fn handle_unsubscribe(config: &Config, chat_id: i64) -> anyhow::Result<()> {
    let mut storage = open_database(config)?;
    if storage.remove_subscription(chat_id)? {
        println!("✓ Chat {} unsubscribed", chat_id);
    } else {
        println!("Chat {} was not subscribed", chat_id);
    }
    Ok(())
}

fn handle_subscribers(config: &Config) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let subscribers = storage.list_subscribers()?;

    println!("Subscribers ({}):", subscribers.len());
    for chat_id in subscribers {
        println!("  - {}", chat_id);
    }
    Ok(())
}

/// Validates config and shows what would be scraped
fn handle_check_config(config: &Config) {
    println!("=== Vacancy Watch Configuration ===\n");

    println!("Scraper:");
    println!("  Search term: {}", config.scraper.search_term);
    println!("  Region: {}", config.scraper.region);
    println!("  Listings: {}", config.scraper.base_url);
    println!("  Pages per cycle: {}", config.scraper.page_count);
    println!("  Delay between pages: {}ms", config.scraper.page_delay_ms);
    println!("  Detail-page skills: {}", config.scraper.fetch_details);
    println!("  Stop at last page: {}", config.scraper.stop_at_last_page);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nSchedule:");
    println!("  Interval: {}s", config.schedule.interval_secs);
    println!("  Cooldown after failure: {}s", config.schedule.cooldown_secs);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Snapshots: {}", config.storage.snapshot_dir);

    println!("\nNotifications:");
    match &config.telegram {
        Some(telegram) => println!(
            "  Telegram via {} (preview {} per message batch)",
            telegram.api_base, telegram.preview_limit
        ),
        None => println!("  Disabled"),
    }

    println!("\n✓ Configuration is valid");
}
