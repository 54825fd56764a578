mod config;
mod display;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use holidaywatch_core::{Clock, HolidayRecord, HolidaySource, LocalClock, NotificationPolicy};
use holidaywatch_fetch::HolidayFetcher;
use holidaywatch_host::{Poller, fetch_catalog};
use holidaywatch_store::NotifiedStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "holidaywatch", version, about = "Public holiday notifier")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Keep running: check on startup, on schedule, and when a line is entered on stdin.
    Run,
    /// Run a single check cycle and exit.
    Check,
    /// List holidays for the current and next year.
    List {
        /// Only this year.
        #[arg(long)]
        year: Option<i32>,
        /// Only this month (of `--year`, or of the current year).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show the next upcoming holiday.
    Next,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.settings.log_file.as_deref())?;
    tracing::info!("holidaywatch v{}", env!("CARGO_PKG_VERSION"));

    let settings = cli.settings;
    let clock: Arc<dyn Clock> = Arc::new(LocalClock);
    let fetch_config = settings.fetch_config();
    let fetcher = HolidayFetcher::from_config(&fetch_config)
        .context("building holiday fetcher")?
        .with_span(tracing::info_span!("fetcher", base_url = %fetch_config.base_url));
    let source: Arc<dyn HolidaySource> = Arc::new(fetcher);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&settings, source, clock).await,
        Command::Check => check(&settings, source, clock).await,
        Command::List { year, month, json } => {
            list(source.as_ref(), clock.today(), year, month, json).await
        }
        Command::Next => {
            let today = clock.today();
            let catalog = fetch_catalog(source.as_ref(), today).await;
            println!("{}", display::describe_upcoming(catalog.upcoming(today), today));
            Ok(())
        }
    }
}

fn build_poller(
    settings: &Settings,
    source: Arc<dyn HolidaySource>,
    clock: Arc<dyn Clock>,
) -> Poller {
    let state_file = settings.state_file();
    let store_span = tracing::info_span!("notified_store", path = %state_file.display());
    let store = NotifiedStore::open_with_span(state_file, store_span);

    let poller_config = settings.poller_config();
    let interval_secs = poller_config.interval.as_secs();
    let poller_span = tracing::info_span!("poller", interval_secs);
    Poller::new(
        source,
        store,
        clock,
        NotificationPolicy::new(settings.policy_config()),
        poller_config,
    )
    .with_span(poller_span)
}

async fn run(
    settings: &Settings,
    source: Arc<dyn HolidaySource>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<()> {
    let poller = build_poller(settings, source, clock.clone());
    let (handle, mut events, task) = poller.spawn();
    let mut snapshots = handle.snapshots();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("Watching for holidays. Press Enter to check now, Ctrl-C to quit.");
    loop {
        tokio::select! {
            Some(n) = events.recv() => {
                println!("{}\n", display::format_notification(&n, Local::now().naive_local()));
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(s) = snapshot {
                    println!("{}\n", display::describe_upcoming(s.next.as_ref(), clock.today()));
                }
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    if !handle.check_now() {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    drop(snapshots);
    drop(handle);
    task.await.context("poller task panicked")?;
    Ok(())
}

async fn check(
    settings: &Settings,
    source: Arc<dyn HolidaySource>,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<()> {
    let mut poller = build_poller(settings, source, clock.clone());
    let snapshots = poller.subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();
    poller.run_cycle(&tx).await;
    drop(tx);

    while let Some(n) = rx.recv().await {
        println!("{}\n", display::format_notification(&n, Local::now().naive_local()));
    }
    let snapshot = snapshots.borrow().clone();
    if let Some(s) = snapshot {
        println!("{}", display::describe_upcoming(s.next.as_ref(), s.checked_on));
    }
    Ok(())
}

async fn list(
    source: &dyn HolidaySource,
    today: chrono::NaiveDate,
    year: Option<i32>,
    month: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let catalog = fetch_catalog(source, today).await;
    let records: Vec<&HolidayRecord> = match (year, month) {
        (y, Some(m)) => catalog.for_month(y.unwrap_or(today.year()), m),
        (Some(y), None) => catalog.for_year(y),
        (None, None) => catalog.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        display::print_holidays(&records, today);
    }
    Ok(())
}

/// stderr logging, plus an ANSI-free copy in `log_file` when given.
/// Verbosity comes from `RUST_LOG`, default `info`.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating log directory {}", dir.display()))?;
            }
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(f)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}
