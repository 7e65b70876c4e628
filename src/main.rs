//! towerstats - fetch, cache, and summarize Pizza Tower speedrun data
//!
//! One-shot CLI: each invocation fetches or loads the datasets it needs,
//! runs one command, and exits. Failures propagate straight to main and
//! print; there is no partial-result recovery.

use std::error::Error;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use towerstats::api::ApiClient;
use towerstats::cache::{DataStore, NameCache};
use towerstats::cli::{Cli, Command, DatasetArg, Report};
use towerstats::config;
use towerstats::data::categories::load_categories;
use towerstats::data::levels::load_levels;
use towerstats::data::runs::{load_runs, snapshot_leaderboards};
use towerstats::data::{Category, DataError, Level, Run};
use towerstats::export::export_runs_csv;
use towerstats::stats;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("towerstats=info")),
        )
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new().with_progress(cli.progress);
    let store = DataStore::new().ok_or("could not determine a data directory")?;

    match cli.command {
        Command::Fetch { dataset } => fetch(&api, &store, dataset).await?,
        Command::Leaderboards => snapshot_leaderboards(&api, &store).await?,
        Command::Export { output, refresh } => {
            let (runs, levels, categories) = load_all(&api, &store, refresh).await?;
            let joined = stats::join_runs(&runs, &levels, &categories, true);
            export_runs_csv(&output, &joined)?;
            println!("Wrote {} runs to {}", joined.len(), output.display());
        }
        Command::Stats { report } => run_report(&api, &store, report).await?,
    }

    Ok(())
}

/// Fetches the requested dataset (or all of them) and persists each one
async fn fetch(api: &ApiClient, store: &DataStore, dataset: DatasetArg) -> Result<(), DataError> {
    if matches!(dataset, DatasetArg::Levels | DatasetArg::All) {
        let levels = load_levels(api, store, true).await?;
        println!("Fetched {} levels", levels.len());
    }
    if matches!(dataset, DatasetArg::Categories | DatasetArg::All) {
        let categories = load_categories(api, store, true).await?;
        println!("Fetched {} categories", categories.len());
    }
    if matches!(dataset, DatasetArg::Runs | DatasetArg::All) {
        let runs = load_runs(api, store, true).await?;
        println!("Fetched {} runs", runs.len());
    }
    Ok(())
}

/// Loads all three datasets, locally unless a refresh is requested
async fn load_all(
    api: &ApiClient,
    store: &DataStore,
    refresh: bool,
) -> Result<(Vec<Run>, Vec<Level>, Vec<Category>), DataError> {
    let runs = load_runs(api, store, refresh).await?;
    let levels = load_levels(api, store, refresh).await?;
    let categories = load_categories(api, store, refresh).await?;
    Ok((runs, levels, categories))
}

/// Runs one report over the stored datasets and prints it
async fn run_report(api: &ApiClient, store: &DataStore, report: Report) -> Result<(), Box<dyn Error>> {
    let (runs, levels, categories) = load_all(api, store, false).await?;

    match report {
        Report::Verifiers { names, limit } => {
            let ranked = stats::verifier_counts(&runs);
            let mut name_cache = NameCache::open(store.file_path(config::NAME_CACHE_FILE));
            println!("{:<24} {:>6}", "Verifier", "Runs");
            for (examiner, count) in ranked.into_iter().take(limit) {
                let label = if names {
                    name_cache.lookup(api, &examiner).await?
                } else {
                    examiner
                };
                println!("{label:<24} {count:>6}");
            }
        }
        Report::Records { active, full_game, limit } => {
            let joined = stats::join_runs(&runs, &levels, &categories, true);
            let records = stats::world_records(&joined, Utc::now().date_naive())?;
            let top = stats::longest_standing_records(
                records,
                stats::RecordFilter {
                    active_only: active,
                    full_game_only: full_game,
                    limit,
                },
            );
            println!(
                "{:<20} {:<18} {:>10} {:>8} {:>7}",
                "Category", "Level", "Time (s)", "Days", "Active"
            );
            for record in top {
                println!(
                    "{:<20} {:<18} {:>10.1} {:>8} {:>7}",
                    record.category_name,
                    record.level_label,
                    record.run.primary_seconds(),
                    record.stood_days,
                    if record.is_active { "yes" } else { "no" },
                );
            }
        }
        Report::IlCounts => {
            let joined = stats::join_runs(&runs, &levels, &categories, true);
            let counts = stats::il_counts(&joined)?;
            println!("{:<20} {:<20} {:>6}", "Level", "Category", "Runs");
            for ((level, category), count) in counts {
                println!("{level:<20} {category:<20} {count:>6}");
            }
        }
        Report::Leaderboard { category, level } => {
            let joined = stats::join_runs(&runs, &levels, &categories, true);
            let board = stats::current_leaderboard(&joined, &category, &level)?;
            println!("{category} - {level}");
            for (place, run) in board.iter().enumerate() {
                println!(
                    "{:>3}. {:<24} {:>10.1}",
                    place + 1,
                    run.player_key().unwrap_or_default(),
                    run.primary_seconds(),
                );
            }
        }
    }

    Ok(())
}
