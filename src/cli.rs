//! Command-line interface parsing
//!
//! This module handles parsing of CLI arguments using clap: fetching
//! datasets, snapshotting leaderboards, exporting CSV, and printing reports.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Pizza Tower speedrun data: fetch, cache, and summarize
#[derive(Parser, Debug)]
#[command(name = "towerstats")]
#[command(about = "Pizza Tower speedrun data fetching and reports")]
#[command(version)]
pub struct Cli {
    /// Show a running record count while fetching
    #[arg(long, global = true)]
    pub progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a dataset from the API and persist it locally
    Fetch {
        /// Which dataset to fetch
        #[arg(value_enum, default_value_t = DatasetArg::All)]
        dataset: DatasetArg,
    },

    /// Store a dated snapshot of the tracked category leaderboards
    Leaderboards,

    /// Export the joined run table as CSV
    Export {
        /// Output file path
        output: PathBuf,

        /// Re-fetch datasets instead of using local copies
        #[arg(long)]
        refresh: bool,
    },

    /// Print a report over the stored datasets
    Stats {
        #[command(subcommand)]
        report: Report,
    },
}

/// Datasets the fetch command knows about
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetArg {
    Levels,
    Categories,
    Runs,
    All,
}

#[derive(Subcommand, Debug)]
pub enum Report {
    /// Who has verified the most runs
    Verifiers {
        /// Resolve examiner ids to display names (needs network on first use)
        #[arg(long)]
        names: bool,

        /// How many verifiers to list
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Longest-standing world records
    Records {
        /// Only records that still stand
        #[arg(long)]
        active: bool,

        /// Only full-game records
        #[arg(long)]
        full_game: bool,

        /// How many records to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Individual-level run counts per level and category
    IlCounts,

    /// Current board for one category and level
    Leaderboard {
        /// Category display name (e.g. "Any%")
        category: String,

        /// Level short name; defaults to the full-game board
        #[arg(default_value = "Full Game")]
        level: String,
    },
}
