//! Run dataset and leaderboard snapshots
//!
//! The runs endpoint is the big one: every run ever submitted for the game,
//! fetched across hundreds of pages. Leaderboard snapshots are cheap by
//! comparison (one unpaginated request per category) and get stamped with
//! the fetch date so history accumulates.

use chrono::Utc;
use serde_json::Value;

use crate::api::ApiClient;
use crate::cache::DataStore;
use crate::config;

use super::{decode_records, DataError, Leaderboard, Run};

/// Fetches every run of the configured game from the API
pub async fn fetch_runs(api: &ApiClient) -> Result<Vec<Run>, DataError> {
    let records = api
        .fetch(config::RUNS.endpoint, config::RUNS.query_args)
        .await?;
    decode_records("run", records)
}

/// Loads the run dataset, preferring the local copy
pub async fn load_runs(
    api: &ApiClient,
    store: &DataStore,
    refresh: bool,
) -> Result<Vec<Run>, DataError> {
    if !refresh {
        if let Some(stored) = store.read::<Vec<Run>>(config::RUNS.name) {
            return Ok(stored.data);
        }
    }

    let runs = fetch_runs(api).await?;
    store.write(config::RUNS.name, &runs)?;
    Ok(runs)
}

/// Fetches the current board for one category
pub async fn fetch_leaderboard(
    api: &ApiClient,
    game_id: &str,
    category: &str,
) -> Result<Leaderboard, DataError> {
    let record = api
        .fetch_one(&format!("leaderboards/{game_id}/category/{category}"))
        .await?;
    serde_json::from_value(Value::Object(record)).map_err(|e| DataError::Decode {
        what: "leaderboard",
        reason: e.to_string(),
    })
}

/// Fetches and persists a dated snapshot of each tracked category's board
pub async fn snapshot_leaderboards(api: &ApiClient, store: &DataStore) -> Result<(), DataError> {
    let stamp = Utc::now().format("%Y-%m-%d");
    for category in config::LEADERBOARD_CATEGORIES {
        tracing::info!(category, "fetching leaderboard");
        let board = fetch_leaderboard(api, config::PIZZA_TOWER_ID, category).await?;
        store.write(&format!("leaderboard_{category}_{stamp}"), &board)?;
    }
    Ok(())
}
