//! Joins and aggregations over the fetched datasets
//!
//! Everything here is pure: functions take slices of typed records and
//! return derived tables. Where "today" matters (how long a record has
//! stood), the date is an explicit argument.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::{Category, DataError, Level, Run};

/// Display label used for full-game runs, which have no level
pub const FULL_GAME_LABEL: &str = "Full Game";

/// A run joined to its level and category records
#[derive(Debug, Clone, Copy)]
pub struct JoinedRun<'a> {
    pub run: &'a Run,
    pub level: Option<&'a Level>,
    pub category: Option<&'a Category>,
}

impl JoinedRun<'_> {
    /// Short level label, or "Full Game" for full-game runs
    pub fn level_label(&self) -> Result<String, DataError> {
        match self.level {
            Some(level) => Ok(level.short_name()?.to_string()),
            None => Ok(FULL_GAME_LABEL.to_string()),
        }
    }

    /// Category display name, falling back to the raw id when the category
    /// dataset does not know it
    pub fn category_name(&self) -> &str {
        match self.category {
            Some(category) => category.name.as_str(),
            None => self.run.category.as_str(),
        }
    }
}

/// Joins runs to their level and category records
///
/// With `filter` set, drops runs by excluded guests and runs that are not
/// verified, which is what every report wants.
pub fn join_runs<'a>(
    runs: &'a [Run],
    levels: &'a [Level],
    categories: &'a [Category],
    filter: bool,
) -> Vec<JoinedRun<'a>> {
    let level_by_id: BTreeMap<&str, &Level> =
        levels.iter().map(|l| (l.id.as_str(), l)).collect();
    let category_by_id: BTreeMap<&str, &Category> =
        categories.iter().map(|c| (c.id.as_str(), c)).collect();

    runs.iter()
        .filter(|run| !filter || (run.is_verified() && !run.is_excluded_guest()))
        .map(|run| JoinedRun {
            run,
            level: run
                .level
                .as_deref()
                .and_then(|id| level_by_id.get(id).copied()),
            category: category_by_id.get(run.category.as_str()).copied(),
        })
        .collect()
}

/// Counts individual-level runs per (level label, category name)
pub fn il_counts(joined: &[JoinedRun<'_>]) -> Result<BTreeMap<(String, String), usize>, DataError> {
    let mut counts = BTreeMap::new();
    for entry in joined {
        if !entry.run.is_individual_level() {
            continue;
        }
        let key = (entry.level_label()?, entry.category_name().to_string());
        *counts.entry(key).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Counts judged runs per examiner id, most active first
///
/// Takes the unfiltered run set: rejected runs were still examined by
/// somebody.
pub fn verifier_counts(runs: &[Run]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for run in runs {
        if let Some(examiner) = run.examiner() {
            *counts.entry(examiner).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(id, count)| (id.to_string(), count))
        .collect();
    // descending by count, id as tiebreak for stable output
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// A run that was the world record of its board when it happened
#[derive(Debug, Clone)]
pub struct RecordRun<'a> {
    pub run: &'a Run,
    pub level_label: String,
    pub category_name: String,
    /// Date the following record was set, absent while this one stands
    pub next_record_date: Option<NaiveDate>,
    /// Days the record stood, up to `as_of` for standing records
    pub stood_days: i64,
    /// Whether the record still stands
    pub is_active: bool,
}

/// Extracts the world-record progression from a joined run set
///
/// Runs are ordered by date then submission time per board (category x
/// level); a run is a record if its time matches the running minimum, ties
/// included. Runs without a date cannot be placed in the progression and are
/// skipped.
pub fn world_records<'a>(
    joined: &[JoinedRun<'a>],
    as_of: NaiveDate,
) -> Result<Vec<RecordRun<'a>>, DataError> {
    let mut dated: Vec<(&JoinedRun<'a>, NaiveDate)> = joined
        .iter()
        .filter_map(|entry| entry.run.date.map(|date| (entry, date)))
        .collect();
    dated.sort_by_key(|(entry, date)| (*date, entry.run.submitted));

    // Running minimum per board, and the indexes of the records found so far
    // on that board so the successor's date can be filled in afterwards.
    let mut best: BTreeMap<(String, String), f64> = BTreeMap::new();
    let mut records: Vec<RecordRun<'a>> = Vec::new();
    let mut board_records: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();

    for (entry, date) in dated {
        let key = (entry.category_name().to_string(), entry.level_label()?);
        let time = entry.run.primary_seconds();
        let is_record = match best.get(&key) {
            Some(current) => time <= *current,
            None => true,
        };
        if !is_record {
            continue;
        }
        best.insert(key.clone(), time);

        if let Some(indexes) = board_records.get(&key) {
            if let Some(&previous) = indexes.last() {
                records[previous].next_record_date = Some(date);
            }
        }
        board_records.entry(key.clone()).or_default().push(records.len());
        records.push(RecordRun {
            run: entry.run,
            category_name: key.0,
            level_label: key.1,
            next_record_date: None,
            stood_days: 0,
            is_active: false,
        });
    }

    for record in &mut records {
        let set_on = record.run.date.unwrap_or(as_of);
        record.is_active = record.next_record_date.is_none();
        let until = record.next_record_date.unwrap_or(as_of);
        record.stood_days = (until - set_on).num_days();
    }

    Ok(records)
}

/// Options for [`longest_standing_records`]
#[derive(Debug, Clone, Copy)]
pub struct RecordFilter {
    /// Keep only records that still stand
    pub active_only: bool,
    /// Keep only full-game records
    pub full_game_only: bool,
    /// How many rows to return
    pub limit: usize,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            active_only: false,
            full_game_only: false,
            limit: 20,
        }
    }
}

/// The records that stood the longest, most durable first
pub fn longest_standing_records<'a>(
    mut records: Vec<RecordRun<'a>>,
    filter: RecordFilter,
) -> Vec<RecordRun<'a>> {
    records.retain(|record| {
        (!filter.active_only || record.is_active)
            && (!filter.full_game_only || !record.run.is_individual_level())
    });
    records.sort_by(|a, b| {
        b.stood_days
            .cmp(&a.stood_days)
            .then_with(|| a.run.id.cmp(&b.run.id))
    });
    records.truncate(filter.limit);
    records
}

/// The current board for one (category, level): each player's latest run,
/// fastest first
pub fn current_leaderboard<'a>(
    joined: &[JoinedRun<'a>],
    category_name: &str,
    level_label: &str,
) -> Result<Vec<&'a Run>, DataError> {
    let mut matching: Vec<&JoinedRun<'a>> = Vec::new();
    for entry in joined {
        if entry.category_name() == category_name && entry.level_label()? == level_label {
            matching.push(entry);
        }
    }
    // Oldest first, so the map ends up holding each player's latest run
    matching.sort_by_key(|entry| (entry.run.date, entry.run.submitted));

    let mut latest: BTreeMap<String, &'a Run> = BTreeMap::new();
    for entry in matching {
        if let Some(key) = entry.run.player_key() {
            latest.insert(key, entry.run);
        }
    }

    let mut board: Vec<&'a Run> = latest.into_values().collect();
    board.sort_by(|a, b| {
        a.primary_seconds()
            .total_cmp(&b.primary_seconds())
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(board)
}
