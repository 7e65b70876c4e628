//! Typed records for the speedrun.com API
//!
//! Every endpoint this tool touches gets an explicit record type, validated
//! at the deserialization boundary; downstream code never works on raw JSON
//! mappings. Field sets follow what the API actually returns for levels,
//! categories, runs, users, and leaderboards.

pub mod categories;
pub mod levels;
pub mod runs;

pub use levels::{level_era, short_display_name, Era};

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiError, Record};

/// Guest names whose runs are excluded from reports, mostly to get rid of
/// Stupid Rat
pub const EXCLUDED_GUESTS: &[&str] = &["Stupid Rat"];

/// Errors that can occur when loading or decoding datasets
#[derive(Debug, Error)]
pub enum DataError {
    /// The underlying API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A record came back in a shape the type did not accept
    #[error("failed to decode {what} record: {reason}")]
    Decode { what: &'static str, reason: String },

    /// A level name has no short display name yet; extend the mapping
    #[error("level name not mapped: {0}")]
    UnmappedLevel(String),

    /// A dataset could not be persisted
    #[error("failed to persist dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes a sequence of raw records into typed ones, order preserved
pub(crate) fn decode_records<T: DeserializeOwned>(
    what: &'static str,
    records: Vec<Record>,
) -> Result<Vec<T>, DataError> {
    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(Value::Object(record)).map_err(|e| DataError::Decode {
                what,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// A level of the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weblink: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
}

/// Whether a category applies to full-game runs or individual levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    #[serde(rename = "per-game")]
    PerGame,
    #[serde(rename = "per-level")]
    PerLevel,
}

/// A run category of the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(default)]
    pub weblink: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub miscellaneous: bool,
}

/// Verification state of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunStatus {
    /// Submitted, not yet judged
    New,
    Verified {
        #[serde(default)]
        examiner: Option<String>,
        #[serde(default, rename = "verify-date")]
        verify_date: Option<DateTime<Utc>>,
    },
    Rejected {
        #[serde(default)]
        examiner: Option<String>,
        #[serde(default)]
        reason: Option<String>,
    },
}

/// One entry of a run's player list: a registered user or an anonymous guest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rel", rename_all = "lowercase")]
pub enum RunPlayer {
    User {
        id: String,
        #[serde(default)]
        uri: Option<String>,
    },
    Guest {
        name: String,
        #[serde(default)]
        uri: Option<String>,
    },
}

/// Recorded times of a run; `primary_t` is the ranked time in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTimes {
    #[serde(default)]
    pub primary: Option<String>,
    pub primary_t: f64,
    #[serde(default)]
    pub realtime_t: Option<f64>,
    #[serde(default)]
    pub ingame_t: Option<f64>,
}

/// A single submitted run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub weblink: Option<String>,
    pub game: String,
    /// Level id for individual-level runs, absent for full-game runs
    #[serde(default)]
    pub level: Option<String>,
    pub category: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub status: RunStatus,
    pub players: Vec<RunPlayer>,
    /// Date the run was played
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// When the run was submitted to the site
    #[serde(default)]
    pub submitted: Option<DateTime<Utc>>,
    pub times: RunTimes,
    /// Variable-id -> value-id choices (difficulty, character, ...)
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Run {
    /// Whether this is an individual-level run
    pub fn is_individual_level(&self) -> bool {
        self.level.is_some()
    }

    /// The ranked time, in seconds
    pub fn primary_seconds(&self) -> f64 {
        self.times.primary_t
    }

    /// The first listed player
    pub fn player(&self) -> Option<&RunPlayer> {
        self.players.first()
    }

    /// The first listed player's user id, if they are a registered user
    pub fn player_id(&self) -> Option<&str> {
        match self.player() {
            Some(RunPlayer::User { id, .. }) => Some(id.as_str()),
            _ => None,
        }
    }

    /// A grouping key for the first listed player: user id, or the guest's
    /// name marked as such
    pub fn player_key(&self) -> Option<String> {
        match self.player() {
            Some(RunPlayer::User { id, .. }) => Some(id.clone()),
            Some(RunPlayer::Guest { name, .. }) => Some(format!("guest:{name}")),
            None => None,
        }
    }

    /// Whether the run belongs to a guest on the exclusion list
    pub fn is_excluded_guest(&self) -> bool {
        matches!(
            self.player(),
            Some(RunPlayer::Guest { name, .. }) if EXCLUDED_GUESTS.contains(&name.as_str())
        )
    }

    /// Whether the run has been verified
    pub fn is_verified(&self) -> bool {
        matches!(self.status, RunStatus::Verified { .. })
    }

    /// The verifying moderator's user id, if judged
    pub fn examiner(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Verified { examiner, .. } | RunStatus::Rejected { examiner, .. } => {
                examiner.as_deref()
            }
            RunStatus::New => None,
        }
    }
}

/// A registered speedrun.com user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub names: UserNames,
    #[serde(default)]
    pub weblink: Option<String>,
}

/// Display names of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNames {
    pub international: String,
    #[serde(default)]
    pub japanese: Option<String>,
}

/// The current board for one category, as returned by the leaderboards
/// endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub weblink: Option<String>,
    pub game: String,
    pub category: String,
    #[serde(default)]
    pub runs: Vec<PlacedRun>,
}

/// One leaderboard entry: a run and its place on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedRun {
    pub place: u32,
    pub run: Run,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A realistic runs-endpoint record, trimmed to the fields we keep
    fn sample_run_json() -> &'static str {
        r#"{
            "id": "yoq5pz8y",
            "weblink": "https://www.speedrun.com/pizza_tower/run/yoq5pz8y",
            "game": "o6gnpox1",
            "level": null,
            "category": "mke1y9x2",
            "comment": "cheese",
            "status": {
                "status": "verified",
                "examiner": "v81v7558",
                "verify-date": "2023-02-01T10:00:00Z"
            },
            "players": [{"rel": "user", "id": "zx7gd448", "uri": "https://www.speedrun.com/api/v1/users/zx7gd448"}],
            "date": "2023-01-29",
            "submitted": "2023-01-29T20:21:54Z",
            "times": {
                "primary": "PT24M39S",
                "primary_t": 1479.0,
                "realtime_t": 1479.0,
                "ingame_t": 0
            },
            "values": {"onv4x3x8": "21g6rwjq"}
        }"#
    }

    #[test]
    fn test_decode_full_game_run() {
        let run: Run = serde_json::from_str(sample_run_json()).unwrap();

        assert_eq!(run.id, "yoq5pz8y");
        assert!(!run.is_individual_level());
        assert!(run.is_verified());
        assert_eq!(run.examiner(), Some("v81v7558"));
        assert_eq!(run.player_id(), Some("zx7gd448"));
        assert!((run.primary_seconds() - 1479.0).abs() < f64::EPSILON);
        assert_eq!(run.date, NaiveDate::from_ymd_opt(2023, 1, 29));
    }

    #[test]
    fn test_decode_individual_level_run() {
        let run_json = r#"{
            "id": "abc",
            "game": "o6gnpox1",
            "level": "rw6yyy49",
            "category": "wdm1pm3k",
            "status": {"status": "new"},
            "players": [{"rel": "guest", "name": "Stupid Rat"}],
            "times": {"primary_t": 62.5}
        }"#;
        let run: Run = serde_json::from_str(run_json).unwrap();

        assert!(run.is_individual_level());
        assert!(!run.is_verified());
        assert!(run.examiner().is_none());
        assert!(run.player_id().is_none());
        assert_eq!(run.player_key().as_deref(), Some("guest:Stupid Rat"));
        assert!(run.is_excluded_guest());
    }

    #[test]
    fn test_rejected_status_keeps_examiner_and_reason() {
        let status_json = r#"{"status": "rejected", "examiner": "v81v7558", "reason": "splices"}"#;
        let status: RunStatus = serde_json::from_str(status_json).unwrap();

        assert_eq!(
            status,
            RunStatus::Rejected {
                examiner: Some("v81v7558".to_string()),
                reason: Some("splices".to_string()),
            }
        );
    }

    #[test]
    fn test_run_status_roundtrips_through_serde() {
        let status = RunStatus::Verified {
            examiner: Some("v81v7558".to_string()),
            verify_date: None,
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"verified\""));
        let back: RunStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_decode_category_kinds() {
        let per_game = r#"{"id": "c1", "name": "Any%", "type": "per-game", "miscellaneous": false}"#;
        let per_level = r#"{"id": "c2", "name": "Normal", "type": "per-level"}"#;

        let game: Category = serde_json::from_str(per_game).unwrap();
        let level: Category = serde_json::from_str(per_level).unwrap();

        assert_eq!(game.kind, CategoryKind::PerGame);
        assert_eq!(level.kind, CategoryKind::PerLevel);
        assert!(!level.miscellaneous);
    }

    #[test]
    fn test_decode_user_names() {
        let user_json = r#"{
            "id": "zx7gd448",
            "names": {"international": "Alice", "japanese": null},
            "weblink": "https://www.speedrun.com/user/Alice"
        }"#;
        let user: User = serde_json::from_str(user_json).unwrap();

        assert_eq!(user.names.international, "Alice");
        assert!(user.names.japanese.is_none());
    }

    #[test]
    fn test_decode_leaderboard_with_placed_runs() {
        let lb_json = format!(
            r#"{{
                "weblink": "https://www.speedrun.com/pizza_tower#Any",
                "game": "o6gnpox1",
                "category": "mke1y9x2",
                "runs": [{{"place": 1, "run": {}}}]
            }}"#,
            sample_run_json()
        );
        let leaderboard: Leaderboard = serde_json::from_str(&lb_json).unwrap();

        assert_eq!(leaderboard.runs.len(), 1);
        assert_eq!(leaderboard.runs[0].place, 1);
        assert_eq!(leaderboard.runs[0].run.id, "yoq5pz8y");
    }

    #[test]
    fn test_decode_records_rejects_wrong_shape() {
        let record = serde_json::json!({"id": "l1"});
        let serde_json::Value::Object(map) = record else {
            unreachable!()
        };

        let result: Result<Vec<Run>, _> = decode_records("run", vec![map]);
        assert!(matches!(result, Err(DataError::Decode { what: "run", .. })));
    }

    #[test]
    fn test_non_excluded_guest_is_kept() {
        let run_json = r#"{
            "id": "abc",
            "game": "o6gnpox1",
            "category": "wdm1pm3k",
            "status": {"status": "new"},
            "players": [{"rel": "guest", "name": "SomeGuest"}],
            "times": {"primary_t": 100.0}
        }"#;
        let run: Run = serde_json::from_str(run_json).unwrap();

        assert!(!run.is_excluded_guest());
    }
}
