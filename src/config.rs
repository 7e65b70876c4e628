//! Static configuration for the speedrun.com API and local data files
//!
//! Holds the API base URL, the Pizza Tower game ids, and the table of
//! datasets this tool knows how to fetch and persist.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Base URL for the speedrun.com REST API (v1)
pub const SRC_API_URL: &str = "https://www.speedrun.com/api/v1";

/// Pizza Tower game id on speedrun.com
pub const PIZZA_TOWER_ID: &str = "o6gnpox1";

/// Pizza Tower: Comprehensive Edition game id on speedrun.com
#[allow(dead_code)]
pub const PIZZA_TOWER_CE_ID: &str = "pdv99xv1";

/// File name of the persisted player-name cache, under the data directory
pub const NAME_CACHE_FILE: &str = "user_names.json";

/// Full-game categories tracked by the `leaderboards` command
pub const LEADERBOARD_CATEGORIES: &[&str] = &["Any", "True_Ending", "100", "101"];

/// A dataset this tool can fetch from the API and persist locally
///
/// `endpoint` may contain a `{game_id}` placeholder; call [`Dataset::endpoint_for`]
/// to substitute it before handing the path to the API client, which treats
/// endpoints as literal strings.
#[derive(Debug, Clone, Copy)]
pub struct Dataset {
    /// File stem of the persisted copy (e.g. `levels` -> `levels.json`)
    pub name: &'static str,
    /// API endpoint path, possibly containing `{game_id}`
    pub endpoint: &'static str,
    /// Static query arguments sent with the initial request
    pub query_args: &'static [(&'static str, &'static str)],
}

impl Dataset {
    /// Returns the endpoint path with the `{game_id}` placeholder substituted
    pub fn endpoint_for(&self, game_id: &str) -> String {
        self.endpoint.replace("{game_id}", game_id)
    }
}

/// All levels of the game
pub const LEVELS: Dataset = Dataset {
    name: "levels",
    endpoint: "games/{game_id}/levels",
    query_args: &[],
};

/// All run categories of the game
pub const CATEGORIES: Dataset = Dataset {
    name: "categories",
    endpoint: "games/{game_id}/categories",
    query_args: &[],
};

/// Every run ever submitted for the game
pub const RUNS: Dataset = Dataset {
    name: "runs",
    endpoint: "runs",
    query_args: &[("game", PIZZA_TOWER_ID)],
};

/// Returns the data directory for persisted datasets and the name cache
///
/// Uses `~/.local/share/towerstats/` on Linux, or the equivalent XDG path on
/// other platforms. Returns `None` if no home directory can be determined.
pub fn data_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "towerstats")?;
    Some(project_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_for_substitutes_game_id() {
        assert_eq!(
            LEVELS.endpoint_for(PIZZA_TOWER_ID),
            "games/o6gnpox1/levels"
        );
        assert_eq!(
            CATEGORIES.endpoint_for("abc123"),
            "games/abc123/categories"
        );
    }

    #[test]
    fn test_endpoint_without_placeholder_is_unchanged() {
        assert_eq!(RUNS.endpoint_for(PIZZA_TOWER_ID), "runs");
    }

    #[test]
    fn test_runs_dataset_queries_by_game() {
        assert_eq!(RUNS.query_args, &[("game", PIZZA_TOWER_ID)]);
    }

    #[test]
    fn test_dataset_names_are_distinct() {
        let names = [LEVELS.name, CATEGORIES.name, RUNS.name];
        for (i, a) in names.iter().enumerate() {
            for (j, b) in names.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }
}
