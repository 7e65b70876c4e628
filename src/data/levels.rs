//! Level dataset: fetching, local loading, and display names
//!
//! speedrun.com level names carry floor prefixes ("F1 - John Gutter") that
//! are too wide for report labels, so every level gets a short display name
//! here. An unmapped name is a hard error on purpose: it means a new level
//! was added and the mapping needs a row.

use crate::api::ApiClient;
use crate::cache::DataStore;
use crate::config;

use super::{decode_records, DataError, Level};

/// Official level name -> short display name
const SHORT_NAMES: &[(&str, &str)] = &[
    ("Tutorial", "Tutorial"),
    ("F1 - John Gutter", "John Gutter"),
    ("F1 - Pizzascape", "Pizzascape"),
    ("F1 - Ancient Cheese", "Ancient Cheese"),
    ("F1 - Bloodsauce Dungeon", "Bloodsauce Dungeon"),
    ("F2 - Oregano Desert", "Oregano Desert"),
    ("F2 - Wasteyard", "Wasteyard"),
    ("F2 - Fun Farm", "Fun Farm"),
    ("F2 - Fastfood Saloon", "Fastfood Saloon"),
    ("F3 - Crust Cove", "Crust Cove"),
    ("F3 - Gnome Forest", "Gnome Forest"),
    ("F3 - GOLF", "GOLF"),
    ("F3 - Deep-Dish 9", "Deep-Dish 9"),
    ("F4 - The Pig City", "The Pig City"),
    ("F4 - Oh Shit!", "Oh Shit!"),
    ("F4 - Peppibot Factory", "Peppibot Factory"),
    ("F4 - Refrigerator-Refrigerador-Freezerator", "Freezerator"),
    ("F5 - Pizzascare", "Pizzascare"),
    ("F5 - Don't Make a Sound", "DMaS"),
    ("F5 - WAR", "WAR"),
    ("F5 - The Crumbling Tower of Pizza", "Crumbling Tower"),
    ("Pepperman", "Pepperman"),
    ("The Vigilante", "The Vigilante"),
    ("The Noise", "The Noise"),
    ("Fake Peppino", "Fake Peppino"),
    ("Pizzaface", "Pizzaface"),
    ("Secrets of the World", "Secrets of the World"),
    ("Tricky Treat", "Tricky Treat"),
];

/// Which release a level belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    MainGame,
    Halloween2023,
    SageDemo,
}

impl Era {
    pub fn label(&self) -> &'static str {
        match self {
            Era::MainGame => "Main Game",
            Era::Halloween2023 => "2023 Halloween",
            Era::SageDemo => "SAGE Demo",
        }
    }
}

/// Maps an official level name to its short display name
pub fn short_display_name(official_name: &str) -> Result<&'static str, DataError> {
    SHORT_NAMES
        .iter()
        .find(|(full, _)| *full == official_name)
        .map(|(_, short)| *short)
        .ok_or_else(|| DataError::UnmappedLevel(official_name.to_string()))
}

/// Classifies a level by its short display name
pub fn level_era(short_name: &str) -> Era {
    if short_name == "Tricky Treat" || short_name == "Secrets of the World" {
        return Era::Halloween2023;
    }
    if short_name.contains("(SAGE)") {
        return Era::SageDemo;
    }
    Era::MainGame
}

impl Level {
    /// The short display name used in report labels
    pub fn short_name(&self) -> Result<&'static str, DataError> {
        short_display_name(&self.name)
    }
}

/// Fetches all levels of a game from the API
pub async fn fetch_levels(api: &ApiClient, game_id: &str) -> Result<Vec<Level>, DataError> {
    let records = api
        .fetch(
            &config::LEVELS.endpoint_for(game_id),
            config::LEVELS.query_args,
        )
        .await?;
    decode_records("level", records)
}

/// Loads the level dataset, preferring the local copy
///
/// With `refresh` set, fetches from the API and persists the result; the
/// local copy is also the fallback when none exists yet.
pub async fn load_levels(
    api: &ApiClient,
    store: &DataStore,
    refresh: bool,
) -> Result<Vec<Level>, DataError> {
    if !refresh {
        if let Some(stored) = store.read::<Vec<Level>>(config::LEVELS.name) {
            return Ok(stored.data);
        }
    }

    let levels = fetch_levels(api, config::PIZZA_TOWER_ID).await?;
    store.write(config::LEVELS.name, &levels)?;
    Ok(levels)
}
