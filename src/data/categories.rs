//! Category dataset: fetching and local loading

use crate::api::ApiClient;
use crate::cache::DataStore;
use crate::config;

use super::{decode_records, Category, DataError};

/// Fetches all categories of a game from the API
pub async fn fetch_categories(api: &ApiClient, game_id: &str) -> Result<Vec<Category>, DataError> {
    let records = api
        .fetch(
            &config::CATEGORIES.endpoint_for(game_id),
            config::CATEGORIES.query_args,
        )
        .await?;
    decode_records("category", records)
}

/// Loads the category dataset, preferring the local copy
pub async fn load_categories(
    api: &ApiClient,
    store: &DataStore,
    refresh: bool,
) -> Result<Vec<Category>, DataError> {
    if !refresh {
        if let Some(stored) = store.read::<Vec<Category>>(config::CATEGORIES.name) {
            return Ok(stored.data);
        }
    }

    let categories = fetch_categories(api, config::PIZZA_TOWER_ID).await?;
    store.write(config::CATEGORIES.name, &categories)?;
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DataStore;
    use crate::data::CategoryKind;
    use tempfile::TempDir;

    #[test]
    fn test_stored_categories_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::with_dir(temp_dir.path().to_path_buf());
        let categories = vec![Category {
            id: "mke1y9x2".to_string(),
            name: "Any%".to_string(),
            kind: CategoryKind::PerGame,
            weblink: None,
            rules: None,
            miscellaneous: false,
        }];

        store.write(config::CATEGORIES.name, &categories).unwrap();

        let stored = store
            .read::<Vec<Category>>(config::CATEGORIES.name)
            .unwrap();
        assert_eq!(stored.data.len(), 1);
        assert_eq!(stored.data[0].name, "Any%");
    }
}
