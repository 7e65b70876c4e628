//! Local persistence for fetched data
//!
//! Two pieces live here: a dataset store that keeps whole fetched datasets as
//! JSON files (replaced only by an explicit refresh), and the player-name
//! cache, a persistent id -> display-name mapping that turns one network
//! round-trip per unique player into one per process lifetime at most.

mod names;
mod store;

pub use names::{LookupError, NameCache};
pub use store::{DataStore, StoredDataset};
