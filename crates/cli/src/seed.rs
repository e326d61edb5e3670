//! Seed data for the offline in-memory store.
//!
//! The bundled demo file is compiled into the binary; `--seed FILE` loads
//! the same format from disk.

use std::path::Path;

use serde::Deserialize;

use coffee_compass_app::MemoryStore;
use coffee_compass_app::store::{BeanRow, CafeRow, FavoriteRow, OrderRow};

const DEMO_SEED: &str = include_str!("../seed/demo.yaml");

/// Rows for every collection, keyed like the hosted tables.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    pub cafes: Vec<CafeRow>,
    pub beans: Vec<BeanRow>,
    #[serde(default)]
    pub favorites: Vec<FavoriteRow>,
    #[serde(default)]
    pub orders: Vec<OrderRow>,
}

impl SeedData {
    /// Build an in-memory store holding these rows.
    #[must_use]
    pub fn into_store(self) -> MemoryStore {
        MemoryStore::new()
            .with_cafes(self.cafes)
            .with_beans(self.beans)
            .with_favorites(self.favorites)
            .with_orders(self.orders)
    }
}

/// Parse the bundled demo data.
///
/// # Errors
///
/// Returns an error if the bundled YAML does not match the row types.
pub fn demo() -> Result<SeedData, serde_yaml::Error> {
    serde_yaml::from_str(DEMO_SEED)
}

/// Load seed data from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<SeedData, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_parses() {
        let seed = demo().unwrap();
        assert_eq!(seed.cafes.len(), 4);
        assert_eq!(seed.beans.len(), 5);
        assert_eq!(seed.favorites.len(), 2);
        assert_eq!(seed.orders.len(), 2);
    }

    #[test]
    fn test_load_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file(&dir.path().join("missing.yaml")).is_err());
    }
}
