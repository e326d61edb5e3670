//! Integration tests for Coffee Compass.
//!
//! Every scenario runs against a fresh [`TestContext`]: an in-memory store
//! seeded with a small catalog, plus recording collaborators for
//! notifications, navigation history and preferences.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p coffee-compass-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use coffee_compass_app::preferences::MemoryPreferences;
use coffee_compass_app::store::{BeanRow, CafeRow, FavoriteRow, OrderRow};
use coffee_compass_app::{
    AppCoordinator, Collaborators, MemoryHistory, MemoryStore, RecordingNotifier,
};

/// Collaborators shared between a test and the coordinator under test.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub notifier: RecordingNotifier,
    pub history: MemoryHistory,
    pub preferences: Arc<MemoryPreferences>,
}

impl TestContext {
    /// Context over the default catalog with no favorites or orders.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(catalog_store())
    }

    /// Context over a caller-built store.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(store),
            notifier: RecordingNotifier::new(),
            history: MemoryHistory::new(),
            preferences: Arc::new(MemoryPreferences::new()),
        }
    }

    /// Build and load a coordinator wired to this context.
    pub async fn start(&self) -> AppCoordinator {
        let collaborators = Collaborators::new(self.store.clone())
            .with_notifier(Arc::new(self.notifier.clone()))
            .with_history(Arc::new(self.history.clone()))
            .with_preferences(self.preferences.clone());
        AppCoordinator::start(collaborators).await.0
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Store seeded with cafés `cafe-1` and `cafe-3` and three beans.
///
/// `bean-9` belongs to `cafe-404`, which does not exist.
#[must_use]
pub fn catalog_store() -> MemoryStore {
    MemoryStore::new()
        .with_cafes(vec![
            cafe(&json!({
                "id": "cafe-1",
                "name": "Artisan Coffee Lab",
                "lat": 37.7749,
                "lng": -122.4194,
                "rating": 4.8,
                "reviews": 234,
                "distance": "0.3 mi"
            })),
            cafe(&json!({
                "id": "cafe-3",
                "name": "Brew & Co.",
                "lat": "not a number",
                "lng": -122.41,
                "is_open": false
            })),
        ])
        .with_beans(vec![
            bean(&json!({
                "id": "bean-1",
                "name": "Ethiopian Yirgacheffe",
                "origin": "Ethiopia",
                "notes": "Jasmine, Bergamot, Lemon",
                "cafe_id": "cafe-1"
            })),
            bean(&json!({
                "id": "bean-7",
                "name": "Kenyan AA",
                "origin": "Kenya",
                "notes": "Blackcurrant, Tomato",
                "cafe_id": "cafe-3"
            })),
            bean(&json!({
                "id": "bean-9",
                "name": "Guatemala Antigua",
                "notes": "Cocoa",
                "cafe_id": "cafe-404"
            })),
        ])
}

/// Parse a café row from JSON.
///
/// # Panics
///
/// Panics if the JSON does not match [`CafeRow`].
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn cafe(value: &serde_json::Value) -> CafeRow {
    serde_json::from_value(value.clone()).unwrap()
}

/// Parse a bean row from JSON.
///
/// # Panics
///
/// Panics if the JSON does not match [`BeanRow`].
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn bean(value: &serde_json::Value) -> BeanRow {
    serde_json::from_value(value.clone()).unwrap()
}

/// Parse a favorite row from JSON.
///
/// # Panics
///
/// Panics if the JSON does not match [`FavoriteRow`].
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn favorite(value: &serde_json::Value) -> FavoriteRow {
    serde_json::from_value(value.clone()).unwrap()
}

/// Order row at the given RFC 3339 timestamp.
///
/// # Panics
///
/// Panics if `created_at` is not RFC 3339.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn order(id: &str, created_at: &str, cafe_id: &str, bean_id: &str, method: &str) -> OrderRow {
    let created_at: DateTime<Utc> = created_at.parse().unwrap();
    serde_json::from_value(json!({
        "id": id,
        "created_at": created_at,
        "cafe_id": cafe_id,
        "bean_id": bean_id,
        "method": method,
    }))
    .unwrap()
}
