//! Remote persistence for cafés, beans, favorites and orders.
//!
//! # Architecture
//!
//! - The remote store is the source of truth for all four collections
//! - [`RemoteStore`] is the only seam the coordinator talks to; it is object
//!   safe so the coordinator can hold an `Arc<dyn RemoteStore>`
//! - [`RestStore`] speaks the hosted PostgREST API used in production
//! - [`MemoryStore`] keeps everything in process (tests, offline demo)
//!
//! Rows mirror the remote table columns. Turning rows into the shapes screens
//! consume is the job of [`crate::catalog`].

mod memory;
mod rest;

pub use memory::{MemoryStore, StoreCall};
pub use rest::RestStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coffee_compass_core::{BeanId, BrewMethod, CafeId, FavoriteId, OrderId, Rating};

use crate::favorites::FavoriteTarget;

/// The four remote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Cafes,
    Beans,
    Favorites,
    Orders,
}

impl Collection {
    /// Remote table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Cafes => "cafes",
            Self::Beans => "beans",
            Self::Favorites => "favorites",
            Self::Orders => "orders",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store returned a non-success response.
    #[error("API error on {collection}: {status} - {message}")]
    Api {
        collection: Collection,
        status: u16,
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Parse error on {collection}: {message}")]
    Parse {
        collection: Collection,
        message: String,
    },

    /// An insert succeeded but returned no representation.
    #[error("Insert into {0} returned no row")]
    EmptyInsert(Collection),

    /// Store cannot serve the collection right now.
    #[error("{collection} unavailable: {reason}")]
    Unavailable {
        collection: Collection,
        reason: String,
    },

    /// Client could not be configured.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// Object-safe async interface over the remote collections.
///
/// `list_orders` returns newest first; the other listings are unordered.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List every café row.
    async fn list_cafes(&self) -> Result<Vec<CafeRow>, StoreError>;

    /// List every bean row.
    async fn list_beans(&self) -> Result<Vec<BeanRow>, StoreError>;

    /// List every favorite row.
    async fn list_favorites(&self) -> Result<Vec<FavoriteRow>, StoreError>;

    /// List orders by creation time, newest first.
    async fn list_orders(&self) -> Result<Vec<OrderRow>, StoreError>;

    /// Insert a favorite and return the stored row.
    async fn insert_favorite(&self, favorite: &NewFavorite) -> Result<FavoriteRow, StoreError>;

    /// Delete every favorite row pointing at `target`.
    async fn delete_favorite(&self, target: &FavoriteTarget) -> Result<(), StoreError>;

    /// Insert an order and return the canonical row (server id and timestamp).
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRow, StoreError>;
}

// =============================================================================
// Rows
// =============================================================================

/// One line of a café's opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub day: String,
    pub hours: String,
}

/// Row of the `cafes` table.
///
/// Coordinates are kept as raw JSON because the column has held both
/// numbers and numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeRow {
    pub id: CafeId,
    pub name: String,
    #[serde(default)]
    pub lat: Option<serde_json::Value>,
    #[serde(default)]
    pub lng: Option<serde_json::Value>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<Vec<OpeningHours>>,
}

/// Row of the `beans` table.
///
/// `notes` holds the flavor notes as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanRow {
    pub id: BeanId,
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub roaster: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub roast_level: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub altitude: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cafe_id: Option<CafeId>,
}

/// Row of the `favorites` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRow {
    pub id: FavoriteId,
    #[serde(default)]
    pub cafe_id: Option<CafeId>,
    #[serde(default)]
    pub bean_id: Option<BeanId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FavoriteRow {
    /// What the row points at, or `None` when it references both kinds or neither.
    #[must_use]
    pub fn target(&self) -> Option<FavoriteTarget> {
        match (&self.cafe_id, &self.bean_id) {
            (Some(cafe_id), None) => Some(FavoriteTarget::Cafe(cafe_id.clone())),
            (None, Some(bean_id)) => Some(FavoriteTarget::Bean(bean_id.clone())),
            _ => None,
        }
    }
}

/// Insert payload for the `favorites` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFavorite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafe_id: Option<CafeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bean_id: Option<BeanId>,
}

impl From<&FavoriteTarget> for NewFavorite {
    fn from(target: &FavoriteTarget) -> Self {
        match target {
            FavoriteTarget::Cafe(id) => Self {
                cafe_id: Some(id.clone()),
                bean_id: None,
            },
            FavoriteTarget::Bean(id) => Self {
                cafe_id: None,
                bean_id: Some(id.clone()),
            },
        }
    }
}

/// Row of the `orders` table.
///
/// `method` stays a string here; unknown methods are rejected when the row
/// becomes an [`crate::orders::Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub cafe_id: CafeId,
    pub bean_id: BeanId,
    pub method: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub taste_profile: Option<Vec<String>>,
}

/// Insert payload for the `orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub cafe_id: CafeId,
    pub bean_id: BeanId,
    pub method: BrewMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub taste_profile: Vec<String>,
}
