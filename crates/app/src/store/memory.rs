//! In-memory remote store.
//!
//! Behaves like the hosted store: ids and timestamps are assigned on insert,
//! orders come back newest first, and deletes remove every matching row.
//! Every call is recorded and collections can be switched to failing, which
//! makes it the backend for tests and the offline demo.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use coffee_compass_core::{BeanId, CafeId, FavoriteId, OrderId};

use super::{
    BeanRow, CafeRow, Collection, FavoriteRow, NewFavorite, NewOrder, OrderRow, RemoteStore,
    StoreError,
};
use crate::favorites::FavoriteTarget;

/// A call received by [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List(Collection),
    InsertFavorite(FavoriteTarget),
    DeleteFavorite(FavoriteTarget),
    InsertOrder { cafe_id: CafeId, bean_id: BeanId },
}

#[derive(Debug, Default)]
struct MemoryState {
    cafes: Vec<CafeRow>,
    beans: Vec<BeanRow>,
    favorites: Vec<FavoriteRow>,
    orders: Vec<OrderRow>,
    calls: Vec<StoreCall>,
    failing: HashSet<Collection>,
    last_created_at: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Next creation timestamp, strictly after every earlier one.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }

    fn check(&self, collection: Collection) -> Result<(), StoreError> {
        if self.failing.contains(&collection) {
            return Err(StoreError::Unavailable {
                collection,
                reason: "simulated outage".to_string(),
            });
        }
        Ok(())
    }
}

/// Thread-safe in-process implementation of [`RemoteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed café rows.
    #[must_use]
    pub fn with_cafes(self, cafes: Vec<CafeRow>) -> Self {
        self.lock().cafes = cafes;
        self
    }

    /// Seed bean rows.
    #[must_use]
    pub fn with_beans(self, beans: Vec<BeanRow>) -> Self {
        self.lock().beans = beans;
        self
    }

    /// Seed favorite rows.
    #[must_use]
    pub fn with_favorites(self, favorites: Vec<FavoriteRow>) -> Self {
        self.lock().favorites = favorites;
        self
    }

    /// Seed order rows. They are kept newest first.
    #[must_use]
    pub fn with_orders(self, mut orders: Vec<OrderRow>) -> Self {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        {
            let mut state = self.lock();
            state.last_created_at = orders.first().map(|o| o.created_at);
            state.orders = orders;
        }
        self
    }

    /// Make every call touching `collection` fail until [`Self::restore`].
    pub fn fail(&self, collection: Collection) {
        self.lock().failing.insert(collection);
    }

    /// Undo [`Self::fail`].
    pub fn restore(&self, collection: Collection) {
        self.lock().failing.remove(&collection);
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current favorite rows.
    #[must_use]
    pub fn favorite_rows(&self) -> Vec<FavoriteRow> {
        self.lock().favorites.clone()
    }

    /// Current order rows, newest first.
    #[must_use]
    pub fn order_rows(&self) -> Vec<OrderRow> {
        self.lock().orders.clone()
    }

    /// Remove a café row, as if it had been deleted upstream.
    pub fn remove_cafe(&self, id: &CafeId) {
        self.lock().cafes.retain(|c| &c.id != id);
    }

    /// Remove a bean row, as if it had been deleted upstream.
    pub fn remove_bean(&self, id: &BeanId) {
        self.lock().beans.retain(|b| &b.id != id);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock still guards usable rows.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_cafes(&self) -> Result<Vec<CafeRow>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List(Collection::Cafes));
        state.check(Collection::Cafes)?;
        Ok(state.cafes.clone())
    }

    async fn list_beans(&self) -> Result<Vec<BeanRow>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List(Collection::Beans));
        state.check(Collection::Beans)?;
        Ok(state.beans.clone())
    }

    async fn list_favorites(&self) -> Result<Vec<FavoriteRow>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List(Collection::Favorites));
        state.check(Collection::Favorites)?;
        Ok(state.favorites.clone())
    }

    async fn list_orders(&self) -> Result<Vec<OrderRow>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::List(Collection::Orders));
        state.check(Collection::Orders)?;
        Ok(state.orders.clone())
    }

    async fn insert_favorite(&self, favorite: &NewFavorite) -> Result<FavoriteRow, StoreError> {
        let mut state = self.lock();
        let row = FavoriteRow {
            id: FavoriteId::new(Uuid::new_v4().to_string()),
            cafe_id: favorite.cafe_id.clone(),
            bean_id: favorite.bean_id.clone(),
            created_at: None,
        };
        let target = row.target().ok_or_else(|| StoreError::Api {
            collection: Collection::Favorites,
            status: 400,
            message: "favorite must reference exactly one of cafe_id or bean_id".to_string(),
        })?;

        state.calls.push(StoreCall::InsertFavorite(target));
        state.check(Collection::Favorites)?;

        let row = FavoriteRow {
            created_at: Some(state.next_timestamp()),
            ..row
        };
        state.favorites.push(row.clone());
        Ok(row)
    }

    async fn delete_favorite(&self, target: &FavoriteTarget) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::DeleteFavorite(target.clone()));
        state.check(Collection::Favorites)?;

        state
            .favorites
            .retain(|row| row.target().as_ref() != Some(target));
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRow, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::InsertOrder {
            cafe_id: order.cafe_id.clone(),
            bean_id: order.bean_id.clone(),
        });
        state.check(Collection::Orders)?;

        let row = OrderRow {
            id: OrderId::new(Uuid::new_v4().to_string()),
            created_at: state.next_timestamp(),
            cafe_id: order.cafe_id.clone(),
            bean_id: order.bean_id.clone(),
            method: order.method.to_string(),
            rating: order.rating.map(u8::from),
            notes: order.notes.clone(),
            taste_profile: Some(order.taste_profile.clone()),
        };
        state.orders.insert(0, row.clone());
        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coffee_compass_core::BrewMethod;

    use super::*;

    fn new_order() -> NewOrder {
        NewOrder {
            cafe_id: CafeId::new("1"),
            bean_id: BeanId::new("b1"),
            method: BrewMethod::Espresso,
            rating: None,
            notes: None,
            taste_profile: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_inserted_orders_are_newest_first_with_increasing_timestamps() {
        let store = MemoryStore::new();
        let first = store.insert_order(&new_order()).await.unwrap();
        let second = store.insert_order(&new_order()).await.unwrap();

        assert!(second.created_at > first.created_at);
        let rows = store.list_orders().await.unwrap();
        assert_eq!(rows.first().map(|r| &r.id), Some(&second.id));
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_collection_records_call_and_errors() {
        let store = MemoryStore::new();
        store.fail(Collection::Orders);

        let result = store.insert_order(&new_order()).await;
        assert!(matches!(result, Err(StoreError::Unavailable { .. })));
        assert!(store.order_rows().is_empty());
        assert_eq!(store.calls().len(), 1);

        store.restore(Collection::Orders);
        assert!(store.insert_order(&new_order()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_removes_all_matching_favorites() {
        let store = MemoryStore::new();
        let target = FavoriteTarget::Cafe(CafeId::new("1"));
        store
            .insert_favorite(&NewFavorite::from(&target))
            .await
            .unwrap();
        store
            .insert_favorite(&NewFavorite::from(&FavoriteTarget::Bean(BeanId::new("b"))))
            .await
            .unwrap();

        store.delete_favorite(&target).await.unwrap();

        let rows = store.favorite_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows.first().and_then(FavoriteRow::target),
            Some(FavoriteTarget::Bean(BeanId::new("b")))
        );
    }
}
