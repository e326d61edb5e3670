//! Favorites: optimistic toggles, queued remote calls, failure reporting.

#![allow(clippy::unwrap_used)]

use coffee_compass_app::FavoriteTarget;
use coffee_compass_app::favorites::FAVORITE_SYNC_FAILED;
use coffee_compass_app::store::{Collection, StoreCall};
use coffee_compass_core::{BeanId, CafeId};
use coffee_compass_integration_tests::{TestContext, catalog_store, favorite};
use serde_json::json;

#[tokio::test]
async fn test_double_toggle_is_a_net_no_op_with_two_opposite_calls() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    ctx.store.clear_calls();
    let target = FavoriteTarget::Cafe(CafeId::new("cafe-1"));

    assert!(app.toggle_favorite(target.clone()));
    assert!(!app.toggle_favorite(target.clone()));
    app.flush_favorites().await;

    assert!(!app.is_favorite(&target));
    assert_eq!(
        ctx.store.calls(),
        vec![
            StoreCall::InsertFavorite(target.clone()),
            StoreCall::DeleteFavorite(target),
        ]
    );
    assert!(ctx.store.favorite_rows().is_empty());
}

#[tokio::test]
async fn test_double_toggle_of_existing_favorite_deletes_then_inserts() {
    let store = catalog_store().with_favorites(vec![favorite(&json!({
        "id": "fav-1",
        "bean_id": "bean-7"
    }))]);
    let ctx = TestContext::with_store(store);
    let mut app = ctx.start().await;
    ctx.store.clear_calls();
    let target = FavoriteTarget::Bean(BeanId::new("bean-7"));
    assert!(app.is_favorite(&target));

    app.toggle_favorite(target.clone());
    app.toggle_favorite(target.clone());
    app.flush_favorites().await;

    assert!(app.is_favorite(&target));
    assert_eq!(
        ctx.store.calls(),
        vec![
            StoreCall::DeleteFavorite(target.clone()),
            StoreCall::InsertFavorite(target),
        ]
    );
    assert_eq!(ctx.store.favorite_rows().len(), 1);
}

#[tokio::test]
async fn test_remote_failure_keeps_local_flip_and_notifies_once() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    ctx.store.fail(Collection::Favorites);
    let target = FavoriteTarget::Bean(BeanId::new("bean-1"));

    assert!(app.toggle_favorite(target.clone()));
    app.flush_favorites().await;

    assert!(app.is_favorite(&target));
    assert_eq!(ctx.notifier.errors(), vec![FAVORITE_SYNC_FAILED.to_string()]);
    assert!(ctx.store.favorite_rows().is_empty());
}

#[tokio::test]
async fn test_reload_sees_queued_favorites() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    let target = FavoriteTarget::Cafe(CafeId::new("cafe-3"));

    app.toggle_favorite(target.clone());
    let summary = app.reload().await;

    assert!(summary.is_complete());
    assert_eq!(summary.favorites, 1);
    assert!(app.is_favorite(&target));
}

#[tokio::test]
async fn test_profile_lists_favorites() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    app.toggle_favorite(FavoriteTarget::Cafe(CafeId::new("cafe-1")));
    app.toggle_favorite(FavoriteTarget::Bean(BeanId::new("bean-7")));
    let profile = app.profile();

    assert_eq!(profile.favorite_cafes.len(), 1);
    assert_eq!(profile.favorite_cafes[0].name, "Artisan Coffee Lab");
    assert_eq!(profile.favorite_beans.len(), 1);
    assert_eq!(profile.favorite_beans[0].name, "Kenyan AA");
}
