//! Order log: validation, non-optimistic inserts, ordering and grouping.

#![allow(clippy::unwrap_used)]

use chrono::{FixedOffset, Utc};

use coffee_compass_app::catalog::{UNKNOWN_BEAN, UNKNOWN_CAFE};
use coffee_compass_app::store::Collection;
use coffee_compass_app::{AppError, OrderDraft, ValidationError};
use coffee_compass_core::{BeanId, BrewMethod, CafeId};
use coffee_compass_integration_tests::{TestContext, catalog_store, order};

fn draft(cafe_id: &str, bean_id: &str) -> OrderDraft {
    OrderDraft {
        cafe_id: CafeId::new(cafe_id),
        bean_id: BeanId::new(bean_id),
        method: BrewMethod::PourOver,
        rating: Some(4),
        note: None,
    }
}

fn assert_newest_first(app: &coffee_compass_app::AppCoordinator) {
    let times: Vec<_> = app.orders().iter().map(|o| o.created_at).collect();
    assert!(times.windows(2).all(|pair| pair[0] > pair[1]), "{times:?}");
}

#[tokio::test]
async fn test_unknown_bean_is_rejected_before_any_remote_call() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    let err = app.add_order(draft("cafe-1", "ghost")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::UnknownBean(_))
    ));
    assert!(app.orders().is_empty());
    assert!(ctx.store.order_rows().is_empty());
}

#[tokio::test]
async fn test_unknown_cafe_is_rejected() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    let err = app.add_order(draft("cafe-404", "bean-1")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::UnknownCafe(_))
    ));
}

#[tokio::test]
async fn test_out_of_range_rating_is_rejected() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    let mut bad = draft("cafe-1", "bean-1");
    bad.rating = Some(6);

    let err = app.add_order(bad).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::Rating(_))));
    assert!(app.orders().is_empty());
}

#[tokio::test]
async fn test_remote_failure_leaves_log_untouched() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    ctx.store.fail(Collection::Orders);

    let err = app.add_order(draft("cafe-1", "bean-1")).await.unwrap_err();

    assert!(matches!(err, AppError::Remote(_)));
    assert!(app.orders().is_empty());
}

#[tokio::test]
async fn test_log_stays_newest_first_across_adds_and_reloads() {
    let store = catalog_store().with_orders(vec![
        order("o-1", "2025-11-04T08:00:00Z", "cafe-1", "bean-1", "espresso"),
        order("o-2", "2025-11-06T08:00:00Z", "cafe-3", "bean-7", "aeropress"),
    ]);
    let ctx = TestContext::with_store(store);
    let mut app = ctx.start().await;
    assert_eq!(app.orders().len(), 2);
    assert_newest_first(&app);

    let first = app.add_order(draft("cafe-1", "bean-1")).await.unwrap();
    let second = app.add_order(draft("cafe-3", "bean-7")).await.unwrap();
    assert_newest_first(&app);
    assert_eq!(app.orders().as_slice()[0].id, second.id);
    assert_eq!(app.orders().as_slice()[1].id, first.id);

    app.reload().await;
    assert_eq!(app.orders().len(), 4);
    assert_newest_first(&app);
}

#[tokio::test]
async fn test_deleted_references_render_placeholders() {
    let store = catalog_store().with_orders(vec![order(
        "o-1",
        "2025-11-04T08:00:00Z",
        "cafe-1",
        "bean-1",
        "chemex",
    )]);
    let ctx = TestContext::with_store(store);
    let mut app = ctx.start().await;

    ctx.store.remove_cafe(&CafeId::new("cafe-1"));
    ctx.store.remove_bean(&BeanId::new("bean-1"));
    let summary = app.reload().await;

    assert!(summary.is_complete());
    let views = app.order_views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].cafe_name, UNKNOWN_CAFE);
    assert_eq!(views[0].bean_name, UNKNOWN_BEAN);
}

#[tokio::test]
async fn test_history_groups_by_viewer_day() {
    let store = catalog_store().with_orders(vec![
        order("o-1", "2025-11-04T02:00:00Z", "cafe-1", "bean-1", "espresso"),
        order("o-2", "2025-11-04T20:00:00Z", "cafe-1", "bean-1", "espresso"),
        order("o-3", "2025-11-05T09:00:00Z", "cafe-3", "bean-7", "cold-brew"),
    ]);
    let ctx = TestContext::with_store(store);
    let app = ctx.start().await;

    let utc_days = app.order_history_in(&Utc);
    assert_eq!(utc_days.len(), 2);
    assert_eq!(utc_days[0].orders.len(), 1);
    assert_eq!(utc_days[1].orders.len(), 2);

    // 02:00Z on the 4th is still the 3rd five hours west.
    let west = FixedOffset::west_opt(5 * 3600).unwrap();
    let west_days = app.order_history_in(&west);
    assert_eq!(west_days.len(), 3);
    assert!(west_days.windows(2).all(|pair| pair[0].date > pair[1].date));
}
