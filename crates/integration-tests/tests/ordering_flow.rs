//! Scan → bean → brew ordering flow driven through the coordinator.

#![allow(clippy::unwrap_used)]

use coffee_compass_app::coordinator::{ORDER_FAILED, ORDER_SAVED};
use coffee_compass_app::scan::ScanError;
use coffee_compass_app::store::Collection;
use coffee_compass_app::{CheckinOutcome, OrderingFlow, Screen};
use coffee_compass_core::{BeanId, BrewMethod, CafeId, FlowStep, MainTab};
use coffee_compass_integration_tests::TestContext;

#[tokio::test]
async fn test_scan_then_select_reaches_brew_order() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    app.select_tab(MainTab::Scan);
    assert!(app.on_scan_result("cafe-1").unwrap());
    app.select_bean(BeanId::new("bean-1")).unwrap();

    assert_eq!(
        app.flow(),
        &OrderingFlow::BrewOrder {
            cafe_id: CafeId::new("cafe-1"),
            bean_id: BeanId::new("bean-1"),
        }
    );
    assert_eq!(app.current_screen(), Screen::Ordering(FlowStep::BrewOrder));
}

#[tokio::test]
async fn test_cancel_from_every_step_clears_ids() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    for depth in 0..3 {
        app.start_ordering();
        if depth >= 1 {
            app.on_scan_result("cafe-1").unwrap();
        }
        if depth >= 2 {
            app.select_bean(BeanId::new("bean-1")).unwrap();
        }
        app.cancel_ordering();

        assert_eq!(app.flow(), &OrderingFlow::Inactive);
        assert_eq!(app.flow().scanned_cafe_id(), None);
        assert_eq!(app.flow().selected_bean_id(), None);
    }
}

#[tokio::test]
async fn test_stale_scan_in_brew_order_changes_nothing() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    app.start_ordering();
    app.on_scan_result("cafe-1").unwrap();
    app.select_bean(BeanId::new("bean-1")).unwrap();
    let before = app.flow().clone();

    assert_eq!(app.on_scan_result("cafe-3"), Ok(false));
    assert_eq!(app.flow(), &before);
}

#[tokio::test]
async fn test_scan_payload_forms() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    app.start_ordering();
    app.on_scan_result("https://example.com/cafe/42").unwrap();
    assert_eq!(app.flow().scanned_cafe_id(), Some(&CafeId::new("42")));

    app.start_ordering();
    app.on_scan_result("  7  ").unwrap();
    assert_eq!(app.flow().scanned_cafe_id(), Some(&CafeId::new("7")));

    app.start_ordering();
    assert_eq!(app.on_scan_result(""), Err(ScanError::Empty));
    assert_eq!(app.flow().step(), Some(FlowStep::Scan));
    assert_eq!(app.flow().scanned_cafe_id(), None);
}

#[tokio::test]
async fn test_back_navigation_inside_flow() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    app.start_ordering();
    app.on_scan_result("cafe-1").unwrap();
    app.select_bean(BeanId::new("bean-1")).unwrap();

    app.ordering_back();
    assert_eq!(
        app.flow(),
        &OrderingFlow::BeanSelect {
            cafe_id: CafeId::new("cafe-1")
        }
    );

    app.ordering_back();
    assert_eq!(app.flow().step(), Some(FlowStep::Scan));
    assert_eq!(app.flow().scanned_cafe_id(), None);

    app.ordering_back();
    assert!(!app.flow().is_active());
}

#[tokio::test]
async fn test_failed_checkin_still_returns_to_map() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;
    app.select_tab(MainTab::Profile);
    ctx.store.fail(Collection::Orders);

    app.select_tab(MainTab::Scan);
    app.on_scan_result("cafe-1").unwrap();
    app.select_bean(BeanId::new("bean-1")).unwrap();
    let outcome = app
        .complete_ordering(BrewMethod::PourOver, Some(5), Some("great cup".to_string()))
        .await
        .unwrap();

    assert!(matches!(outcome, CheckinOutcome::Failed(_)));
    assert!(!app.flow().is_active());
    assert_eq!(app.navigation().main_tab, MainTab::Map);
    assert!(app.orders().is_empty());
    assert_eq!(ctx.notifier.errors(), vec![ORDER_FAILED.to_string()]);
}

#[tokio::test]
async fn test_successful_checkin_prepends_and_notifies() {
    let ctx = TestContext::new();
    let mut app = ctx.start().await;

    app.select_tab(MainTab::Scan);
    app.on_scan_result("https://example.com/cafe/cafe-3").unwrap();
    assert_eq!(app.scanned_cafe().unwrap().name, "Brew & Co.");
    app.select_bean(BeanId::new("bean-7")).unwrap();
    let outcome = app
        .complete_ordering(BrewMethod::ColdBrew, None, Some("  ".to_string()))
        .await
        .unwrap();

    let CheckinOutcome::Saved(view) = outcome else {
        panic!("expected saved order");
    };
    assert_eq!(view.bean_name, "Kenyan AA");
    assert_eq!(view.note, None);
    assert_eq!(view.flavor_tags, vec!["Blackcurrant", "Tomato"]);
    assert_eq!(app.orders().len(), 1);
    assert_eq!(ctx.store.order_rows().len(), 1);
    assert_eq!(
        ctx.notifier.notifications().last().map(|n| n.message().to_string()),
        Some(ORDER_SAVED.to_string())
    );
}
