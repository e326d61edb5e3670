//! Application state coordinator.
//!
//! [`AppCoordinator`] is the single owner of the catalog, favorites, order
//! log, ordering flow and navigation state. UI events arrive as `&mut self`
//! method calls, one at a time; remote calls are the only suspension points.
//!
//! # Initialization order
//!
//! 1. Active tab restored from preferences, favorite sync worker spawned
//! 2. Cafés and beans loaded together, catalog rebuilt
//! 3. Favorites and orders loaded together (orders are joined against the
//!    fresh catalog)

use std::sync::Arc;

use chrono::{Local, TimeZone};
use tracing::{debug, info, instrument, warn};

use coffee_compass_core::{BeanId, BrewMethod, CafeId, MainTab};

use crate::catalog::{BeanView, CafeView, Catalog};
use crate::error::{AppError, Result, add_breadcrumb, report_remote_error};
use crate::favorites::{FavoriteOp, FavoriteSync, FavoriteTarget, FavoritesLedger};
use crate::flow::{FlowError, OrderingFlow};
use crate::navigation::{
    HistoryEntry, NavigationHistory, NavigationState, NoHistory, Screen, resolve_screen,
};
use crate::notify::{Notifier, TracingNotifier};
use crate::orders::{Order, OrderDay, OrderDraft, OrderLog, OrderView, group_by_day, validate};
use crate::preferences::{MemoryPreferences, PreferenceStore, load_active_tab, save_active_tab};
use crate::profile::ProfileSummary;
use crate::scan::{ScanError, parse_scan_payload};
use crate::store::{Collection, RemoteStore, StoreError};

/// Success notification after a checkin.
pub const ORDER_SAVED: &str = "Order saved!";
/// Error notification when a checkin could not be stored.
pub const ORDER_FAILED: &str = "Couldn't save your order. Please try again.";
/// Error notification when a reload left some data stale.
pub const LOAD_FAILED: &str = "Couldn't load the latest coffee data.";

/// External capabilities the coordinator talks to.
pub struct Collaborators {
    pub store: Arc<dyn RemoteStore>,
    pub notifier: Arc<dyn Notifier>,
    pub history: Arc<dyn NavigationHistory>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Collaborators {
    /// Use `store` with log-only notifications, no history and in-memory preferences.
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            notifier: Arc::new(TracingNotifier),
            history: Arc::new(NoHistory),
            preferences: Arc::new(MemoryPreferences::new()),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn NavigationHistory>) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Counts after a reload and the collections that failed to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub cafes: usize,
    pub beans: usize,
    pub favorites: usize,
    pub orders: usize,
    pub failed: Vec<Collection>,
}

impl ReloadSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of finishing the ordering flow.
///
/// Either way the flow is closed and the map tab is active.
#[derive(Debug)]
pub enum CheckinOutcome {
    Saved(OrderView),
    Failed(AppError),
}

/// Single source of truth for the app.
pub struct AppCoordinator {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    history: Arc<dyn NavigationHistory>,
    preferences: Arc<dyn PreferenceStore>,
    favorite_sync: FavoriteSync,
    catalog: Catalog,
    favorites: FavoritesLedger,
    orders: OrderLog,
    flow: OrderingFlow,
    navigation: NavigationState,
}

impl AppCoordinator {
    /// Build a coordinator with no data loaded yet.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime (the favorite sync worker
    /// is spawned here).
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            store,
            notifier,
            history,
            preferences,
        } = collaborators;

        let main_tab = load_active_tab(preferences.as_ref());
        let favorite_sync = FavoriteSync::spawn(Arc::clone(&store), Arc::clone(&notifier));

        Self {
            store,
            notifier,
            history,
            preferences,
            favorite_sync,
            catalog: Catalog::default(),
            favorites: FavoritesLedger::default(),
            orders: OrderLog::default(),
            flow: OrderingFlow::default(),
            navigation: NavigationState::with_tab(main_tab),
        }
    }

    /// Build a coordinator and run the first load.
    pub async fn start(collaborators: Collaborators) -> (Self, ReloadSummary) {
        let mut coordinator = Self::new(collaborators);
        let summary = coordinator.reload().await;
        (coordinator, summary)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Reload every collection from the store.
    ///
    /// A failed collection keeps its previous local state; one error
    /// notification covers all failures. The ordering flow is not touched.
    #[instrument(skip(self))]
    pub async fn reload(&mut self) -> ReloadSummary {
        let mut failed = Vec::new();

        let (cafes, beans) = tokio::join!(self.store.list_cafes(), self.store.list_beans());
        match (cafes, beans) {
            (Ok(cafes), Ok(beans)) => self.catalog = Catalog::build(&cafes, &beans),
            (cafes, beans) => {
                record_failure(&mut failed, Collection::Cafes, cafes.err());
                record_failure(&mut failed, Collection::Beans, beans.err());
            }
        }

        // Queued favorite calls must land before the set is re-read.
        self.favorite_sync.flush().await;

        let (favorites, orders) =
            tokio::join!(self.store.list_favorites(), self.store.list_orders());
        match favorites {
            Ok(rows) => self.favorites = FavoritesLedger::from_rows(&rows),
            Err(e) => record_failure(&mut failed, Collection::Favorites, Some(e)),
        }
        match orders {
            Ok(rows) => self.orders.replace(OrderLog::from_rows(rows, &self.catalog)),
            Err(e) => record_failure(&mut failed, Collection::Orders, Some(e)),
        }

        if !failed.is_empty() {
            self.notifier.error(LOAD_FAILED);
        }

        let summary = ReloadSummary {
            cafes: self.catalog.cafes_by_id().len(),
            beans: self.catalog.beans_by_id().len(),
            favorites: self.favorites.cafe_ids().len() + self.favorites.bean_ids().len(),
            orders: self.orders.len(),
            failed,
        };
        info!(
            cafes = summary.cafes,
            beans = summary.beans,
            favorites = summary.favorites,
            orders = summary.orders,
            failed = summary.failed.len(),
            "Reload finished"
        );
        summary
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Flip a favorite locally and queue the matching remote call.
    ///
    /// Returns whether the target is now a favorite. Remote failures are
    /// reported as notifications and never undo the local flip.
    pub fn toggle_favorite(&mut self, target: FavoriteTarget) -> bool {
        add_breadcrumb("favorites", &format!("toggle {target}"));
        let op = self.favorites.toggle(target);
        let now_favorite = matches!(op, FavoriteOp::Insert(_));
        debug!(favorite = %op.target(), now_favorite, "Favorite toggled");
        self.favorite_sync.submit(op);
        now_favorite
    }

    /// Wait for every queued favorite call to finish.
    pub async fn flush_favorites(&self) {
        self.favorite_sync.flush().await;
    }

    #[must_use]
    pub fn is_favorite(&self, target: &FavoriteTarget) -> bool {
        self.favorites.contains(target)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Validate, store and then record an order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for unknown ids or a bad rating
    /// (nothing is sent), and [`AppError::Remote`] when the insert fails
    /// (the log is left unchanged).
    #[instrument(skip(self, draft), fields(cafe_id = %draft.cafe_id, bean_id = %draft.bean_id))]
    pub async fn add_order(&mut self, draft: OrderDraft) -> Result<OrderView> {
        let payload = validate(&draft, &self.catalog)?;

        let row = match self.store.insert_order(&payload).await {
            Ok(row) => row,
            Err(e) => {
                report_remote_error("add_order", &e);
                return Err(e.into());
            }
        };

        let order = Order::from_row(row, &self.catalog).ok_or_else(|| StoreError::Parse {
            collection: Collection::Orders,
            message: "stored order has an unknown brew method".to_string(),
        })?;
        let view = OrderView::new(&order, &self.catalog);
        info!(order_id = %order.id, method = %order.method, "Order stored");
        self.orders.prepend(order);
        Ok(view)
    }

    /// Orders joined against the catalog, newest first.
    #[must_use]
    pub fn order_views(&self) -> Vec<OrderView> {
        self.orders
            .iter()
            .map(|order| OrderView::new(order, &self.catalog))
            .collect()
    }

    /// Orders grouped by day in the local timezone.
    #[must_use]
    pub fn order_history(&self) -> Vec<OrderDay> {
        self.order_history_in(&Local)
    }

    /// Orders grouped by day in `tz`.
    #[must_use]
    pub fn order_history_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<OrderDay> {
        group_by_day(self.order_views(), tz)
    }

    // =========================================================================
    // Ordering flow
    // =========================================================================

    /// Enter the scan step.
    pub fn start_ordering(&mut self) {
        add_breadcrumb("ordering", "start");
        self.flow.start();
    }

    /// Handle a payload from the scanner.
    ///
    /// Returns `Ok(true)` when the flow moved to bean selection and
    /// `Ok(false)` for a result that arrived outside the scan step.
    ///
    /// # Errors
    ///
    /// Returns the [`ScanError`] when no café id could be read; it is also
    /// kept on the scan step for display.
    pub fn on_scan_result(&mut self, payload: &str) -> std::result::Result<bool, ScanError> {
        if !matches!(self.flow, OrderingFlow::Scan { .. }) {
            debug!("Ignoring scan result outside the scan step");
            return Ok(false);
        }

        match parse_scan_payload(payload) {
            Ok(cafe_id) => {
                add_breadcrumb("ordering", &format!("scanned {cafe_id}"));
                if self.catalog.cafe(&cafe_id).is_none() {
                    warn!(%cafe_id, "Scanned café is not in the catalog");
                }
                Ok(self.flow.scan_complete(cafe_id))
            }
            Err(e) => {
                debug!(error = %e, "Scan payload rejected");
                self.flow.scan_failed(e.clone());
                Err(e)
            }
        }
    }

    /// Handle a scanner failure; the flow stays on the scan step.
    pub fn on_scan_error(&mut self, reason: &str) {
        warn!(reason, "Scanner reported an error");
        self.flow.scan_failed(ScanError::Scanner(reason.to_string()));
    }

    /// Choose the bean to brew.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] outside the bean-select step.
    pub fn select_bean(&mut self, bean_id: BeanId) -> std::result::Result<(), FlowError> {
        self.flow.select_bean(bean_id)
    }

    pub fn cancel_ordering(&mut self) {
        add_breadcrumb("ordering", "cancel");
        self.flow.cancel();
    }

    /// Back button inside the flow.
    pub fn ordering_back(&mut self) {
        self.flow.back();
    }

    /// Record the brew and close the flow.
    ///
    /// Whatever the outcome, the flow ends and the map tab becomes active.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] when not on the brew-order step; nothing changes.
    pub async fn complete_ordering(
        &mut self,
        method: BrewMethod,
        rating: Option<u8>,
        note: Option<String>,
    ) -> std::result::Result<CheckinOutcome, FlowError> {
        let (cafe_id, bean_id) = self.flow.order_target()?;
        let draft = OrderDraft {
            cafe_id,
            bean_id,
            method,
            rating,
            note,
        };

        let result = self.add_order(draft).await;

        self.flow.cancel();
        self.navigation.main_tab = MainTab::Map;
        save_active_tab(self.preferences.as_ref(), MainTab::Map);

        Ok(match result {
            Ok(view) => {
                self.notifier.success(ORDER_SAVED);
                CheckinOutcome::Saved(view)
            }
            Err(e) => {
                warn!(error = %e, "Checkin failed");
                self.notifier.error(ORDER_FAILED);
                CheckinOutcome::Failed(e)
            }
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Bottom-navigation tab press.
    ///
    /// Details close first. `Scan` starts the ordering flow without changing
    /// the tab; any other tab ends an active flow and is persisted.
    pub fn select_tab(&mut self, tab: MainTab) {
        add_breadcrumb("navigation", &format!("tab {tab}"));
        self.navigation.close_detail();

        if tab == MainTab::Scan {
            self.start_ordering();
            return;
        }

        self.flow.cancel();
        self.navigation.switch_tab(tab);
        save_active_tab(self.preferences.as_ref(), tab);
        if tab == MainTab::History {
            self.history.push(HistoryEntry::history());
        }
    }

    /// Open a café detail and push it onto the history.
    pub fn open_cafe(&mut self, id: CafeId) {
        add_breadcrumb("navigation", &format!("cafe {id}"));
        self.history.push(HistoryEntry::cafe(&id));
        self.navigation.open_cafe(id);
    }

    /// Open a bean detail and push it onto the history.
    pub fn open_bean(&mut self, id: BeanId) {
        add_breadcrumb("navigation", &format!("bean {id}"));
        self.history.push(HistoryEntry::bean(&id));
        self.navigation.open_bean(id);
    }

    /// Close any open detail without touching the history.
    pub fn close_detail(&mut self) {
        self.navigation.close_detail();
    }

    /// Highlight a café on the map.
    pub fn select_cafe_on_map(&mut self, id: Option<CafeId>) {
        self.navigation.select_cafe(id);
    }

    /// Platform back/forward. Never pushes.
    ///
    /// An active ordering flow is cancelled, since it outranks every other
    /// screen and the restored destination would otherwise stay hidden.
    pub fn on_history_popped(&mut self, entry: Option<HistoryEntry>) {
        debug!(?entry, "History popped");
        self.flow.cancel();
        self.navigation.apply_history(entry.as_ref());
        save_active_tab(self.preferences.as_ref(), self.navigation.main_tab);
    }

    /// Screen to render for the current state.
    #[must_use]
    pub fn current_screen(&self) -> Screen {
        resolve_screen(&self.flow, &self.navigation, &self.catalog)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn favorites(&self) -> &FavoritesLedger {
        &self.favorites
    }

    #[must_use]
    pub const fn orders(&self) -> &OrderLog {
        &self.orders
    }

    #[must_use]
    pub const fn flow(&self) -> &OrderingFlow {
        &self.flow
    }

    #[must_use]
    pub const fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    /// Café chosen by the last successful scan.
    #[must_use]
    pub fn scanned_cafe(&self) -> Option<&CafeView> {
        self.flow
            .scanned_cafe_id()
            .and_then(|id| self.catalog.cafe(id))
    }

    /// Beans offered at the scanned café.
    #[must_use]
    pub fn scanned_cafe_beans(&self) -> Vec<&BeanView> {
        self.flow
            .scanned_cafe_id()
            .map(|id| self.catalog.beans_at(id))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn profile(&self) -> ProfileSummary {
        ProfileSummary::build(self.orders.as_slice(), &self.favorites, &self.catalog)
    }
}

fn record_failure(failed: &mut Vec<Collection>, collection: Collection, error: Option<StoreError>) {
    if let Some(e) = error {
        report_remote_error(&format!("load {collection}"), &e);
        failed.push(collection);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use coffee_compass_core::FlowStep;

    use super::*;
    use crate::navigation::MemoryHistory;
    use crate::notify::RecordingNotifier;
    use crate::preferences::ACTIVE_TAB_KEY;
    use crate::store::{BeanRow, CafeRow, MemoryStore};

    struct Fixture {
        store: Arc<MemoryStore>,
        notifier: RecordingNotifier,
        history: MemoryHistory,
        preferences: Arc<MemoryPreferences>,
    }

    fn fixture() -> Fixture {
        let cafe: CafeRow =
            serde_json::from_value(json!({ "id": "1", "name": "Artisan Coffee Lab" })).unwrap();
        let bean: BeanRow = serde_json::from_value(
            json!({ "id": "b1", "name": "Kenya AA", "notes": "Blackcurrant, Tomato", "cafe_id": "1" }),
        )
        .unwrap();

        Fixture {
            store: Arc::new(MemoryStore::new().with_cafes(vec![cafe]).with_beans(vec![bean])),
            notifier: RecordingNotifier::new(),
            history: MemoryHistory::new(),
            preferences: Arc::new(MemoryPreferences::new()),
        }
    }

    impl Fixture {
        async fn start(&self) -> AppCoordinator {
            let collaborators = Collaborators::new(self.store.clone())
                .with_notifier(Arc::new(self.notifier.clone()))
                .with_history(Arc::new(self.history.clone()))
                .with_preferences(self.preferences.clone());
            AppCoordinator::start(collaborators).await.0
        }
    }

    #[tokio::test]
    async fn test_start_loads_catalog() {
        let fx = fixture();
        let (app, summary) = AppCoordinator::start(Collaborators::new(fx.store.clone())).await;

        assert!(summary.is_complete());
        assert_eq!(summary.cafes, 1);
        assert_eq!(summary.beans, 1);
        assert_eq!(app.catalog().cafe(&CafeId::new("1")).unwrap().bean_names, vec!["Kenya AA"]);
    }

    #[tokio::test]
    async fn test_full_checkin() {
        let fx = fixture();
        let mut app = fx.start().await;

        app.select_tab(MainTab::Scan);
        assert_eq!(app.current_screen(), Screen::Ordering(FlowStep::Scan));
        assert!(app.on_scan_result("https://example.com/cafe/1").unwrap());
        assert_eq!(app.scanned_cafe_beans().len(), 1);
        app.select_bean(BeanId::new("b1")).unwrap();

        let outcome = app
            .complete_ordering(BrewMethod::PourOver, Some(5), Some("great cup".to_string()))
            .await
            .unwrap();

        let CheckinOutcome::Saved(view) = outcome else {
            panic!("expected saved order");
        };
        assert_eq!(view.flavor_tags, vec!["Blackcurrant", "Tomato"]);
        assert_eq!(app.orders().len(), 1);
        assert!(!app.flow().is_active());
        assert_eq!(app.navigation().main_tab, MainTab::Map);
        assert_eq!(
            fx.notifier.notifications(),
            vec![crate::notify::Notification::Success(ORDER_SAVED.to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_checkin_resets_flow() {
        let fx = fixture();
        let mut app = fx.start().await;
        fx.store.fail(Collection::Orders);

        app.start_ordering();
        app.on_scan_result("1").unwrap();
        app.select_bean(BeanId::new("b1")).unwrap();
        let outcome = app
            .complete_ordering(BrewMethod::PourOver, Some(5), Some("great cup".to_string()))
            .await
            .unwrap();

        assert!(matches!(outcome, CheckinOutcome::Failed(AppError::Remote(_))));
        assert!(app.orders().is_empty());
        assert_eq!(app.flow(), &OrderingFlow::Inactive);
        assert_eq!(app.navigation().main_tab, MainTab::Map);
        assert_eq!(fx.notifier.errors(), vec![ORDER_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_complete_outside_brew_order_is_flow_error() {
        let fx = fixture();
        let mut app = fx.start().await;
        app.start_ordering();

        let result = app.complete_ordering(BrewMethod::Espresso, None, None).await;
        assert!(matches!(result, Err(FlowError::InvalidTransition { .. })));
        assert_eq!(app.flow().step(), Some(FlowStep::Scan));
    }

    #[tokio::test]
    async fn test_empty_scan_stays_on_scan_step() {
        let fx = fixture();
        let mut app = fx.start().await;
        app.start_ordering();

        assert_eq!(app.on_scan_result("   "), Err(ScanError::Empty));
        assert_eq!(app.flow().scan_error(), Some(&ScanError::Empty));
        assert_eq!(app.flow().step(), Some(FlowStep::Scan));

        app.on_scan_error("camera unavailable");
        assert!(matches!(app.flow().scan_error(), Some(ScanError::Scanner(_))));
    }

    #[tokio::test]
    async fn test_stale_scan_result_is_ignored() {
        let fx = fixture();
        let mut app = fx.start().await;
        assert_eq!(app.on_scan_result("1"), Ok(false));
        assert!(!app.flow().is_active());
    }

    #[tokio::test]
    async fn test_tab_selection_persists_and_pushes_history() {
        let fx = fixture();
        let mut app = fx.start().await;

        app.start_ordering();
        app.select_tab(MainTab::History);

        assert!(!app.flow().is_active());
        assert_eq!(app.current_screen(), Screen::Tab(MainTab::History));
        assert_eq!(fx.history.current(), Some(HistoryEntry::history()));
        assert_eq!(
            fx.preferences.get(ACTIVE_TAB_KEY).unwrap().as_deref(),
            Some("history")
        );

        app.select_tab(MainTab::Scan);
        assert_eq!(app.navigation().main_tab, MainTab::History);
        assert!(app.flow().is_active());
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_previous_data() {
        let fx = fixture();
        let mut app = fx.start().await;
        fx.store.fail(Collection::Cafes);

        let summary = app.reload().await;

        assert_eq!(summary.failed, vec![Collection::Cafes]);
        assert_eq!(summary.cafes, 1);
        assert_eq!(fx.notifier.errors(), vec![LOAD_FAILED.to_string()]);
    }

    #[tokio::test]
    async fn test_order_history_groups_by_day() {
        let fx = fixture();
        let mut app = fx.start().await;
        app.add_order(OrderDraft {
            cafe_id: CafeId::new("1"),
            bean_id: BeanId::new("b1"),
            method: BrewMethod::Chemex,
            rating: None,
            note: None,
        })
        .await
        .unwrap();

        let days = app.order_history_in(&Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].orders[0].cafe_name, "Artisan Coffee Lab");
    }
}
