//! Navigation state and its bridge to a browser-like history stack.
//!
//! Forward navigation pushes a [`HistoryEntry`] through [`NavigationHistory`];
//! when the platform pops an entry the coordinator feeds it to
//! [`NavigationState::apply_history`], which never pushes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use coffee_compass_core::{BeanId, CafeId, FlowStep, MainTab};

use crate::catalog::Catalog;
use crate::flow::OrderingFlow;

/// View kind recorded in a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryView {
    Map,
    Cafe,
    Bean,
    History,
}

/// State attached to one history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub view: HistoryView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl HistoryEntry {
    #[must_use]
    pub fn cafe(id: &CafeId) -> Self {
        Self {
            view: HistoryView::Cafe,
            id: Some(id.to_string()),
        }
    }

    #[must_use]
    pub fn bean(id: &BeanId) -> Self {
        Self {
            view: HistoryView::Bean,
            id: Some(id.to_string()),
        }
    }

    #[must_use]
    pub const fn history() -> Self {
        Self {
            view: HistoryView::History,
            id: None,
        }
    }

    #[must_use]
    pub const fn map() -> Self {
        Self {
            view: HistoryView::Map,
            id: None,
        }
    }

    /// URL path shown for the entry.
    #[must_use]
    pub fn path(&self) -> String {
        match (self.view, self.id.as_deref()) {
            (HistoryView::Cafe, Some(id)) => format!("/cafe/{id}"),
            (HistoryView::Bean, Some(id)) => format!("/bean/{id}"),
            (HistoryView::History, _) => "/history".to_string(),
            _ => "/".to_string(),
        }
    }

    /// Decode platform-provided state, `None` when it is not a known entry.
    #[must_use]
    pub fn from_state(state: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(state.clone()).ok()
    }
}

/// Browser-like history the navigation controller writes to.
pub trait NavigationHistory: Send + Sync {
    /// Record a new entry after the current one.
    fn push(&self, entry: HistoryEntry);
}

/// History that drops every entry, for front ends without back/forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl NavigationHistory for NoHistory {
    fn push(&self, _entry: HistoryEntry) {}
}

#[derive(Debug)]
struct HistoryStack {
    /// The initial page carries no state.
    entries: Vec<Option<HistoryEntry>>,
    cursor: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self {
            entries: vec![None],
            cursor: 0,
        }
    }
}

/// In-memory history stack with a back/forward cursor.
///
/// Clones share the same stack.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    inner: Arc<Mutex<HistoryStack>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move back one entry; returns whether the cursor moved.
    pub fn back(&self) -> bool {
        let mut stack = self.lock();
        if stack.cursor == 0 {
            return false;
        }
        stack.cursor -= 1;
        true
    }

    /// Move forward one entry; returns whether the cursor moved.
    pub fn forward(&self) -> bool {
        let mut stack = self.lock();
        if stack.cursor + 1 >= stack.entries.len() {
            return false;
        }
        stack.cursor += 1;
        true
    }

    /// Entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<HistoryEntry> {
        let stack = self.lock();
        stack.entries.get(stack.cursor).cloned().flatten()
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Option<HistoryEntry>> {
        self.lock().entries.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryStack> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NavigationHistory for MemoryHistory {
    fn push(&self, entry: HistoryEntry) {
        let mut stack = self.lock();
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(Some(entry));
        stack.cursor = keep;
    }
}

/// Active tab, open detail and map selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub main_tab: MainTab,
    pub cafe_detail: Option<CafeId>,
    pub bean_detail: Option<BeanId>,
    pub selected_cafe: Option<CafeId>,
}

impl NavigationState {
    /// Start on a restored tab.
    #[must_use]
    pub fn with_tab(main_tab: MainTab) -> Self {
        Self {
            main_tab,
            ..Self::default()
        }
    }

    /// Open a café detail, closing any bean detail and selecting it on the map.
    pub fn open_cafe(&mut self, id: CafeId) {
        self.bean_detail = None;
        self.selected_cafe = Some(id.clone());
        self.cafe_detail = Some(id);
    }

    /// Open a bean detail, closing any café detail.
    pub fn open_bean(&mut self, id: BeanId) {
        self.cafe_detail = None;
        self.bean_detail = Some(id);
    }

    pub fn close_detail(&mut self) {
        self.cafe_detail = None;
        self.bean_detail = None;
    }

    /// Bottom-navigation switch: details close first.
    pub fn switch_tab(&mut self, tab: MainTab) {
        self.close_detail();
        self.main_tab = tab;
    }

    /// Highlight a café on the map without opening it.
    pub fn select_cafe(&mut self, id: Option<CafeId>) {
        self.selected_cafe = id;
    }

    /// Translate a popped history entry into state.
    ///
    /// Missing or unusable entries fall back to the map tab with no detail.
    pub fn apply_history(&mut self, entry: Option<&HistoryEntry>) {
        let (view, id) = entry.map_or((HistoryView::Map, None), |e| (e.view, e.id.as_deref()));

        match (view, id) {
            (HistoryView::Cafe, Some(id)) => {
                let id = CafeId::new(id);
                self.bean_detail = None;
                self.cafe_detail = Some(id.clone());
                self.main_tab = MainTab::Map;
                self.selected_cafe = Some(id);
            }
            (HistoryView::Bean, Some(id)) => {
                self.cafe_detail = None;
                self.bean_detail = Some(BeanId::new(id));
            }
            (HistoryView::History, _) => self.switch_tab(MainTab::History),
            _ => self.switch_tab(MainTab::Map),
        }
    }
}

/// What the app shows right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Ordering(FlowStep),
    BeanDetail(BeanId),
    CafeDetail(CafeId),
    Tab(MainTab),
}

/// Pick the screen by priority: ordering flow, bean detail, café detail, tab.
///
/// A detail whose record is not loaded is passed over.
#[must_use]
pub fn resolve_screen(flow: &OrderingFlow, nav: &NavigationState, catalog: &Catalog) -> Screen {
    if let Some(step) = flow.step() {
        return Screen::Ordering(step);
    }
    if let Some(id) = nav.bean_detail.as_ref().filter(|id| catalog.bean(id).is_some()) {
        return Screen::BeanDetail(id.clone());
    }
    if let Some(id) = nav.cafe_detail.as_ref().filter(|id| catalog.cafe(id).is_some()) {
        return Screen::CafeDetail(id.clone());
    }
    Screen::Tab(nav.main_tab)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::{BeanRow, CafeRow};

    #[test]
    fn test_opening_bean_closes_cafe() {
        let mut nav = NavigationState::default();
        nav.open_cafe(CafeId::new("cafe-3"));
        nav.open_bean(BeanId::new("bean-7"));

        assert_eq!(nav.cafe_detail, None);
        assert_eq!(nav.bean_detail, Some(BeanId::new("bean-7")));
        assert_eq!(nav.selected_cafe, Some(CafeId::new("cafe-3")));
    }

    #[test]
    fn test_apply_history_variants() {
        let mut nav = NavigationState::with_tab(MainTab::Profile);
        nav.open_bean(BeanId::new("b1"));

        nav.apply_history(Some(&HistoryEntry::cafe(&CafeId::new("2"))));
        assert_eq!(nav.main_tab, MainTab::Map);
        assert_eq!(nav.cafe_detail, Some(CafeId::new("2")));
        assert_eq!(nav.selected_cafe, Some(CafeId::new("2")));
        assert_eq!(nav.bean_detail, None);

        nav.apply_history(Some(&HistoryEntry::bean(&BeanId::new("b1"))));
        assert_eq!(nav.cafe_detail, None);
        assert_eq!(nav.bean_detail, Some(BeanId::new("b1")));

        nav.apply_history(Some(&HistoryEntry::history()));
        assert_eq!(nav.main_tab, MainTab::History);
        assert_eq!(nav.bean_detail, None);

        nav.apply_history(None);
        assert_eq!(nav.main_tab, MainTab::Map);
    }

    #[test]
    fn test_apply_history_is_idempotent() {
        let entry = HistoryEntry::cafe(&CafeId::new("2"));
        let mut once = NavigationState::default();
        once.apply_history(Some(&entry));
        let mut twice = once.clone();
        twice.apply_history(Some(&entry));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cafe_entry_without_id_falls_back_to_map() {
        let mut nav = NavigationState::with_tab(MainTab::History);
        nav.apply_history(Some(&HistoryEntry {
            view: HistoryView::Cafe,
            id: None,
        }));
        assert_eq!(nav, NavigationState::default());
    }

    #[test]
    fn test_from_state_rejects_unknown_views() {
        assert_eq!(
            HistoryEntry::from_state(&json!({ "view": "bean", "id": "b1" })),
            Some(HistoryEntry::bean(&BeanId::new("b1")))
        );
        assert_eq!(HistoryEntry::from_state(&json!({ "view": "settings" })), None);
        assert_eq!(HistoryEntry::from_state(&json!(null)), None);
    }

    #[test]
    fn test_paths() {
        assert_eq!(HistoryEntry::cafe(&CafeId::new("42")).path(), "/cafe/42");
        assert_eq!(HistoryEntry::history().path(), "/history");
        assert_eq!(HistoryEntry::map().path(), "/");
    }

    #[test]
    fn test_memory_history_back_forward() {
        let history = MemoryHistory::new();
        history.push(HistoryEntry::cafe(&CafeId::new("1")));
        history.push(HistoryEntry::bean(&BeanId::new("b1")));

        assert!(history.back());
        assert_eq!(history.current(), Some(HistoryEntry::cafe(&CafeId::new("1"))));
        assert!(history.back());
        assert_eq!(history.current(), None);
        assert!(!history.back());

        assert!(history.forward());
        history.push(HistoryEntry::history());
        assert!(!history.forward());
        assert_eq!(history.entries().len(), 3);
    }

    #[test]
    fn test_resolve_screen_priority() {
        let cafe: CafeRow = serde_json::from_value(json!({ "id": "1", "name": "Lab" })).unwrap();
        let bean: BeanRow =
            serde_json::from_value(json!({ "id": "b1", "name": "Kenya", "cafe_id": "1" })).unwrap();
        let catalog = Catalog::build(&[cafe], &[bean]);

        let mut nav = NavigationState::default();
        let mut flow = OrderingFlow::default();
        assert_eq!(resolve_screen(&flow, &nav, &catalog), Screen::Tab(MainTab::Map));

        nav.open_cafe(CafeId::new("1"));
        assert_eq!(
            resolve_screen(&flow, &nav, &catalog),
            Screen::CafeDetail(CafeId::new("1"))
        );

        nav.open_bean(BeanId::new("missing"));
        assert_eq!(resolve_screen(&flow, &nav, &catalog), Screen::Tab(MainTab::Map));

        nav.open_bean(BeanId::new("b1"));
        flow.start();
        assert_eq!(
            resolve_screen(&flow, &nav, &catalog),
            Screen::Ordering(FlowStep::Scan)
        );
    }
}
