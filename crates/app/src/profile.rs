//! Profile summary derived from orders and favorites.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::catalog::{BeanView, CafeView, Catalog};
use crate::favorites::FavoritesLedger;
use crate::orders::Order;

/// How many of the most frequent flavor tags are kept.
pub const TOP_TASTE_COUNT: usize = 3;
/// Cap on the flavor preference tags shown.
pub const MAX_FLAVOR_PREFERENCES: usize = 12;

/// Everything the profile screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub order_count: usize,
    /// Favorite cafés that still resolve, by name.
    pub favorite_cafes: Vec<CafeView>,
    /// Favorite beans that still resolve, by name.
    pub favorite_beans: Vec<BeanView>,
    /// Most frequent flavor tags, most frequent first, ties alphabetical.
    pub top_tastes: Vec<String>,
    /// Tags from orders of favorite beans, then the remaining top tastes.
    pub flavor_preferences: Vec<String>,
}

impl ProfileSummary {
    #[must_use]
    pub fn build(orders: &[Order], favorites: &FavoritesLedger, catalog: &Catalog) -> Self {
        let mut favorite_cafes: Vec<CafeView> = favorites
            .cafe_ids()
            .iter()
            .filter_map(|id| catalog.cafe(id).cloned())
            .collect();
        favorite_cafes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let mut favorite_beans: Vec<BeanView> = favorites
            .bean_ids()
            .iter()
            .filter_map(|id| catalog.bean(id).cloned())
            .collect();
        favorite_beans.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let top_tastes = top_tastes(orders);
        let flavor_preferences = flavor_preferences(orders, &favorite_beans, &top_tastes);

        Self {
            order_count: orders.len(),
            favorite_cafes,
            favorite_beans,
            top_tastes,
            flavor_preferences,
        }
    }

    /// The single most frequent tag.
    #[must_use]
    pub fn top_taste(&self) -> Option<&str> {
        self.top_tastes.first().map(String::as_str)
    }
}

fn top_tastes(orders: &[Order]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in orders.iter().flat_map(|o| &o.flavor_tags) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_TASTE_COUNT)
        .map(|(tag, _)| tag.to_string())
        .collect()
}

fn flavor_preferences(orders: &[Order], favorite_beans: &[BeanView], top: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tags: Vec<String> = Vec::new();

    let favorite_tags = favorite_beans.iter().flat_map(move |bean| {
        orders
            .iter()
            .filter(move |order| order.bean_id == bean.id)
            .flat_map(|order| &order.flavor_tags)
    });

    for tag in favorite_tags.chain(top) {
        if seen.insert(tag.as_str()) {
            tags.push(tag.clone());
        }
    }
    tags.truncate(MAX_FLAVOR_PREFERENCES);
    tags
}
