//! Order log: completed checkins, newest first.
//!
//! Orders are not optimistic. A draft is validated against the catalog, sent
//! to the store, and only the row the store hands back is added locally.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;

use coffee_compass_core::{BeanId, BrewMethod, CafeId, OrderId, Rating};

use crate::catalog::{Catalog, split_flavor_notes};
use crate::error::ValidationError;
use crate::store::{NewOrder, OrderRow};

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub cafe_id: CafeId,
    pub bean_id: BeanId,
    pub method: BrewMethod,
    pub rating: Option<Rating>,
    pub note: Option<String>,
    /// Flavor notes of the bean when the order was placed.
    pub flavor_tags: Vec<String>,
}

impl Order {
    /// Convert a stored row.
    ///
    /// Returns `None` for an unrecognized brew method. An out-of-range rating
    /// is dropped; a missing flavor snapshot falls back to the bean's current
    /// notes.
    #[must_use]
    pub fn from_row(row: OrderRow, catalog: &Catalog) -> Option<Self> {
        let Ok(method) = row.method.parse::<BrewMethod>() else {
            warn!(order_id = %row.id, method = %row.method, "Skipping order with unknown brew method");
            return None;
        };

        let rating = row.rating.and_then(|value| {
            Rating::new(value)
                .inspect_err(|e| warn!(order_id = %row.id, error = %e, "Dropping invalid rating"))
                .ok()
        });

        let flavor_tags = row.taste_profile.unwrap_or_else(|| {
            catalog
                .bean(&row.bean_id)
                .map(|bean| bean.flavor_notes.clone())
                .unwrap_or_default()
        });

        Some(Self {
            id: row.id,
            created_at: row.created_at,
            cafe_id: row.cafe_id,
            bean_id: row.bean_id,
            method,
            rating,
            note: row.notes.filter(|n| !n.trim().is_empty()),
            flavor_tags,
        })
    }
}

/// In-memory order history, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLog {
    orders: Vec<Order>,
}

impl OrderLog {
    /// Build the log from rows the store returned newest first.
    #[must_use]
    pub fn from_rows(rows: Vec<OrderRow>, catalog: &Catalog) -> Self {
        Self {
            orders: rows
                .into_iter()
                .filter_map(|row| Order::from_row(row, catalog))
                .collect(),
        }
    }

    /// Put a freshly stored order at the front.
    pub fn prepend(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// Swap in a reloaded log.
    pub fn replace(&mut self, other: Self) {
        *self = other;
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Order] {
        &self.orders
    }
}

/// User input for a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub cafe_id: CafeId,
    pub bean_id: BeanId,
    pub method: BrewMethod,
    pub rating: Option<u8>,
    pub note: Option<String>,
}

/// Check a draft against the catalog and build the insert payload.
///
/// The bean's current flavor notes are snapshotted into the payload.
///
/// # Errors
///
/// Returns [`ValidationError`] when the café or bean is not loaded or the
/// rating is outside 1-5.
pub fn validate(draft: &OrderDraft, catalog: &Catalog) -> Result<NewOrder, ValidationError> {
    if catalog.cafe(&draft.cafe_id).is_none() {
        return Err(ValidationError::UnknownCafe(draft.cafe_id.clone()));
    }
    let bean = catalog
        .bean(&draft.bean_id)
        .ok_or_else(|| ValidationError::UnknownBean(draft.bean_id.clone()))?;
    let rating = draft.rating.map(Rating::new).transpose()?;

    Ok(NewOrder {
        cafe_id: draft.cafe_id.clone(),
        bean_id: draft.bean_id.clone(),
        method: draft.method,
        rating,
        notes: draft
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        taste_profile: bean.flavor_notes.clone(),
    })
}

/// An order joined against the catalog at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub cafe_id: CafeId,
    pub cafe_name: String,
    pub bean_id: BeanId,
    pub bean_name: String,
    pub method: BrewMethod,
    pub rating: Option<Rating>,
    pub note: Option<String>,
    pub flavor_tags: Vec<String>,
}

impl OrderView {
    /// Resolve names; unresolved ids get the "Unknown" placeholders.
    #[must_use]
    pub fn new(order: &Order, catalog: &Catalog) -> Self {
        Self {
            id: order.id.clone(),
            created_at: order.created_at,
            cafe_id: order.cafe_id.clone(),
            cafe_name: catalog.cafe_name(&order.cafe_id).to_string(),
            bean_id: order.bean_id.clone(),
            bean_name: catalog.bean_name(&order.bean_id).to_string(),
            method: order.method,
            rating: order.rating,
            note: order.note.clone(),
            flavor_tags: order.flavor_tags.clone(),
        }
    }
}

/// Orders placed on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDay {
    pub date: NaiveDate,
    pub orders: Vec<OrderView>,
}

/// Group orders by calendar day in `tz`, most recent day first.
///
/// Orders keep their relative order within a day.
#[must_use]
pub fn group_by_day<Tz: TimeZone>(views: Vec<OrderView>, tz: &Tz) -> Vec<OrderDay> {
    let mut days: BTreeMap<NaiveDate, Vec<OrderView>> = BTreeMap::new();
    for view in views {
        let date = view.created_at.with_timezone(tz).date_naive();
        days.entry(date).or_default().push(view);
    }

    days.into_iter()
        .rev()
        .map(|(date, orders)| OrderDay { date, orders })
        .collect()
}
