//! Denormalized café and bean view models.
//!
//! [`Catalog::build`] is a pure function of the raw rows; it runs after every
//! successful load and never touches the store.

use std::collections::HashMap;

use serde::Serialize;

use coffee_compass_core::{BeanId, CafeId};

use crate::store::{BeanRow, CafeRow, OpeningHours};

/// Label shown for an order whose café no longer resolves.
pub const UNKNOWN_CAFE: &str = "Unknown Café";
/// Label shown for an order whose bean no longer resolves.
pub const UNKNOWN_BEAN: &str = "Unknown Bean";

/// A finite map position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Coerce stored values; both must be finite numbers or numeric strings.
    #[must_use]
    pub fn from_raw(lat: Option<&serde_json::Value>, lng: Option<&serde_json::Value>) -> Option<Self> {
        Some(Self {
            lat: coerce_finite(lat?)?,
            lng: coerce_finite(lng?)?,
        })
    }
}

fn coerce_finite(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Café as every screen consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CafeView {
    pub id: CafeId,
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub rating: f64,
    pub reviews: u32,
    pub is_open: bool,
    pub distance: String,
    pub image_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub opening_hours: Vec<OpeningHours>,
    /// Beans whose owning café is this one, in load order.
    pub bean_ids: Vec<BeanId>,
    /// Display names of `bean_ids`, falling back to the id for unnamed beans.
    pub bean_names: Vec<String>,
}

/// Summary of a café offering a bean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CafeOffering {
    pub id: CafeId,
    pub name: String,
    pub distance: String,
    pub rating: f64,
    pub is_open: bool,
}

impl From<&CafeView> for CafeOffering {
    fn from(cafe: &CafeView) -> Self {
        Self {
            id: cafe.id.clone(),
            name: cafe.name.clone(),
            distance: cafe.distance.clone(),
            rating: cafe.rating,
            is_open: cafe.is_open,
        }
    }
}

/// Bean as every screen consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeanView {
    pub id: BeanId,
    pub name: String,
    pub origin: String,
    pub roaster: String,
    pub flavor_notes: Vec<String>,
    pub description: String,
    pub roast_level: String,
    pub process: String,
    pub altitude: String,
    pub image_url: Option<String>,
    pub cafe_id: Option<CafeId>,
    /// Empty when the owning café is unknown.
    pub cafes_offering: Vec<CafeOffering>,
}

/// Split a comma-separated notes column into trimmed, non-empty tags.
#[must_use]
pub fn split_flavor_notes(notes: Option<&str>) -> Vec<String> {
    notes
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|note| !note.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loaded cafés and beans keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    cafes: HashMap<CafeId, CafeView>,
    beans: HashMap<BeanId, BeanView>,
}

impl Catalog {
    /// Join café and bean rows into view models.
    #[must_use]
    pub fn build(cafe_rows: &[CafeRow], bean_rows: &[BeanRow]) -> Self {
        let mut beans_by_cafe: HashMap<&CafeId, Vec<&BeanRow>> = HashMap::new();
        for bean in bean_rows {
            if let Some(cafe_id) = &bean.cafe_id {
                beans_by_cafe.entry(cafe_id).or_default().push(bean);
            }
        }

        let cafes: HashMap<CafeId, CafeView> = cafe_rows
            .iter()
            .map(|row| {
                let offered = beans_by_cafe.get(&row.id).map_or(&[][..], Vec::as_slice);
                (row.id.clone(), cafe_view(row, offered))
            })
            .collect();

        let beans = bean_rows
            .iter()
            .map(|row| (row.id.clone(), bean_view(row, &cafes)))
            .collect();

        Self { cafes, beans }
    }

    #[must_use]
    pub fn cafe(&self, id: &CafeId) -> Option<&CafeView> {
        self.cafes.get(id)
    }

    #[must_use]
    pub fn bean(&self, id: &BeanId) -> Option<&BeanView> {
        self.beans.get(id)
    }

    #[must_use]
    pub const fn cafes_by_id(&self) -> &HashMap<CafeId, CafeView> {
        &self.cafes
    }

    #[must_use]
    pub const fn beans_by_id(&self) -> &HashMap<BeanId, BeanView> {
        &self.beans
    }

    /// Every café, ordered by name then id.
    #[must_use]
    pub fn cafes_sorted(&self) -> Vec<&CafeView> {
        let mut cafes: Vec<&CafeView> = self.cafes.values().collect();
        cafes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        cafes
    }

    /// Beans offered at a café, in the café's bean order.
    #[must_use]
    pub fn beans_at(&self, cafe_id: &CafeId) -> Vec<&BeanView> {
        self.cafe(cafe_id)
            .map(|cafe| cafe.bean_ids.iter().filter_map(|id| self.bean(id)).collect())
            .unwrap_or_default()
    }

    /// Cafés whose name contains `query`, ignoring case.
    ///
    /// A blank query matches every café.
    #[must_use]
    pub fn search_cafes(&self, query: &str) -> Vec<&CafeView> {
        let needle = query.trim().to_lowercase();
        self.cafes_sorted()
            .into_iter()
            .filter(|cafe| needle.is_empty() || cafe.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Café name, or the placeholder when it does not resolve.
    #[must_use]
    pub fn cafe_name(&self, id: &CafeId) -> &str {
        self.cafe(id).map_or(UNKNOWN_CAFE, |cafe| cafe.name.as_str())
    }

    /// Bean name, or the placeholder when it does not resolve.
    #[must_use]
    pub fn bean_name(&self, id: &BeanId) -> &str {
        self.bean(id).map_or(UNKNOWN_BEAN, |bean| bean.name.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cafes.is_empty() && self.beans.is_empty()
    }
}

fn cafe_view(row: &CafeRow, offered: &[&BeanRow]) -> CafeView {
    CafeView {
        id: row.id.clone(),
        name: row.name.clone(),
        coordinates: Coordinates::from_raw(row.lat.as_ref(), row.lng.as_ref()),
        rating: row.rating.unwrap_or_default(),
        reviews: row.reviews.unwrap_or_default(),
        is_open: row.is_open.unwrap_or(true),
        distance: row.distance.clone().unwrap_or_default(),
        image_url: row.image_url.clone(),
        address: row.address.clone(),
        phone: row.phone.clone(),
        opening_hours: row.opening_hours.clone().unwrap_or_default(),
        bean_ids: offered.iter().map(|bean| bean.id.clone()).collect(),
        bean_names: offered
            .iter()
            .map(|bean| {
                if bean.name.trim().is_empty() {
                    bean.id.to_string()
                } else {
                    bean.name.clone()
                }
            })
            .collect(),
    }
}

fn bean_view(row: &BeanRow, cafes: &HashMap<CafeId, CafeView>) -> BeanView {
    let cafes_offering = row
        .cafe_id
        .as_ref()
        .and_then(|id| cafes.get(id))
        .map(|cafe| vec![CafeOffering::from(cafe)])
        .unwrap_or_default();

    BeanView {
        id: row.id.clone(),
        name: row.name.clone(),
        origin: row.origin.clone().unwrap_or_default(),
        roaster: row.roaster.clone().unwrap_or_default(),
        flavor_notes: split_flavor_notes(row.notes.as_deref()),
        description: row
            .description
            .clone()
            .or_else(|| row.notes.clone())
            .unwrap_or_default(),
        roast_level: row.roast_level.clone().unwrap_or_default(),
        process: row.process.clone().unwrap_or_default(),
        altitude: row.altitude.clone().unwrap_or_default(),
        image_url: row.image_url.clone(),
        cafe_id: row.cafe_id.clone(),
        cafes_offering,
    }
}
