//! Café and bean browsing commands.

use std::io::Write;

use coffee_compass_app::{AppCoordinator, FavoriteTarget, Screen};
use coffee_compass_core::{BeanId, CafeId};

use super::CommandResult;

/// List cafés by name, optionally filtered.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn list_cafes(app: &AppCoordinator, search: Option<&str>) -> CommandResult {
    let cafes = app.catalog().search_cafes(search.unwrap_or_default());
    let mut out = std::io::stdout().lock();

    if cafes.is_empty() {
        writeln!(out, "No cafés found")?;
        return Ok(());
    }

    for cafe in cafes {
        let favorite = app.is_favorite(&FavoriteTarget::Cafe(cafe.id.clone()));
        writeln!(
            out,
            "{marker} [{id}] {name}  {rating:.1}★ ({reviews})  {distance}  {status}",
            marker = if favorite { "♥" } else { " " },
            id = cafe.id,
            name = cafe.name,
            rating = cafe.rating,
            reviews = cafe.reviews,
            distance = cafe.distance,
            status = if cafe.is_open { "open" } else { "closed" },
        )?;
        if !cafe.bean_names.is_empty() {
            writeln!(out, "      beans: {}", cafe.bean_names.join(", "))?;
        }
    }
    Ok(())
}

/// Open a café detail and print it.
///
/// # Errors
///
/// Returns an error if the café is not loaded or stdout cannot be written.
pub fn show_cafe(app: &mut AppCoordinator, id: CafeId) -> CommandResult {
    app.open_cafe(id.clone());
    let Screen::CafeDetail(open) = app.current_screen() else {
        return Err(format!("Café not found: {id}").into());
    };
    let Some(cafe) = app.catalog().cafe(&open) else {
        return Err(format!("Café not found: {id}").into());
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", cafe.name)?;
    writeln!(
        out,
        "{:.1}★ ({} reviews) · {} · {}",
        cafe.rating,
        cafe.reviews,
        cafe.distance,
        if cafe.is_open { "Open now" } else { "Closed" }
    )?;
    if let Some(coordinates) = cafe.coordinates {
        writeln!(out, "Location: {:.4}, {:.4}", coordinates.lat, coordinates.lng)?;
    }
    if let Some(address) = &cafe.address {
        writeln!(out, "Address: {address}")?;
    }
    if let Some(phone) = &cafe.phone {
        writeln!(out, "Phone: {phone}")?;
    }
    if !cafe.opening_hours.is_empty() {
        writeln!(out, "Hours:")?;
        for line in &cafe.opening_hours {
            writeln!(out, "  {:<10} {}", line.day, line.hours)?;
        }
    }

    let beans = app.catalog().beans_at(&open);
    writeln!(out, "Beans ({}):", beans.len())?;
    for bean in beans {
        writeln!(
            out,
            "  [{}] {} · {} · {}",
            bean.id,
            bean.name,
            bean.origin,
            bean.flavor_notes.join(", ")
        )?;
    }
    Ok(())
}

/// Open a bean detail and print it.
///
/// # Errors
///
/// Returns an error if the bean is not loaded or stdout cannot be written.
pub fn show_bean(app: &mut AppCoordinator, id: BeanId) -> CommandResult {
    app.open_bean(id.clone());
    let Screen::BeanDetail(open) = app.current_screen() else {
        return Err(format!("Bean not found: {id}").into());
    };
    let Some(bean) = app.catalog().bean(&open) else {
        return Err(format!("Bean not found: {id}").into());
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "{} ({})", bean.name, bean.roaster)?;
    writeln!(out, "Origin: {}", bean.origin)?;
    writeln!(
        out,
        "Roast: {} · Process: {} · Altitude: {}",
        bean.roast_level, bean.process, bean.altitude
    )?;
    writeln!(out, "Flavor notes: {}", bean.flavor_notes.join(", "))?;
    if !bean.description.is_empty() {
        writeln!(out, "{}", bean.description)?;
    }

    if bean.cafes_offering.is_empty() {
        writeln!(out, "Not currently offered at any café")?;
    } else {
        writeln!(out, "Available at:")?;
        for cafe in &bean.cafes_offering {
            writeln!(
                out,
                "  [{}] {} · {} · {:.1}★",
                cafe.id, cafe.name, cafe.distance, cafe.rating
            )?;
        }
    }
    Ok(())
}
