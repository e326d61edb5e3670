//! History, favorites and profile commands.

use std::io::Write;

use coffee_compass_app::{AppCoordinator, FavoriteTarget};
use coffee_compass_core::MainTab;

use super::{CommandResult, stars};

/// Print order history grouped by local day, newest first.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn history(app: &mut AppCoordinator) -> CommandResult {
    app.select_tab(MainTab::History);
    let days = app.order_history();
    let mut out = std::io::stdout().lock();

    if days.is_empty() {
        writeln!(out, "No orders yet. Scan a café code to log your first brew.")?;
        return Ok(());
    }

    for day in days {
        writeln!(out, "{}", day.date.format("%A, %B %-d, %Y"))?;
        for order in day.orders {
            writeln!(
                out,
                "  {} · {} @ {} · {} {}",
                order.created_at.with_timezone(&chrono::Local).format("%H:%M"),
                order.bean_name,
                order.cafe_name,
                order.method.display_name(),
                stars(order.rating),
            )?;
            if let Some(note) = &order.note {
                writeln!(out, "    \"{note}\"")?;
            }
            if !order.flavor_tags.is_empty() {
                writeln!(out, "    {}", order.flavor_tags.join(", "))?;
            }
        }
    }
    Ok(())
}

/// Toggle a favorite and report the new state.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn toggle_favorite(app: &mut AppCoordinator, target: FavoriteTarget) -> CommandResult {
    let now_favorite = app.toggle_favorite(target.clone());
    let mut out = std::io::stdout().lock();
    if now_favorite {
        writeln!(out, "Added {target} to favorites")?;
    } else {
        writeln!(out, "Removed {target} from favorites")?;
    }
    Ok(())
}

/// Print the profile summary.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn profile(app: &mut AppCoordinator) -> CommandResult {
    app.select_tab(MainTab::Profile);
    let summary = app.profile();
    let mut out = std::io::stdout().lock();

    writeln!(out, "Orders: {}", summary.order_count)?;
    writeln!(
        out,
        "Top taste: {}",
        summary.top_taste().unwrap_or("Not enough data")
    )?;
    writeln!(out, "Favorite beans: {}", summary.favorite_beans.len())?;
    writeln!(out, "Favorite cafés: {}", summary.favorite_cafes.len())?;

    if !summary.flavor_preferences.is_empty() {
        writeln!(
            out,
            "Flavor preferences: {}",
            summary.flavor_preferences.join(", ")
        )?;
    }
    for bean in &summary.favorite_beans {
        writeln!(out, "  ♥ bean [{}] {} · {}", bean.id, bean.name, bean.origin)?;
    }
    for cafe in &summary.favorite_cafes {
        writeln!(out, "  ♥ café [{}] {} · {}", cafe.id, cafe.name, cafe.distance)?;
    }
    Ok(())
}
