//! Checkin command: drives the ordering flow end to end.

use std::io::Write;

use coffee_compass_app::{AppCoordinator, CheckinOutcome};
use coffee_compass_core::{BeanId, BrewMethod, MainTab};

use super::{CommandResult, stars};

/// Arguments collected from the command line.
#[derive(Debug)]
pub struct CheckinInput {
    pub payload: String,
    pub bean_id: BeanId,
    pub method: BrewMethod,
    pub rating: Option<u8>,
    pub note: Option<String>,
}

/// Scan, pick a bean and record the brew.
///
/// # Errors
///
/// Returns an error if the payload has no café id, the bean is not offered at
/// the scanned café, the order could not be saved, or stdout cannot be written.
pub async fn run(app: &mut AppCoordinator, input: CheckinInput) -> CommandResult {
    app.select_tab(MainTab::Scan);
    app.on_scan_result(&input.payload)?;

    let Some(cafe) = app.scanned_cafe().cloned() else {
        app.cancel_ordering();
        return Err(format!("No café found for scanned code {:?}", input.payload).into());
    };

    if !cafe.bean_ids.contains(&input.bean_id) {
        app.cancel_ordering();
        return Err(format!(
            "{} does not offer bean {} (available: {})",
            cafe.name,
            input.bean_id,
            cafe.bean_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )
        .into());
    }

    app.select_bean(input.bean_id)?;
    let outcome = app
        .complete_ordering(input.method, input.rating, input.note)
        .await?;

    match outcome {
        CheckinOutcome::Saved(order) => {
            let mut out = std::io::stdout().lock();
            writeln!(
                out,
                "{} at {}: {} brewing method recorded {}",
                order.bean_name,
                order.cafe_name,
                order.method.display_name(),
                stars(order.rating)
            )?;
            Ok(())
        }
        CheckinOutcome::Failed(e) => Err(e.into()),
    }
}
