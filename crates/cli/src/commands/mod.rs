//! CLI command implementations.
//!
//! Commands write their results to stdout; logs go to stderr.

pub mod account;
pub mod browse;
pub mod checkin;

use std::io::Write;

use coffee_compass_app::RecordingNotifier;
use coffee_compass_app::notify::Notification;
use coffee_compass_core::Rating;

/// Result type shared by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Print the notifications raised while the command ran.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn print_notifications(notifier: &RecordingNotifier) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    for notification in notifier.notifications() {
        match notification {
            Notification::Success(message) => writeln!(out, "✔ {message}")?,
            Notification::Error(message) => writeln!(out, "✖ {message}")?,
        }
    }
    Ok(())
}

/// Render a rating as filled and empty stars.
pub fn stars(rating: Option<Rating>) -> String {
    let filled = rating.map_or(0, Rating::stars);
    (Rating::MIN..=Rating::MAX)
        .map(|n| if n <= filled { '★' } else { '☆' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(Rating::new(3).ok()), "★★★☆☆");
        assert_eq!(stars(None), "☆☆☆☆☆");
    }
}
