//! Unified error handling with Sentry integration.
//!
//! Each module owns its error type. [`AppError`] is returned by operations
//! that validate input and then call the remote store; scan, flow and
//! preference errors stay in their own types. Remote failures never reach UI
//! callers as errors: they are reported through [`report_remote_error`] and
//! turned into notifications at the coordinator boundary.

use thiserror::Error;

use coffee_compass_core::{BeanId, CafeId, RatingError};

use crate::store::StoreError;

/// A referenced record does not exist or an input is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Café id does not resolve to a loaded café.
    #[error("Unknown café: {0}")]
    UnknownCafe(CafeId),

    /// Bean id does not resolve to a loaded bean.
    #[error("Unknown bean: {0}")]
    UnknownBean(BeanId),

    /// Star rating outside 1-5.
    #[error(transparent)]
    Rating(#[from] RatingError),
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input referenced something that does not exist.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote store call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] StoreError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Log a failed remote call and capture it to Sentry.
///
/// Sentry capture is a no-op when no client was initialized.
pub fn report_remote_error(operation: &str, err: &StoreError) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        operation,
        error = %err,
        sentry_event_id = %event_id,
        "Remote store call failed"
    );
}

/// Add a breadcrumb for a user action.
///
/// Breadcrumbs appear in Sentry reports to show the trail of actions that
/// led up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
