//! Core types for Coffee Compass.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod brew;
pub mod id;
pub mod rating;
pub mod status;

pub use brew::{BrewMethod, BrewMethodError};
pub use id::*;
pub use rating::{Rating, RatingError};
pub use status::*;
