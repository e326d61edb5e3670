//! Coffee Compass Core - Shared domain types.
//!
//! This crate provides the types used across all Coffee Compass components:
//! - `app` - The application state coordinator (ordering flow, favorites, history)
//! - `cli` - Command-line front end for browsing cafés and checking in
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, brew methods, ratings, tabs and favorite kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
