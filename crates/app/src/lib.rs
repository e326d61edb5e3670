//! Coffee Compass application coordinator.
//!
//! This crate owns the application state behind every screen: the ordering
//! flow (scan → select bean → record brew), favorites and order history kept
//! in sync with the remote store, navigation bridged to a history stack, and
//! the view models built from raw store rows.
//!
//! # Modules
//!
//! - [`coordinator`] - [`AppCoordinator`], the single owner of app state
//! - [`store`] - [`RemoteStore`] trait with REST and in-memory backends
//! - [`catalog`] - Café and bean view models
//! - [`favorites`] - Favorites ledger and ordered remote sync
//! - [`orders`] - Order log, validation and day grouping
//! - [`flow`] - Ordering flow state machine
//! - [`navigation`] - Navigation state and history bridge
//! - [`scan`] - Scan payload parsing
//! - [`profile`] - Profile summary
//! - [`preferences`] - Persisted active tab
//! - [`notify`] - User notifications
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod favorites;
pub mod flow;
pub mod navigation;
pub mod notify;
pub mod orders;
pub mod preferences;
pub mod profile;
pub mod scan;
pub mod store;

pub use coordinator::{AppCoordinator, CheckinOutcome, Collaborators, ReloadSummary};
pub use error::{AppError, Result, ValidationError};
pub use favorites::FavoriteTarget;
pub use flow::{FlowError, OrderingFlow};
pub use navigation::{HistoryEntry, MemoryHistory, NavigationHistory, Screen};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use orders::{OrderDraft, OrderView};
pub use store::{MemoryStore, RemoteStore, RestStore, StoreError};
