//! Favorites ledger and its ordered remote sync.
//!
//! # Architecture
//!
//! - [`FavoritesLedger`] owns the local sets; a toggle flips membership
//!   immediately and says which remote call mirrors it
//! - [`FavoriteSync`] feeds those calls to one background task over an
//!   unbounded channel, so they reach the store in toggle order
//! - A failed call is logged, captured and turned into an error notification;
//!   the local flip stays (no rollback)

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, instrument, warn};

use coffee_compass_core::{BeanId, CafeId, FavoriteKind};

use crate::error::report_remote_error;
use crate::notify::Notifier;
use crate::store::{FavoriteRow, NewFavorite, RemoteStore};

/// Notification shown when a favorite could not be saved remotely.
pub const FAVORITE_SYNC_FAILED: &str = "Couldn't update favorites. Please try again.";

/// The café or bean a favorite points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FavoriteTarget {
    Cafe(CafeId),
    Bean(BeanId),
}

impl FavoriteTarget {
    #[must_use]
    pub const fn kind(&self) -> FavoriteKind {
        match self {
            Self::Cafe(_) => FavoriteKind::Cafe,
            Self::Bean(_) => FavoriteKind::Bean,
        }
    }

    /// Raw id, regardless of kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Cafe(id) => id.as_str(),
            Self::Bean(id) => id.as_str(),
        }
    }
}

impl std::fmt::Display for FavoriteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Remote call that mirrors a local toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteOp {
    Insert(FavoriteTarget),
    Delete(FavoriteTarget),
}

impl FavoriteOp {
    #[must_use]
    pub const fn target(&self) -> &FavoriteTarget {
        match self {
            Self::Insert(target) | Self::Delete(target) => target,
        }
    }
}

/// Local favorite membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesLedger {
    cafes: HashSet<CafeId>,
    beans: HashSet<BeanId>,
}

impl FavoritesLedger {
    /// Build the sets from stored rows.
    ///
    /// Rows that reference both a café and a bean, or neither, are skipped.
    #[must_use]
    pub fn from_rows(rows: &[FavoriteRow]) -> Self {
        let mut ledger = Self::default();
        for row in rows {
            match row.target() {
                Some(FavoriteTarget::Cafe(id)) => {
                    ledger.cafes.insert(id);
                }
                Some(FavoriteTarget::Bean(id)) => {
                    ledger.beans.insert(id);
                }
                None => warn!(favorite_id = %row.id, "Skipping favorite row without exactly one target"),
            }
        }
        ledger
    }

    #[must_use]
    pub fn contains(&self, target: &FavoriteTarget) -> bool {
        match target {
            FavoriteTarget::Cafe(id) => self.cafes.contains(id),
            FavoriteTarget::Bean(id) => self.beans.contains(id),
        }
    }

    #[must_use]
    pub const fn cafe_ids(&self) -> &HashSet<CafeId> {
        &self.cafes
    }

    #[must_use]
    pub const fn bean_ids(&self) -> &HashSet<BeanId> {
        &self.beans
    }

    /// Flip membership and return the remote call that mirrors it.
    pub fn toggle(&mut self, target: FavoriteTarget) -> FavoriteOp {
        let removed = match &target {
            FavoriteTarget::Cafe(id) => self.cafes.remove(id),
            FavoriteTarget::Bean(id) => self.beans.remove(id),
        };
        if removed {
            return FavoriteOp::Delete(target);
        }

        match &target {
            FavoriteTarget::Cafe(id) => self.cafes.insert(id.clone()),
            FavoriteTarget::Bean(id) => self.beans.insert(id.clone()),
        };
        FavoriteOp::Insert(target)
    }
}

enum SyncMessage {
    Apply(FavoriteOp),
    Flush(oneshot::Sender<()>),
}

/// Ordered, fire-and-forget queue of favorite calls.
///
/// Dropping the handle lets the worker drain what is queued and stop.
pub struct FavoriteSync {
    tx: mpsc::UnboundedSender<SyncMessage>,
    notifier: Arc<dyn Notifier>,
}

impl FavoriteSync {
    /// Spawn the sync worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn spawn(store: Arc<dyn RemoteStore>, notifier: Arc<dyn Notifier>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, store, Arc::clone(&notifier)));
        Self { tx, notifier }
    }

    /// Queue a remote call behind every earlier one.
    pub fn submit(&self, op: FavoriteOp) {
        if self.tx.send(SyncMessage::Apply(op)).is_err() {
            error!("Favorite sync worker is gone; dropping favorite update");
            self.notifier.error(FAVORITE_SYNC_FAILED);
        }
    }

    /// Wait until every call queued so far has finished.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SyncMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

impl std::fmt::Debug for FavoriteSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteSync")
            .field("closed", &self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<SyncMessage>,
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(message) = rx.recv().await {
        match message {
            SyncMessage::Apply(op) => apply(store.as_ref(), notifier.as_ref(), &op).await,
            SyncMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Favorite sync worker stopped");
}

#[instrument(skip(store, notifier))]
async fn apply(store: &dyn RemoteStore, notifier: &dyn Notifier, op: &FavoriteOp) {
    let result = match op {
        FavoriteOp::Insert(target) => store
            .insert_favorite(&NewFavorite::from(target))
            .await
            .map(|_| ()),
        FavoriteOp::Delete(target) => store.delete_favorite(target).await,
    };

    match result {
        Ok(()) => debug!(favorite = %op.target(), "Favorite synced"),
        Err(e) => {
            report_remote_error("toggle_favorite", &e);
            notifier.error(FAVORITE_SYNC_FAILED);
        }
    }
}
