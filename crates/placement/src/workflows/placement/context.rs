use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tracing::warn;

use super::clock::Clock;
use super::ids::IdSequence;
use super::notify::NotificationSink;
use super::policy::PlacementPolicy;

/// Collaborators shared by every manager built from one `PlacementServices`.
///
/// `lock` serializes whole lifecycle operations: each manager holds it from
/// its first read until its commit returns, so the capacity and exclusivity
/// checks always see the state they are about to overwrite.
pub(crate) struct LifecycleContext<S: ?Sized, N: ?Sized> {
    pub(crate) store: Arc<S>,
    pub(crate) ids: Arc<IdSequence>,
    pub(crate) policy: PlacementPolicy,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    lock: Arc<Mutex<()>>,
}

impl<S: ?Sized, N: ?Sized> Clone for LifecycleContext<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ids: Arc::clone(&self.ids),
            policy: self.policy,
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            lock: Arc::clone(&self.lock),
        }
    }
}

impl<S, N> LifecycleContext<S, N>
where
    S: ?Sized,
    N: NotificationSink + ?Sized,
{
    pub(crate) fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        ids: IdSequence,
        policy: PlacementPolicy,
    ) -> Self {
        Self {
            store,
            ids: Arc::new(ids),
            policy,
            notifier,
            clock,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Enter the operation-wide critical section. The guard protects no data
    /// of its own, so a poisoned lock is still safe to reuse.
    pub(crate) fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn announce(&self, message: String) {
        if let Err(err) = self.notifier.notify(&message) {
            warn!(error = %err, %message, "notification delivery failed");
        }
    }
}
