use std::sync::Arc;

use super::accounts::AccountManager;
use super::applications::ApplicationManager;
use super::clock::Clock;
use super::context::LifecycleContext;
use super::ids::IdSequence;
use super::internships::InternshipManager;
use super::notify::NotificationSink;
use super::policy::PlacementPolicy;
use super::report::{self, PlacementSummary, ReportFilters};
use super::store::{PlacementStore, RepositoryError};
use super::withdrawals::WithdrawalManager;

/// The lifecycle managers wired to one store, notifier, clock, and lock.
pub struct PlacementServices<S: ?Sized, N: ?Sized> {
    pub accounts: AccountManager<S, N>,
    pub internships: InternshipManager<S, N>,
    pub applications: ApplicationManager<S, N>,
    pub withdrawals: WithdrawalManager<S, N>,
    store: Arc<S>,
}

impl<S, N> PlacementServices<S, N>
where
    S: PlacementStore + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RepositoryError> {
        Self::with_policy(store, notifier, clock, PlacementPolicy::default())
    }

    /// Build the managers, seeding identifiers past whatever the store holds.
    pub fn with_policy(
        store: Arc<S>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        policy: PlacementPolicy,
    ) -> Result<Self, RepositoryError> {
        let ids = IdSequence::seeded_from(store.as_ref())?;
        let ctx = LifecycleContext::new(Arc::clone(&store), notifier, clock, ids, policy);

        Ok(Self {
            accounts: AccountManager::new(ctx.clone()),
            internships: InternshipManager::new(ctx.clone()),
            applications: ApplicationManager::new(ctx.clone()),
            withdrawals: WithdrawalManager::new(ctx),
            store,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn summary(&self, filters: &ReportFilters) -> Result<PlacementSummary, RepositoryError> {
        report::summarize(self.store.as_ref(), filters)
    }
}
