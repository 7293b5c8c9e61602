//! Resolves platform user IDs ahead of monitoring runs.
//!
//! A cache miss during a run costs an extra paced API call. Pre-caching
//! spends a small, bounded number of lookups outside the run instead.

use std::time::Duration;

use pipeline::{PostSource, StateRepository, StoreError, TrackedAccount};
use tracing::{info, instrument, warn};

use crate::pacing::Pacer;

/// Lookups spent per invocation unless configured otherwise.
pub const DEFAULT_LOOKUP_BUDGET: usize = 3;

/// Outcome of a pre-cache run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecacheReport {
    /// Accounts without a cached ID before the run.
    pub missing: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Accounts still without a cached ID after the run.
    pub remaining: usize,
}

pub struct IdPrecache<'a> {
    source: &'a dyn PostSource,
    budget: usize,
    delay: Duration,
}

impl<'a> IdPrecache<'a> {
    pub fn new(source: &'a dyn PostSource, delay: Duration) -> Self {
        Self {
            source,
            budget: DEFAULT_LOOKUP_BUDGET,
            delay,
        }
    }

    #[must_use]
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Resolves up to the budget of uncached accounts, in list order.
    #[instrument(skip_all, fields(platform = %self.source.platform(), budget = self.budget))]
    pub async fn run(
        &self,
        accounts: &[TrackedAccount],
        store: &dyn StateRepository,
    ) -> Result<PrecacheReport, StoreError> {
        let mut snapshot = store.load()?;
        let missing: Vec<&TrackedAccount> = accounts
            .iter()
            .filter(|a| !snapshot.id_cache.contains(&a.id))
            .collect();
        info!(missing = missing.len(), cached = snapshot.id_cache.len(), "checking id cache");

        let mut pacer = Pacer::new(self.delay);
        let mut resolved = 0;
        let mut failed = 0;
        for account in missing.iter().take(self.budget) {
            pacer.wait().await;
            match self.source.resolve_user_id(account).await {
                Ok(Some(id)) => {
                    snapshot.id_cache.insert(account.id.clone(), id);
                    resolved += 1;
                    info!(account = %account.id, %id, "cached user id");
                }
                Ok(None) => {
                    // Platform addresses accounts directly; nothing to cache.
                    info!("platform has no user ids; stopping");
                    break;
                }
                Err(err) => {
                    failed += 1;
                    warn!(account = %account.id, error = %err, "lookup failed; will retry later");
                }
            }
        }

        store.save(&snapshot)?;
        Ok(PrecacheReport {
            missing: missing.len(),
            resolved,
            failed,
            remaining: missing.len() - resolved,
        })
    }
}
