//! One monitoring run for one platform.
//!
//! A run loads the snapshot, selects the next slice of accounts, fetches and
//! summarizes their recent posts, sends a per-run update and saves the
//! snapshot. Network failures never abort a run; only the state store can.

use std::time::Duration;

use chrono_tz::Tz;
use pipeline::rotation::select;
use pipeline::{
    render, Notifier, Platform, PostSource, Quota, RunId, StateRepository, StoreError,
    Summarizer, Timestamp, TrackedAccount,
};
use tracing::{info, instrument, warn};

use crate::gather::{fetch_all, summarize_all};

/// Default window of posts considered new.
pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;

/// Tunables for a monitoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Accounts polled per run.
    pub quota: Quota,
    /// Posts older than `now - lookback_hours` are ignored.
    pub lookback_hours: u32,
    /// Spacing between post-source calls.
    pub fetch_delay: Duration,
    /// Spacing between model calls.
    pub summarize_delay: Duration,
}

impl MonitorSettings {
    /// Defaults for `platform`: 6 s between Twitter proxy calls (free tier),
    /// 2 s between LinkedIn calls, 1 s between model calls.
    pub fn for_platform(platform: Platform, quota: Quota) -> Self {
        let fetch_delay = match platform {
            Platform::Twitter => Duration::from_secs(6),
            Platform::LinkedIn => Duration::from_secs(2),
        };
        Self {
            quota,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            fetch_delay,
            summarize_delay: Duration::from_secs(1),
        }
    }

    /// Settings with no delays, for callers that pace elsewhere.
    pub fn without_delays(mut self) -> Self {
        self.fetch_delay = Duration::ZERO;
        self.summarize_delay = Duration::ZERO;
        self
    }
}

/// Outcome of a monitoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    pub platform: Platform,
    /// Accounts selected for this run.
    pub selected: usize,
    /// Selected accounts whose fetch succeeded (possibly with no posts).
    pub succeeded: usize,
    /// Selected accounts skipped because resolution or fetch failed.
    pub failed: usize,
    /// Intelligence items appended to the accumulator.
    pub items: usize,
    /// Whether a per-run update was delivered.
    pub notified: bool,
    /// Whether the rotation cursor moved.
    pub cursor_advanced: bool,
}

/// Drives a monitoring run against the injected ports.
pub struct RotationCoordinator<'a> {
    source: &'a dyn PostSource,
    summarizer: &'a dyn Summarizer,
    notifier: &'a dyn Notifier,
    settings: MonitorSettings,
    tz: Tz,
}

impl<'a> RotationCoordinator<'a> {
    pub fn new(
        source: &'a dyn PostSource,
        summarizer: &'a dyn Summarizer,
        notifier: &'a dyn Notifier,
        settings: MonitorSettings,
        tz: Tz,
    ) -> Self {
        Self {
            source,
            summarizer,
            notifier,
            settings,
            tz,
        }
    }

    /// Runs one rotation slice of `accounts`.
    ///
    /// # Errors
    ///
    /// Only a failure to load or save state aborts the run. Fetch,
    /// summarization and notification failures are logged and absorbed.
    pub async fn run(
        &self,
        accounts: &[TrackedAccount],
        store: &dyn StateRepository,
        now: Timestamp,
    ) -> Result<RunReport, StoreError> {
        self.run_with_id(RunId::new_random(), accounts, store, now).await
    }

    #[instrument(
        name = "monitor_run",
        skip_all,
        fields(platform = %self.source.platform(), %run_id)
    )]
    async fn run_with_id(
        &self,
        run_id: RunId,
        accounts: &[TrackedAccount],
        store: &dyn StateRepository,
        now: Timestamp,
    ) -> Result<RunReport, StoreError> {
        let platform = self.source.platform();
        let mut snapshot = store.load()?;

        let selection = select(accounts, snapshot.rotation.cursor, self.settings.quota);
        info!(
            total = selection.total,
            start = selection.start,
            selected = selection.accounts.len(),
            "selected accounts"
        );

        let since = now.hours_before(self.settings.lookback_hours);
        let gathered = fetch_all(
            self.source,
            &selection.accounts,
            &mut snapshot.id_cache,
            since,
            self.settings.fetch_delay,
        )
        .await;
        let (succeeded, failed) = (gathered.succeeded, gathered.failed);

        let new_items = summarize_all(
            self.summarizer,
            &gathered.batches,
            platform,
            now,
            self.settings.summarize_delay,
        )
        .await;
        for item in &new_items {
            snapshot.append(item.clone());
        }

        let notified = if new_items.is_empty() {
            false
        } else {
            let text = render::run_update(platform, now.local_date(self.tz), &new_items);
            match self.notifier.send(&text).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "per-run notification failed");
                    false
                }
            }
        };

        let cursor_advanced = succeeded > 0 || selection.is_empty();
        if cursor_advanced {
            snapshot.rotation.advance(&selection, now);
        } else {
            warn!(
                cursor = snapshot.rotation.cursor,
                "every selected fetch failed; keeping cursor so the slice is retried"
            );
        }
        store.save(&snapshot)?;

        let report = RunReport {
            run_id,
            platform,
            selected: selection.accounts.len(),
            succeeded,
            failed,
            items: new_items.len(),
            notified,
            cursor_advanced,
        };
        info!(
            succeeded,
            failed,
            items = report.items,
            notified,
            cursor_advanced,
            next_cursor = snapshot.rotation.cursor,
            "run complete"
        );
        Ok(report)
    }
}
