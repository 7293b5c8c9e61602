//! An unrotated scan of every account, sent straight to the channel.
//!
//! The scan answers "what happened lately" on demand. It reads the same
//! lookback window as a monitoring run but accumulates nothing and leaves the
//! rotation cursor alone; only newly resolved user IDs are kept.

use pipeline::{
    render, Notifier, Platform, PostSource, StateRepository, StoreError, Summarizer, Timestamp,
    TrackedAccount,
};
use tracing::{info, instrument, warn};

use crate::coordinator::MonitorSettings;
use crate::gather::{fetch_all, summarize_all};

/// Outcome of an on-demand scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub platform: Platform,
    pub accounts: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Items in the reply.
    pub items: usize,
    pub sent: bool,
}

pub struct OnDemandScan<'a> {
    source: &'a dyn PostSource,
    summarizer: &'a dyn Summarizer,
    notifier: &'a dyn Notifier,
    settings: MonitorSettings,
}

impl<'a> OnDemandScan<'a> {
    /// `settings.quota` is not used: a scan always covers every account.
    pub fn new(
        source: &'a dyn PostSource,
        summarizer: &'a dyn Summarizer,
        notifier: &'a dyn Notifier,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            summarizer,
            notifier,
            settings,
        }
    }

    /// Scans `accounts` and sends the "Latest Competitive Intelligence" reply,
    /// or a service-issue notice when no account could be fetched.
    #[instrument(name = "intel_scan", skip_all, fields(platform = %self.source.platform()))]
    pub async fn run(
        &self,
        accounts: &[TrackedAccount],
        store: &dyn StateRepository,
        now: Timestamp,
    ) -> Result<ScanReport, StoreError> {
        let platform = self.source.platform();
        let mut snapshot = store.load()?;
        let cached_before = snapshot.id_cache.len();

        let all: Vec<&TrackedAccount> = accounts.iter().collect();
        let since = now.hours_before(self.settings.lookback_hours);
        let gathered = fetch_all(
            self.source,
            &all,
            &mut snapshot.id_cache,
            since,
            self.settings.fetch_delay,
        )
        .await;
        let items = summarize_all(
            self.summarizer,
            &gathered.batches,
            platform,
            now,
            self.settings.summarize_delay,
        )
        .await;

        let text = if !all.is_empty() && gathered.succeeded == 0 {
            render::service_issue()
        } else {
            render::latest_intelligence(&items, self.settings.lookback_hours)
        };
        let sent = match self.notifier.send(&text).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "scan reply failed");
                false
            }
        };

        if snapshot.id_cache.len() != cached_before {
            store.save(&snapshot)?;
        }

        info!(
            accounts = all.len(),
            succeeded = gathered.succeeded,
            failed = gathered.failed,
            items = items.len(),
            sent,
            "scan complete"
        );
        Ok(ScanReport {
            platform,
            accounts: all.len(),
            succeeded: gathered.succeeded,
            failed: gathered.failed,
            items: items.len(),
            sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{accounts, at, MemoryStore, MockNotifier, MockSource, MockSummarizer};
    use pipeline::{Quota, RotationState, Snapshot};

    fn settings() -> MonitorSettings {
        MonitorSettings::for_platform(Platform::Twitter, Quota::new(1).unwrap()).without_delays()
    }

    fn store_at(cursor: usize) -> MemoryStore {
        MemoryStore::with(Snapshot {
            rotation: RotationState {
                cursor,
                ..RotationState::default()
            },
            ..Snapshot::default()
        })
    }

    #[tokio::test]
    async fn covers_every_account_without_touching_rotation() {
        let list = accounts(&["a", "b", "c"]);
        let source = MockSource::new(Platform::Twitter).failing("b");
        let summarizer = MockSummarizer::default();
        let notifier = MockNotifier::default();
        let store = store_at(2);

        let report = OnDemandScan::new(&source, &summarizer, &notifier, settings())
            .run(&list, &store, at(2026, 10, 16, 9))
            .await
            .unwrap();

        assert_eq!(
            report,
            ScanReport {
                platform: Platform::Twitter,
                accounts: 3,
                succeeded: 2,
                failed: 1,
                items: 2,
                sent: true,
            }
        );
        assert_eq!(source.fetched_handles(), ["a", "c"]);
        let messages = notifier.messages();
        assert!(messages[0].starts_with("📊 *Latest Competitive Intelligence*\n"));
        assert!(messages[0].contains("A shipped something"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.rotation.cursor, 2);
        assert!(snapshot.intelligence.is_empty());
        assert_eq!(snapshot.id_cache.len(), 2);
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn nothing_notable_still_replies() {
        let list = accounts(&["a"]);
        let source = MockSource::new(Platform::LinkedIn).without_posts("a");
        let summarizer = MockSummarizer::default();
        let notifier = MockNotifier::default();
        let store = store_at(0);

        let report = OnDemandScan::new(&source, &summarizer, &notifier, settings())
            .run(&list, &store, at(2026, 10, 16, 9))
            .await
            .unwrap();

        assert!(report.sent);
        assert_eq!(report.items, 0);
        assert!(notifier.messages()[0]
            .contains("No significant developments detected in the last 24 hours"));
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn every_fetch_failing_reports_a_service_issue() {
        let list = accounts(&["a", "b"]);
        let source = MockSource::new(Platform::LinkedIn).failing("a").failing("b");
        let summarizer = MockSummarizer::default();
        let notifier = MockNotifier::default();
        let store = store_at(0);

        let report = OnDemandScan::new(&source, &summarizer, &notifier, settings())
            .run(&list, &store, at(2026, 10, 16, 9))
            .await
            .unwrap();

        assert_eq!(report.succeeded, 0);
        assert!(notifier.messages()[0].starts_with("⚠️ *Service Issue*"));
        assert!(summarizer.batch_accounts().is_empty());
    }
}
