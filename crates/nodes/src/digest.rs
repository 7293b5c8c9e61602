//! The once-a-day summary of accumulated intelligence.

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use pipeline::{render, Notifier, StateRepository, StoreError, Timestamp};
use tracing::{info, instrument, warn};

/// Days of items kept behind the digested day.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// The local calendar day before `now` in `tz`.
pub fn previous_day(now: Timestamp, tz: Tz) -> NaiveDate {
    let today = now.local_date(tz);
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// Outcome of a digest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestReport {
    pub day: NaiveDate,
    /// Distinct items in the message (after headline dedup).
    pub items: usize,
    pub sent: bool,
    /// Items removed for the digested day.
    pub cleared: usize,
    /// Items removed for falling out of the retention window.
    pub pruned: usize,
}

/// Sends one day's items as a single message.
pub struct DailyDigest<'a> {
    notifier: &'a dyn Notifier,
    tz: Tz,
    retention_days: u32,
}

impl<'a> DailyDigest<'a> {
    pub fn new(notifier: &'a dyn Notifier, tz: Tz) -> Self {
        Self {
            notifier,
            tz,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Sends the digest for `day` and tidies the accumulator. `now` only
    /// decides whether the header calls the day "yesterday".
    ///
    /// The day's items are removed only when the message was delivered, so a
    /// failed send can be retried with `--date`. Items older than the
    /// retention window are pruned either way.
    #[instrument(skip_all, fields(%day))]
    pub async fn send_for(
        &self,
        day: NaiveDate,
        now: Timestamp,
        store: &dyn StateRepository,
    ) -> Result<DigestReport, StoreError> {
        let mut snapshot = store.load()?;

        let todays = snapshot.intelligence.for_day(day, self.tz);
        let items = render::dedupe_by_headline(&todays).len();
        let text = render::daily_digest(day, now.local_date(self.tz), &todays);
        info!(raw = todays.len(), items, "rendering digest");

        let sent = match self.notifier.send(&text).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "digest delivery failed; keeping the day's items");
                false
            }
        };

        let cleared = if sent {
            snapshot.intelligence.clear_day(day, self.tz)
        } else {
            0
        };
        let cutoff = day
            .checked_sub_days(Days::new(u64::from(self.retention_days)))
            .unwrap_or(NaiveDate::MIN);
        let pruned = snapshot.intelligence.prune_before(cutoff, self.tz);
        store.save(&snapshot)?;

        info!(sent, cleared, pruned, remaining = snapshot.intelligence.len(), "digest complete");
        Ok(DigestReport {
            day,
            items,
            sent,
            cleared,
            pruned,
        })
    }
}
