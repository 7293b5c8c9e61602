//! Forwards the external competitor news bulletin to the channel.

use pipeline::{render, FetchError, NewsFeed, Notifier};
use tracing::{info, instrument, warn};

/// Outcome of a news run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsReport {
    pub sections: usize,
    pub entries: usize,
    /// `false` when the bulletin was empty or delivery failed.
    pub sent: bool,
}

pub struct NewsBulletin<'a> {
    feed: &'a dyn NewsFeed,
    notifier: &'a dyn Notifier,
}

impl<'a> NewsBulletin<'a> {
    pub fn new(feed: &'a dyn NewsFeed, notifier: &'a dyn Notifier) -> Self {
        Self { feed, notifier }
    }

    /// Fetches the bulletin and sends it. An empty bulletin sends nothing.
    ///
    /// # Errors
    ///
    /// Returns the feed's error when the bulletin cannot be fetched.
    /// Delivery failures are reported through [`NewsReport::sent`].
    #[instrument(name = "competitor_news", skip_all)]
    pub async fn send(&self) -> Result<NewsReport, FetchError> {
        let news = self.feed.latest().await?;
        let mut report = NewsReport {
            sections: news.sections().len(),
            entries: news.entry_count(),
            sent: false,
        };
        if news.is_empty() {
            info!("no competitor news today");
            return Ok(report);
        }

        match self.notifier.send(&render::competitor_news(&news)).await {
            Ok(()) => report.sent = true,
            Err(err) => warn!(error = %err, "competitor news delivery failed"),
        }
        info!(
            sections = report.sections,
            entries = report.entries,
            sent = report.sent,
            "competitor news complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockFeed, MockNotifier};
    use pipeline::{CompetitorNews, NewsEntry, NewsSection};

    fn bulletin() -> CompetitorNews {
        CompetitorNews::new(vec![NewsSection {
            name: "Fund Raise".into(),
            entries: vec![NewsEntry {
                company: "Sierra".into(),
                text: "Raised $175M".into(),
                url: Some("https://example.com/sierra".into()),
            }],
        }])
    }

    #[tokio::test]
    async fn sends_the_rendered_bulletin() {
        let feed = MockFeed::serving(bulletin());
        let notifier = MockNotifier::default();

        let report = NewsBulletin::new(&feed, &notifier).send().await.unwrap();

        assert_eq!(
            report,
            NewsReport {
                sections: 1,
                entries: 1,
                sent: true,
            }
        );
        let messages = notifier.messages();
        assert!(messages[0].contains("*💰 Fund Raise*"));
        assert!(messages[0].contains("<https://example.com/sierra|🔗>"));
    }

    #[tokio::test]
    async fn empty_bulletin_sends_nothing() {
        let feed = MockFeed::serving(CompetitorNews::default());
        let notifier = MockNotifier::default();

        let report = NewsBulletin::new(&feed, &notifier).send().await.unwrap();

        assert!(!report.sent);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn feed_failure_is_returned_and_delivery_failure_reported() {
        let notifier = MockNotifier::default();
        let err = NewsBulletin::new(&MockFeed::failing(), &notifier)
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));

        let feed = MockFeed::serving(bulletin());
        let rejecting = MockNotifier::failing();
        let report = NewsBulletin::new(&feed, &rejecting).send().await.unwrap();
        assert!(!report.sent);
        assert_eq!(rejecting.messages().len(), 1);
    }
}
