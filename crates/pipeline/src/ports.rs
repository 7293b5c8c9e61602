//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer sees external services only through these traits:
//! `social` implements [`PostSource`] and [`NewsFeed`], `llm` implements
//! [`Summarizer`], `slack` implements [`Notifier`]. All calls are made
//! sequentially by a single run.

use async_trait::async_trait;

use crate::news::CompetitorNews;
use crate::{
    FetchError, Finding, NotifyError, Platform, PlatformUserId, RawPost, SummarizeError,
    Timestamp, TrackedAccount,
};

/// A platform API that returns recent posts for a tracked account.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// The platform this source reads.
    fn platform(&self) -> Platform;

    /// Resolves the platform-internal numeric ID for `account`.
    ///
    /// Platforms that address accounts directly by identifier return
    /// `Ok(None)` without making a call; that is the default.
    async fn resolve_user_id(
        &self,
        account: &TrackedAccount,
    ) -> Result<Option<PlatformUserId>, FetchError> {
        let _ = account;
        Ok(None)
    }

    /// Fetches posts published at or after `since`.
    ///
    /// `user_id` is the cached or freshly resolved ID when the platform uses
    /// one.
    async fn fetch_posts(
        &self,
        account: &TrackedAccount,
        user_id: Option<PlatformUserId>,
        since: Timestamp,
    ) -> Result<Vec<RawPost>, FetchError>;
}

/// A language model that turns a batch of posts into categorized findings.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `posts`, all published by `account`.
    ///
    /// An empty result means nothing in the batch was notable.
    async fn summarize(
        &self,
        account: &TrackedAccount,
        posts: &[RawPost],
    ) -> Result<Vec<Finding>, SummarizeError>;
}

/// An external service publishing ready-made competitor news.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Fetches the current bulletin.
    async fn latest(&self) -> Result<CompetitorNews, FetchError>;
}

/// A chat destination for formatted text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text` (Slack mrkdwn). Not retried on failure.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
