//! Fetch and summarize steps shared by the rotation run and the on-demand
//! scan.

use std::time::Duration;

use pipeline::{
    FetchError, IdCache, IntelligenceItem, Platform, PlatformUserId, PostSource, RawPost,
    Summarizer, Timestamp, TrackedAccount,
};
use tracing::{debug, warn};

use crate::pacing::Pacer;

/// Posts collected from a set of accounts.
pub(crate) struct Gathered<'a> {
    /// Accounts that returned at least one post, with their posts.
    pub batches: Vec<(&'a TrackedAccount, Vec<RawPost>)>,
    /// Accounts whose fetch succeeded, posts or not.
    pub succeeded: usize,
    /// Accounts skipped because resolution or fetch failed.
    pub failed: usize,
}

/// Fetches every account in order, paced, skipping failures.
pub(crate) async fn fetch_all<'a>(
    source: &dyn PostSource,
    accounts: &[&'a TrackedAccount],
    id_cache: &mut IdCache,
    since: Timestamp,
    delay: Duration,
) -> Gathered<'a> {
    let mut pacer = Pacer::new(delay);
    let mut gathered = Gathered {
        batches: Vec::new(),
        succeeded: 0,
        failed: 0,
    };
    for &account in accounts {
        match fetch_account(source, account, id_cache, since, &mut pacer).await {
            Ok(posts) => {
                gathered.succeeded += 1;
                debug!(account = %account.id, posts = posts.len(), "fetched");
                if !posts.is_empty() {
                    gathered.batches.push((account, posts));
                }
            }
            Err(err) => {
                gathered.failed += 1;
                warn!(
                    account = %account.id,
                    rate_limited = err.is_rate_limited(),
                    error = %err,
                    "skipping account this run"
                );
            }
        }
    }
    gathered
}

/// Resolves the account's user ID (through the cache) and fetches posts.
async fn fetch_account(
    source: &dyn PostSource,
    account: &TrackedAccount,
    id_cache: &mut IdCache,
    since: Timestamp,
    pacer: &mut Pacer,
) -> Result<Vec<RawPost>, FetchError> {
    pacer.wait().await;
    let user_id: Option<PlatformUserId> = match id_cache.get(&account.id) {
        Some(id) => Some(id),
        None => {
            let resolved = source.resolve_user_id(account).await?;
            if let Some(id) = resolved {
                id_cache.insert(account.id.clone(), id);
                // The lookup was a network call; space the fetch after it.
                pacer.wait().await;
            }
            resolved
        }
    };
    source.fetch_posts(account, user_id, since).await
}

/// Summarizes one batch per account. A failed batch counts as nothing
/// notable.
pub(crate) async fn summarize_all(
    summarizer: &dyn Summarizer,
    batches: &[(&TrackedAccount, Vec<RawPost>)],
    platform: Platform,
    now: Timestamp,
    delay: Duration,
) -> Vec<IntelligenceItem> {
    let mut pacer = Pacer::new(delay);
    let mut items = Vec::new();
    for (account, posts) in batches {
        pacer.wait().await;
        match summarizer.summarize(account, posts).await {
            Ok(findings) => items.extend(
                findings
                    .into_iter()
                    .map(|f| IntelligenceItem::from_finding(f, account, platform, now)),
            ),
            Err(err) => warn!(
                account = %account.id,
                error = %err,
                "summarization failed; treating batch as nothing notable"
            ),
        }
    }
    items
}
