//! Recording mocks of the port traits, shared by the job tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pipeline::{
    AccountId, Category, CompetitorNews, FetchError, Finding, NewsFeed, Notifier, NotifyError,
    Platform, PlatformUserId, PostId, PostSource, RawPost, Snapshot, StateRepository, StoreError,
    SummarizeError, Summarizer, Timestamp, TrackedAccount,
};

pub fn accounts(handles: &[&str]) -> Vec<TrackedAccount> {
    handles
        .iter()
        .map(|h| TrackedAccount::new(AccountId::new(*h).unwrap(), h.to_uppercase()))
        .collect()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
    Timestamp::from_utc(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
}

// ---------------------------------------------------------------------------
// PostSource
// ---------------------------------------------------------------------------

/// Returns one post per account unless the account is marked as failing.
pub struct MockSource {
    platform: Platform,
    failing: HashSet<String>,
    empty: HashSet<String>,
    next_id: u64,
    pub resolved: Mutex<Vec<String>>,
    pub fetched: Mutex<Vec<(String, Option<PlatformUserId>)>>,
}

impl MockSource {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            failing: HashSet::new(),
            empty: HashSet::new(),
            next_id: 1000,
            resolved: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, handle: &str) -> Self {
        self.failing.insert(handle.to_string());
        self
    }

    pub fn without_posts(mut self, handle: &str) -> Self {
        self.empty.insert(handle.to_string());
        self
    }

    pub fn fetched_handles(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .map(|(h, _)| h.clone())
            .collect()
    }

    pub fn resolved_handles(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSource for MockSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn resolve_user_id(
        &self,
        account: &TrackedAccount,
    ) -> Result<Option<PlatformUserId>, FetchError> {
        if self.platform != Platform::Twitter {
            return Ok(None);
        }
        self.resolved
            .lock()
            .unwrap()
            .push(account.id.to_string());
        if self.failing.contains(account.id.as_str()) {
            return Err(FetchError::RateLimited { retry_after: None });
        }
        Ok(Some(PlatformUserId::new(
            self.next_id + account.id.as_str().len() as u64,
        )))
    }

    async fn fetch_posts(
        &self,
        account: &TrackedAccount,
        user_id: Option<PlatformUserId>,
        since: Timestamp,
    ) -> Result<Vec<RawPost>, FetchError> {
        self.fetched
            .lock()
            .unwrap()
            .push((account.id.to_string(), user_id));
        if self.failing.contains(account.id.as_str()) {
            return Err(FetchError::Transport {
                message: "connection reset".into(),
            });
        }
        if self.empty.contains(account.id.as_str()) {
            return Ok(Vec::new());
        }
        Ok(vec![RawPost {
            id: PostId::new(format!("{}-1", account.id)).unwrap(),
            account: account.id.clone(),
            text: format!("{} news", account.id),
            url: format!("https://x.com/{}/status/1", account.id),
            posted_at: Some(since),
        }])
    }
}

// ---------------------------------------------------------------------------
// Summarizer
// ---------------------------------------------------------------------------

/// Turns every batch into one product finding, or fails for chosen accounts.
#[derive(Default)]
pub struct MockSummarizer {
    failing: HashSet<String>,
    pub batches: Mutex<Vec<(String, usize)>>,
}

impl MockSummarizer {
    pub fn failing(mut self, handle: &str) -> Self {
        self.failing.insert(handle.to_string());
        self
    }

    pub fn batch_accounts(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|(h, _)| h.clone())
            .collect()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        account: &TrackedAccount,
        posts: &[RawPost],
    ) -> Result<Vec<Finding>, SummarizeError> {
        self.batches
            .lock()
            .unwrap()
            .push((account.id.to_string(), posts.len()));
        if self.failing.contains(account.id.as_str()) {
            return Err(SummarizeError::Malformed {
                message: "not json".into(),
            });
        }
        Ok(vec![Finding {
            category: Category::Product,
            headline: format!("{} shipped something", account.display_name),
            url: posts.first().map(|p| p.url.clone()),
            critical: false,
        }])
    }
}

// ---------------------------------------------------------------------------
// NewsFeed
// ---------------------------------------------------------------------------

/// Serves a fixed bulletin, or a transport failure.
pub struct MockFeed {
    news: Option<CompetitorNews>,
}

impl MockFeed {
    pub fn serving(news: CompetitorNews) -> Self {
        Self { news: Some(news) }
    }

    pub fn failing() -> Self {
        Self { news: None }
    }
}

#[async_trait]
impl NewsFeed for MockFeed {
    async fn latest(&self) -> Result<CompetitorNews, FetchError> {
        self.news.clone().ok_or_else(|| FetchError::Transport {
            message: "connection refused".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockNotifier {
    fail: bool,
    pub sent: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "internal_error".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StateRepository
// ---------------------------------------------------------------------------

/// In-memory repository that counts saves.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Snapshot>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn with(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            saves: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl StateRepository for MemoryStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap() = snapshot.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}

/// Counts how often each handle appears.
pub fn tally(handles: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for h in handles {
        *counts.entry(h.clone()).or_insert(0) += 1;
    }
    counts
}
