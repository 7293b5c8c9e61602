//! Job entry points: validate configuration, wire adapters, run a job.
//!
//! Every job checks its credentials and loads its account list before any
//! adapter is constructed, so a misconfigured job fails without touching the
//! network.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use chrono_tz::Tz;
use nodes::{
    previous_day, DailyDigest, DigestReport, IdPrecache, MonitorSettings, NewsBulletin,
    NewsReport, OnDemandScan, PrecacheReport, RotationCoordinator, RunReport, ScanReport,
};
use pipeline::config::{
    require, EnvSource, MonitorCredentials, Secret, SLACK_WEBHOOK_VAR, TWITTER_API_KEY_VAR,
};
use pipeline::{
    ApiTier, ConfigError, NewsFeed, Notifier, Platform, PostSource, Quota, RotationInfo,
    StateRepository, Summarizer, Timestamp, TrackedAccount,
};
use store::{load_account_list, JsonFileStore, StatePaths};
use tracing::info;

/// Resolved options shared by every job.
#[derive(Debug, Clone)]
pub struct Settings {
    pub state_dir: PathBuf,
    pub twitter_accounts: PathBuf,
    pub linkedin_accounts: PathBuf,
    pub tier: ApiTier,
    /// Overrides the per-platform delay between post-source calls.
    pub call_delay: Option<Duration>,
    pub lookback_hours: u32,
    /// Tweets kept per account per fetch.
    pub max_posts: usize,
    pub tz: Tz,
    pub retention_days: u32,
    pub gemini_model: String,
}

impl Settings {
    pub fn accounts_path(&self, platform: Platform) -> &Path {
        match platform {
            Platform::Twitter => &self.twitter_accounts,
            Platform::LinkedIn => &self.linkedin_accounts,
        }
    }

    pub fn store(&self, platform: Platform) -> JsonFileStore {
        JsonFileStore::new(StatePaths::for_platform(&self.state_dir, platform))
    }

    fn load_accounts(&self, platform: Platform) -> Result<Vec<TrackedAccount>, ConfigError> {
        load_account_list(self.accounts_path(platform), platform)
    }

    fn monitor_settings(&self, platform: Platform, quota: Quota) -> MonitorSettings {
        let mut monitor_settings = MonitorSettings::for_platform(platform, quota);
        monitor_settings.lookback_hours = self.lookback_hours;
        if let Some(delay) = self.call_delay {
            monitor_settings.fetch_delay = delay;
        }
        monitor_settings
    }
}

/// Parses an API tier name.
pub fn parse_tier(value: &str) -> Result<ApiTier, ConfigError> {
    value.parse().map_err(|message| ConfigError::InvalidValue {
        key: "tier".into(),
        message,
    })
}

/// Parses an IANA timezone name such as `Asia/Kolkata`.
pub fn parse_timezone(value: &str) -> Result<Tz, ConfigError> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|e| ConfigError::InvalidValue {
            key: "timezone".into(),
            message: e.to_string(),
        })
}

/// How many accounts a monitoring run polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// The tier's quota.
    #[default]
    Tier,
    /// An explicit per-run count.
    Quota(usize),
    /// Every account in one run.
    Full,
}

impl Scope {
    pub fn quota(self, tier: ApiTier, total_accounts: usize) -> Result<Quota, ConfigError> {
        match self {
            Self::Tier => Ok(tier.quota()),
            Self::Full => Ok(Quota::new(total_accounts.max(1)).unwrap_or(tier.quota())),
            Self::Quota(k) => Quota::new(k).ok_or_else(|| ConfigError::InvalidValue {
                key: "quota".into(),
                message: "must be at least 1".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Adapters a monitoring run talks to.
pub struct MonitorPorts {
    pub source: Box<dyn PostSource>,
    pub summarizer: Box<dyn Summarizer>,
    pub notifier: Box<dyn Notifier>,
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("intelwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// Production adapters for `creds`.
pub fn live_ports(creds: &MonitorCredentials, settings: &Settings) -> MonitorPorts {
    let client = http_client();
    let source: Box<dyn PostSource> = match creds.platform {
        Platform::Twitter => Box::new(
            social::TwitterApiIoClient::with_client(client.clone(), creds.source_api_key.clone())
                .with_max_results(settings.max_posts),
        ),
        Platform::LinkedIn => Box::new(social::ScrapinClient::with_client(
            client.clone(),
            creds.source_api_key.clone(),
        )),
    };
    MonitorPorts {
        source,
        summarizer: Box::new(
            llm::GeminiSummarizer::with_client(client.clone(), creds.llm_api_key.clone())
                .with_model(settings.gemini_model.clone()),
        ),
        notifier: Box::new(slack::SlackWebhook::with_client(
            client,
            creds.webhook_url.clone(),
        )),
    }
}

/// Production notifier for the webhook URL.
pub fn live_notifier(webhook_url: &Secret) -> Box<dyn Notifier> {
    Box::new(slack::SlackWebhook::with_client(
        http_client(),
        webhook_url.clone(),
    ))
}

/// Production competitor news feed at `url`.
pub fn live_news_feed(url: &str) -> Box<dyn NewsFeed> {
    Box::new(social::CompetitorNewsClient::with_client(http_client(), url))
}

/// Production post source for ID lookups.
pub fn live_twitter(api_key: &Secret) -> Box<dyn PostSource> {
    Box::new(social::TwitterApiIoClient::with_client(
        http_client(),
        api_key.clone(),
    ))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// `monitor <platform>`: one rotation slice.
pub async fn monitor<W>(
    settings: &Settings,
    env: &dyn EnvSource,
    platform: Platform,
    scope: Scope,
    now: Timestamp,
    wire: W,
) -> anyhow::Result<RunReport>
where
    W: FnOnce(&MonitorCredentials) -> MonitorPorts,
{
    let creds = MonitorCredentials::from_env(env, platform)?;
    let accounts = settings.load_accounts(platform)?;
    let quota = scope.quota(settings.tier, accounts.len())?;

    let monitor_settings = settings.monitor_settings(platform, quota);

    let ports = wire(&creds);
    let store = settings.store(platform);
    info!(%platform, accounts = accounts.len(), %quota, "starting monitoring run");
    let coordinator = RotationCoordinator::new(
        ports.source.as_ref(),
        ports.summarizer.as_ref(),
        ports.notifier.as_ref(),
        monitor_settings,
        settings.tz,
    );
    coordinator
        .run(&accounts, &store, now)
        .await
        .context("monitoring run could not persist state")
}

/// `digest [--date]`: the daily summary, for yesterday unless `date` is given.
pub async fn digest<W>(
    settings: &Settings,
    env: &dyn EnvSource,
    date: Option<NaiveDate>,
    now: Timestamp,
    wire: W,
) -> anyhow::Result<DigestReport>
where
    W: FnOnce(&Secret) -> Box<dyn Notifier>,
{
    let webhook = require(env, SLACK_WEBHOOK_VAR)?;
    let day = date.unwrap_or_else(|| previous_day(now, settings.tz));
    let notifier = wire(&webhook);
    // The digest only touches the shared documents; any platform's paths do.
    let store = settings.store(Platform::Twitter);
    DailyDigest::new(notifier.as_ref(), settings.tz)
        .with_retention_days(settings.retention_days)
        .send_for(day, now, &store)
        .await
        .context("daily digest could not persist state")
}

/// `precache [--budget]`: resolve Twitter user IDs ahead of runs.
pub async fn precache<W>(
    settings: &Settings,
    env: &dyn EnvSource,
    budget: usize,
    wire: W,
) -> anyhow::Result<PrecacheReport>
where
    W: FnOnce(&Secret) -> Box<dyn PostSource>,
{
    let api_key = require(env, TWITTER_API_KEY_VAR)?;
    let accounts = settings.load_accounts(Platform::Twitter)?;
    let delay = settings.call_delay.unwrap_or_else(|| {
        MonitorSettings::for_platform(Platform::Twitter, ApiTier::Free.quota()).fetch_delay
    });
    let source = wire(&api_key);
    let store = settings.store(Platform::Twitter);
    IdPrecache::new(source.as_ref(), delay)
        .with_budget(budget)
        .run(&accounts, &store)
        .await
        .context("id pre-cache could not persist state")
}

/// `intel [platform]`: scan every account now and reply with what was found.
pub async fn intel<W>(
    settings: &Settings,
    env: &dyn EnvSource,
    platform: Platform,
    now: Timestamp,
    wire: W,
) -> anyhow::Result<ScanReport>
where
    W: FnOnce(&MonitorCredentials) -> MonitorPorts,
{
    let creds = MonitorCredentials::from_env(env, platform)?;
    let accounts = settings.load_accounts(platform)?;
    let monitor_settings = settings.monitor_settings(platform, settings.tier.quota());

    let ports = wire(&creds);
    let store = settings.store(platform);
    info!(%platform, accounts = accounts.len(), "starting on-demand scan");
    OnDemandScan::new(
        ports.source.as_ref(),
        ports.summarizer.as_ref(),
        ports.notifier.as_ref(),
        monitor_settings,
    )
    .run(&accounts, &store, now)
    .await
    .context("on-demand scan could not persist state")
}

/// `news --url`: forward the competitor news bulletin.
pub async fn news<W>(env: &dyn EnvSource, url: &str, wire: W) -> anyhow::Result<NewsReport>
where
    W: FnOnce(&str, &Secret) -> (Box<dyn NewsFeed>, Box<dyn Notifier>),
{
    let webhook = require(env, SLACK_WEBHOOK_VAR)?;
    if url.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "news-url".into(),
            message: "must not be empty".into(),
        }
        .into());
    }
    let (feed, notifier) = wire(url, &webhook);
    let report = NewsBulletin::new(feed.as_ref(), notifier.as_ref())
        .send()
        .await
        .context("competitor news could not be fetched")?;
    if report.entries > 0 && !report.sent {
        anyhow::bail!("competitor news could not be delivered");
    }
    Ok(report)
}

/// `rotation <platform>`: where the rotation stands. Makes no network calls.
pub fn rotation(
    settings: &Settings,
    platform: Platform,
    scope: Scope,
) -> anyhow::Result<RotationInfo> {
    let accounts = settings.load_accounts(platform)?;
    let quota = scope.quota(settings.tier, accounts.len())?;
    let snapshot = settings.store(platform).load()?;
    Ok(RotationInfo::new(&snapshot.rotation, accounts.len(), quota))
}
