//! intelwatch CLI entry point.
//!
//! This binary is the composition root for the whole system. Responsibilities:
//!
//! 1. **Parse configuration**: options come from flags with environment
//!    fallbacks and defaults, so a scheduled invocation needs no flags.
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON layer
//!    on stderr and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter. Every span and event emitted by the
//!    workspace flows through it.
//! 3. **Validate credentials**: before any adapter exists.
//! 4. **Construct infrastructure**: `TwitterApiIoClient` / `ScrapinClient`,
//!    `CompetitorNewsClient`, `GeminiSummarizer`, `SlackWebhook`,
//!    `JsonFileStore`, and run one job.
//!
//! Exit status is non-zero for configuration errors and unreadable or
//! unwritable state; per-account network failures are absorbed by the job.

mod app;
mod observability;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use pipeline::config::ProcessEnv;
use pipeline::{Platform, Timestamp};
use tracing::error;

use crate::app::{Scope, Settings};
use crate::observability::LogFormat;

#[derive(Parser)]
#[command(
    name = "intelwatch",
    about = "Competitor social-media monitoring: rotate through accounts, summarize, notify",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding the JSON state documents
    #[arg(long, global = true, env = "INTELWATCH_STATE_DIR", default_value = "state")]
    state_dir: PathBuf,

    /// Twitter account list (`handle:Display Name` per line)
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_TWITTER_ACCOUNTS",
        default_value = "accounts.txt"
    )]
    twitter_accounts: PathBuf,

    /// LinkedIn account list (one company URL per line)
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_LINKEDIN_ACCOUNTS",
        default_value = "linkedin_accounts.txt"
    )]
    linkedin_accounts: PathBuf,

    /// API tier; sets accounts per run (free = 1, basic = 5, pro = 25)
    #[arg(long, global = true, env = "INTELWATCH_API_TIER", default_value = "free")]
    tier: String,

    /// Seconds between post-source calls (default: 6 for Twitter, 2 for LinkedIn)
    #[arg(long, global = true, env = "INTELWATCH_CALL_DELAY")]
    call_delay: Option<u64>,

    /// Only posts newer than this many hours are considered (at most a year)
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_LOOKBACK_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(u32).range(1..=8760)
    )]
    lookback_hours: u32,

    /// Tweets kept per account per fetch (1-20)
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_MAX_POSTS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..=20)
    )]
    max_posts: u16,

    /// IANA timezone used for calendar days
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_TIMEZONE",
        default_value = "Asia/Kolkata"
    )]
    timezone: String,

    /// Days of accumulated items kept behind the digested day
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_RETENTION_DAYS",
        default_value_t = nodes::DEFAULT_RETENTION_DAYS
    )]
    retention_days: u32,

    /// Gemini model name
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_GEMINI_MODEL",
        default_value = llm::gemini::DEFAULT_MODEL
    )]
    gemini_model: String,

    /// Log line format on stderr
    #[arg(
        long,
        global = true,
        env = "INTELWATCH_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the next slice of accounts, summarize and notify
    Monitor {
        platform: PlatformArg,

        /// Poll every account in one run (daily complete scan)
        #[arg(long, conflicts_with = "quota")]
        full: bool,

        /// Accounts per run, overriding the tier
        #[arg(long, env = "INTELWATCH_QUOTA")]
        quota: Option<usize>,
    },

    /// Send the daily summary of accumulated intelligence
    Digest {
        /// Day to summarize, YYYY-MM-DD (default: yesterday)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Resolve Twitter user IDs ahead of monitoring runs
    Precache {
        /// Maximum lookups this invocation
        #[arg(
            long,
            env = "INTELWATCH_PRECACHE_BUDGET",
            default_value_t = nodes::DEFAULT_LOOKUP_BUDGET
        )]
        budget: usize,
    },

    /// Scan every account now and reply with the latest intelligence
    Intel {
        #[arg(default_value = "twitter")]
        platform: PlatformArg,
    },

    /// Forward the competitor news bulletin
    News {
        /// Bulletin endpoint
        #[arg(long, env = "INTELWATCH_NEWS_URL")]
        url: String,
    },

    /// Show the rotation position for a platform
    Rotation {
        platform: PlatformArg,

        /// Accounts per run, overriding the tier
        #[arg(long)]
        quota: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Twitter,
    Linkedin,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Twitter => Platform::Twitter,
            PlatformArg::Linkedin => Platform::LinkedIn,
        }
    }
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings {
            state_dir: self.state_dir.clone(),
            twitter_accounts: self.twitter_accounts.clone(),
            linkedin_accounts: self.linkedin_accounts.clone(),
            tier: app::parse_tier(&self.tier)?,
            call_delay: self.call_delay.map(Duration::from_secs),
            lookback_hours: self.lookback_hours,
            max_posts: usize::from(self.max_posts),
            tz: app::parse_timezone(&self.timezone)?,
            retention_days: self.retention_days,
            gemini_model: self.gemini_model.clone(),
        })
    }
}

fn scope(full: bool, quota: Option<usize>) -> Scope {
    match (full, quota) {
        (true, _) => Scope::Full,
        (false, Some(k)) => Scope::Quota(k),
        (false, None) => Scope::Tier,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    let env = ProcessEnv;
    let now = Timestamp::now();

    match cli.command {
        Command::Monitor {
            platform,
            full,
            quota,
        } => {
            let report = app::monitor(
                &settings,
                &env,
                platform.into(),
                scope(full, quota),
                now,
                |creds| app::live_ports(creds, &settings),
            )
            .await?;
            println!(
                "{} run {}: {}/{} accounts fetched, {} items, notified: {}",
                report.platform,
                report.run_id,
                report.succeeded,
                report.selected,
                report.items,
                report.notified
            );
        }
        Command::Digest { date } => {
            let report = app::digest(&settings, &env, date, now, app::live_notifier).await?;
            println!(
                "digest for {}: {} items, sent: {}, pruned {}",
                report.day, report.items, report.sent, report.pruned
            );
        }
        Command::Precache { budget } => {
            let report = app::precache(&settings, &env, budget, app::live_twitter).await?;
            println!(
                "resolved {} of {} uncached ids ({} failed, {} remaining)",
                report.resolved, report.missing, report.failed, report.remaining
            );
        }
        Command::Intel { platform } => {
            let report = app::intel(&settings, &env, platform.into(), now, |creds| {
                app::live_ports(creds, &settings)
            })
            .await?;
            println!(
                "{} scan: {}/{} accounts fetched, {} items, sent: {}",
                report.platform, report.succeeded, report.accounts, report.items, report.sent
            );
        }
        Command::News { url } => {
            let report = app::news(&env, &url, |url, webhook| {
                (app::live_news_feed(url), app::live_notifier(webhook))
            })
            .await?;
            println!(
                "competitor news: {} entries in {} sections, sent: {}",
                report.entries, report.sections, report.sent
            );
        }
        Command::Rotation { platform, quota } => {
            let info = app::rotation(&settings, platform.into(), scope(false, quota))?;
            println!("{info}");
            if !info.last_selection.is_empty() {
                let last: Vec<&str> = info.last_selection.iter().map(|a| a.as_str()).collect();
                println!("Last run polled: {}", last.join(", "));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli).await;
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "job failed");
    }
    telemetry.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_hours_is_bounded() {
        let cli = Cli::try_parse_from(["intelwatch", "--lookback-hours", "48", "digest"]).unwrap();
        assert_eq!(cli.lookback_hours, 48);

        for bad in ["0", "8761", "4294967295"] {
            assert!(
                Cli::try_parse_from(["intelwatch", "--lookback-hours", bad, "digest"]).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn intel_defaults_to_twitter() {
        let cli = Cli::try_parse_from(["intelwatch", "intel"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Intel {
                platform: PlatformArg::Twitter
            }
        ));
    }

    #[test]
    fn full_conflicts_with_quota() {
        assert!(
            Cli::try_parse_from(["intelwatch", "monitor", "twitter", "--full", "--quota", "3"])
                .is_err()
        );
    }
}
