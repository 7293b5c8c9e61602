//! Shared value types for the monitoring domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (a quota is never zero, a category is one of a fixed
//! set) and participate in domain computations.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{AccountId, PostId};

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

/// The social platform an account list and a post source belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Twitter / X, reached through the twitterapi.io proxy.
    Twitter,
    /// LinkedIn company pages, reached through the ScrapIn API.
    #[serde(rename = "linkedin")]
    LinkedIn,
}

impl Platform {
    /// Short lowercase key used for state directory names and log fields.
    pub fn key(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Human-readable platform name used in notification headers.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// One account from the tracked-account list.
///
/// Loaded once per run and never mutated. Identity is [`TrackedAccount::id`];
/// two entries with the same identifier are the same account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAccount {
    /// Handle (Twitter) or company URL (LinkedIn).
    pub id: AccountId,
    /// Name shown in notifications.
    pub display_name: String,
}

impl TrackedAccount {
    /// Creates a tracked account.
    pub fn new(id: AccountId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Public profile URL, used as the link target when a finding has no URL.
    pub fn profile_url(&self, platform: Platform) -> String {
        match platform {
            Platform::Twitter => format!("https://x.com/{}", self.id),
            Platform::LinkedIn => self.id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

/// Maximum number of accounts processed in one scheduled run.
///
/// Always at least one; a zero quota would stall the rotation forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quota(usize);

impl Quota {
    /// Creates a [`Quota`], returning `None` for zero.
    #[must_use]
    pub fn new(per_run: usize) -> Option<Self> {
        if per_run == 0 {
            None
        } else {
            Some(Self(per_run))
        }
    }

    /// Returns the per-run account limit.
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider subscription tier, which determines the default [`Quota`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiTier {
    /// One post fetch per scheduling window.
    Free,
    /// Ten requests per window; five accounts leaves room for ID lookups.
    Basic,
    /// Effectively unconstrained for this workload.
    Pro,
}

impl ApiTier {
    /// Default per-run quota for this tier.
    pub fn quota(self) -> Quota {
        match self {
            Self::Free => Quota(1),
            Self::Basic => Quota(5),
            Self::Pro => Quota(25),
        }
    }
}

impl std::str::FromStr for ApiTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            other => Err(format!(
                "unknown API tier '{other}' (expected free, basic or pro)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Business-intelligence category assigned to a finding by the summarizer.
///
/// Variant order is the order categories appear in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FundRaise,
    Hiring,
    CustomerSuccess,
    Product,
    Partnerships,
    GoToMarket,
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 7] = [
        Self::FundRaise,
        Self::Hiring,
        Self::CustomerSuccess,
        Self::Product,
        Self::Partnerships,
        Self::GoToMarket,
        Self::Other,
    ];

    /// Maps a free-form category label to a [`Category`].
    ///
    /// Accepts snake_case keys and the display names the model sometimes
    /// echoes back ("Fund Raise", "GTM"). Anything unrecognised is `Other`.
    pub fn from_label(label: &str) -> Self {
        Self::parse_label(label).unwrap_or(Self::Other)
    }

    /// Like [`Category::from_label`], but `None` for unrecognised labels.
    pub fn parse_label(label: &str) -> Option<Self> {
        let normalised: String = label
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let category = match normalised.as_str() {
            "fundraise" | "funding" | "fundraising" => Self::FundRaise,
            "hiring" | "hires" | "team" => Self::Hiring,
            "customersuccess" | "customers" => Self::CustomerSuccess,
            "product" | "products" | "productlaunch" => Self::Product,
            "partnerships" | "partnership" | "partners" => Self::Partnerships,
            "gotomarket" | "gtm" => Self::GoToMarket,
            "other" | "others" => Self::Other,
            _ => return None,
        };
        Some(category)
    }

    /// The snake_case key used in serialized state and model output.
    pub fn key(self) -> &'static str {
        match self {
            Self::FundRaise => "fund_raise",
            Self::Hiring => "hiring",
            Self::CustomerSuccess => "customer_success",
            Self::Product => "product",
            Self::Partnerships => "partnerships",
            Self::GoToMarket => "go_to_market",
            Self::Other => "other",
        }
    }

    /// Header text shown above the category's items.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::FundRaise => "Fund Raise",
            Self::Hiring => "Hiring",
            Self::CustomerSuccess => "Customer Success",
            Self::Product => "Product",
            Self::Partnerships => "Partnerships",
            Self::GoToMarket => "Go-to-Market",
            Self::Other => "Other",
        }
    }

    /// Emoji prefixed to the category header.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::FundRaise => "💰",
            Self::Hiring => "👥",
            Self::CustomerSuccess => "🎯",
            Self::Product => "🚀",
            Self::Partnerships => "🤝",
            Self::GoToMarket => "📈",
            Self::Other => "📰",
        }
    }
}

// ---------------------------------------------------------------------------
// Posts and findings
// ---------------------------------------------------------------------------

/// A post as returned by a fetch client, before summarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: PostId,
    pub account: AccountId,
    pub text: String,
    pub url: String,
    /// `None` when the platform returned a timestamp that could not be parsed.
    pub posted_at: Option<Timestamp>,
}

/// One notable event extracted by the summarizer from a batch of posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub headline: String,
    pub url: Option<String>,
    /// Funding, acquisition, revenue milestone or exit.
    pub critical: bool,
}

/// A categorized, summarized notable event, accumulated across runs until the
/// daily summary consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceItem {
    pub account: AccountId,
    #[serde(default)]
    pub display_name: String,
    pub platform: Platform,
    pub category: Category,
    pub headline: String,
    pub url: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub critical: bool,
}

impl IntelligenceItem {
    /// Binds a [`Finding`] to the account it came from and the run time.
    pub fn from_finding(
        finding: Finding,
        account: &TrackedAccount,
        platform: Platform,
        timestamp: Timestamp,
    ) -> Self {
        let url = finding
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| account.profile_url(platform));
        Self {
            account: account.id.clone(),
            display_name: account.display_name.clone(),
            platform,
            category: finding.category,
            headline: finding.headline.trim().to_string(),
            url,
            timestamp,
            critical: finding.critical,
        }
    }

    /// Name used when rendering the item, falling back to the identifier.
    pub fn entity_name(&self) -> &str {
        if self.display_name.is_empty() {
            self.account.as_str()
        } else {
            &self.display_name
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the timestamp `hours` hours earlier, clamped to the earliest
    /// representable instant.
    pub fn hours_before(self, hours: u32) -> Self {
        Self(
            self.0
                .checked_sub_signed(TimeDelta::hours(i64::from(hours)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    /// Calendar date of this instant in `tz`.
    pub fn local_date(self, tz: Tz) -> NaiveDate {
        self.0.with_timezone(&tz).date_naive()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
