//! Monitoring domain for intelwatch.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type and error type used by the scheduled jobs. Infrastructure crates
//! implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`AccountId`, `PlatformUserId`, `RunId`) |
//! | [`types`] | Value types (`TrackedAccount`, `IntelligenceItem`, `Quota`, `Timestamp`, …) |
//! | [`errors`] | One error type per failure class |
//! | [`rotation`] | The account-rotation rule and `RotationState` |
//! | [`state`] | `Snapshot`, `IdCache`, `IntelligenceLog` and the `StateRepository` port |
//! | [`ports`] | `PostSource`, `Summarizer`, `NewsFeed`, `Notifier` |
//! | [`news`] | Competitor news bulletins |
//! | [`accounts`] | Account list parsing |
//! | [`config`] | Credential validation |
//! | [`render`] | Slack mrkdwn rendering |

pub mod accounts;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod news;
pub mod ports;
pub mod render;
pub mod rotation;
pub mod state;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ConfigError, FetchError, NotifyError, StoreError, SummarizeError};
pub use identifiers::{AccountId, PlatformUserId, PostId, RunId};
pub use news::{CompetitorNews, NewsEntry, NewsSection};
pub use ports::{NewsFeed, Notifier, PostSource, Summarizer};
pub use rotation::{RotationInfo, RotationState, Selection};
pub use state::{IdCache, IntelligenceLog, Snapshot, StateRepository};
pub use types::{
    ApiTier, Category, Finding, IntelligenceItem, Platform, Quota, RawPost, Timestamp,
    TrackedAccount,
};
