//! intelwatch job orchestration.
//!
//! Each scheduled job is one type here:
//!
//! - [`RotationCoordinator`] polls a slice of one platform's accounts,
//!   summarizes new posts, notifies and advances the rotation cursor;
//! - [`DailyDigest`] sends the previous day's accumulated items as one
//!   message and clears them;
//! - [`IdPrecache`] resolves platform user IDs ahead of time;
//! - [`OnDemandScan`] scans every account at once and replies with the
//!   latest intelligence, outside the rotation;
//! - [`NewsBulletin`] forwards the external competitor news feed.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Jobs sequence calls between the rules in the
//! [`pipeline`] crate and the infrastructure ports (`PostSource`,
//! `Summarizer`, `NewsFeed`, `Notifier`, `StateRepository`). They contain no
//! domain rules of their own and never talk to the network or filesystem
//! directly.

pub mod coordinator;
pub mod digest;
mod gather;
pub mod news;
pub mod pacing;
pub mod precache;
pub mod scan;

#[cfg(test)]
mod testutil;

pub use coordinator::{MonitorSettings, RotationCoordinator, RunReport};
pub use digest::{previous_day, DailyDigest, DigestReport, DEFAULT_RETENTION_DAYS};
pub use news::{NewsBulletin, NewsReport};
pub use pacing::Pacer;
pub use precache::{IdPrecache, PrecacheReport, DEFAULT_LOOKUP_BUDGET};
pub use scan::{OnDemandScan, ScanReport};
