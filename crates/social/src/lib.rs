//! intelwatch post sources.
//!
//! Implements [`pipeline::PostSource`] for the two platforms:
//!
//! - [`TwitterApiIoClient`]: Twitter via the twitterapi.io proxy, with
//!   numeric user-ID resolution.
//! - [`ScrapinClient`]: LinkedIn company pages via the ScrapIn API.
//!
//! and [`pipeline::NewsFeed`] for the external competitor news bulletin
//! ([`CompetitorNewsClient`]).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, authentication, response decoding and
//! time-window filtering live here. Rate-limit responses surface as
//! [`pipeline::FetchError::RateLimited`]; nothing here retries.

mod http;
pub mod linkedin;
pub mod news;
pub mod twitter;

pub use linkedin::ScrapinClient;
pub use news::CompetitorNewsClient;
pub use twitter::TwitterApiIoClient;
