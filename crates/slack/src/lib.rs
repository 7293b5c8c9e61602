//! intelwatch Slack notifier.
//!
//! Implements [`pipeline::Notifier`] over a Slack incoming webhook.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Message rendering happens in [`pipeline::render`]; this
//! crate only delivers the finished mrkdwn text.

pub mod webhook;

pub use webhook::SlackWebhook;
