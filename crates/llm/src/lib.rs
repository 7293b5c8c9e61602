//! intelwatch language-model adapter.
//!
//! Implements [`pipeline::Summarizer`] for Google's Gemini API. The model is
//! asked for a JSON object keyed by category; [`parse`] turns its answer into
//! [`pipeline::Finding`]s, tolerating the usual formatting slips.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Prompt construction, HTTP transport and response
//! parsing live here. The [`pipeline`] crate sees only
//! [`pipeline::Summarizer`].

pub mod gemini;
pub mod parse;
pub mod prompt;

pub use gemini::GeminiSummarizer;
