//! intelwatch state persistence.
//!
//! Implements [`pipeline::StateRepository`] over three JSON documents (rotation
//! cursor, intelligence accumulator, ID cache) and loads the tracked-account
//! list file.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File layout, serialisation and atomic replacement live
//! here. The [`pipeline`] crate sees only [`pipeline::StateRepository`].

pub mod accounts;
pub mod io;
pub mod json;

pub use accounts::load_account_list;
pub use json::{JsonFileStore, StatePaths};
