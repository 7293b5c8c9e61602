//! Error types for the monitoring domain.
//!
//! Each error type maps to one row of the failure taxonomy and is handled at
//! a different level:
//!
//! | Type | Raised by | Handling |
//! |------|-----------|----------|
//! | [`ConfigError`] | credential and option validation | fatal before any network call |
//! | [`FetchError`] | post sources | skip the account for this run |
//! | [`SummarizeError`] | summarizer | treat the batch as "nothing notable" |
//! | [`NotifyError`] | notifier | log; persistence still happens |
//! | [`StoreError`] | state repository | fatal |
//!
//! Infrastructure crates translate their transport errors (e.g. `reqwest`)
//! into these types; this crate never depends on a transport.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A configuration problem that prevents a job from starting.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A required credential environment variable is unset or empty.
    #[error("missing required environment variable {variable}")]
    MissingCredential {
        /// Name of the environment variable.
        variable: &'static str,
    },

    /// An option was supplied but could not be interpreted.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Option or variable name.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// The tracked-account list could not be read.
    #[error("cannot read account list {path}: {message}")]
    AccountList {
        /// Path of the account list file.
        path: PathBuf,
        /// Underlying I/O error description.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// A per-account failure to resolve or fetch posts.
///
/// Every variant is recovered the same way (the account is skipped for this
/// run); the variants exist so logs say *why*.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// The provider answered with a rate-limit response.
    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited {
        /// Delay requested by the provider (`Retry-After`), when present.
        retry_after: Option<Duration>,
    },

    /// The provider rejected the API key.
    #[error("authentication rejected by provider")]
    Unauthorized,

    /// The provider answered with an unexpected HTTP status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The provider answered 2xx but reported failure in the body.
    #[error("provider reported an error: {message}")]
    Api {
        /// Provider-supplied message.
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("could not decode response: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

fn retry_hint(after: &Option<Duration>) -> String {
    match after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}

impl FetchError {
    /// Returns `true` for [`FetchError::RateLimited`].
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

// ---------------------------------------------------------------------------
// Summarize
// ---------------------------------------------------------------------------

/// A failure to obtain structured findings from the language model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SummarizeError {
    /// The request never produced a response.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The model endpoint answered with a non-success status.
    #[error("model endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The model answered, but not with parseable findings.
    #[error("malformed model output: {message}")]
    Malformed {
        /// Description of what could not be parsed.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Notify
// ---------------------------------------------------------------------------

/// A failure to deliver a notification.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifyError {
    /// The webhook could not be reached.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The webhook answered with a non-success status.
    #[error("webhook rejected message with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A failure to read or write a persisted state document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the document failed.
    #[error("state file {path}: {source}")]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document exists but is not valid JSON of the expected shape.
    ///
    /// Never silently replaced with a default; doing so would overwrite
    /// accumulated history on the next save.
    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the document.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Truncates an HTTP response body for inclusion in an error message.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_message_includes_retry_hint() {
        let err = FetchError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.to_string(), "rate limited (retry after 30s)");
        assert!(err.is_rate_limited());

        let bare = FetchError::RateLimited { retry_after: None };
        assert_eq!(bare.to_string(), "rate limited");
    }

    #[test]
    fn missing_credential_names_variable() {
        let err = ConfigError::MissingCredential {
            variable: "GEMINI_API_KEY",
        };
        assert_eq!(
            err.to_string(),
            "missing required environment variable GEMINI_API_KEY"
        );
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        assert_eq!(truncate_body("héllo wörld", 5), "héllo…");
        assert_eq!(truncate_body("short", 10), "short");
    }
}
