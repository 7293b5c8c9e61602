//! Credential validation.
//!
//! Credentials come from environment variables and are checked before any
//! network client is constructed: a job with a missing credential fails with
//! [`ConfigError::MissingCredential`] and makes no calls at all.

use crate::{ConfigError, Platform};

/// Environment variable holding the twitterapi.io key.
pub const TWITTER_API_KEY_VAR: &str = "TWITTERAPI_IO_KEY";
/// Environment variable holding the ScrapIn key.
pub const LINKEDIN_API_KEY_VAR: &str = "SCRAPIN_API";
/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the Slack incoming-webhook URL.
pub const SLACK_WEBHOOK_VAR: &str = "SLACK_WEBHOOK_URL";

/// Read access to environment variables.
///
/// Abstracted so validation can be exercised without touching the process
/// environment.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// A credential value whose `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret for use in a request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Reads a required variable; empty or whitespace-only counts as missing.
pub fn require(env: &dyn EnvSource, variable: &'static str) -> Result<Secret, ConfigError> {
    env.var(variable)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(Secret)
        .ok_or(ConfigError::MissingCredential { variable })
}

/// Name of the variable holding the post-source key for `platform`.
pub fn source_key_var(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => TWITTER_API_KEY_VAR,
        Platform::LinkedIn => LINKEDIN_API_KEY_VAR,
    }
}

/// Credentials for a monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorCredentials {
    pub platform: Platform,
    pub source_api_key: Secret,
    pub llm_api_key: Secret,
    pub webhook_url: Secret,
}

impl MonitorCredentials {
    /// Validates every credential a monitoring run of `platform` needs.
    ///
    /// Variables are checked in a fixed order (source key, model key,
    /// webhook) and the first missing one is reported.
    pub fn from_env(env: &dyn EnvSource, platform: Platform) -> Result<Self, ConfigError> {
        Ok(Self {
            platform,
            source_api_key: require(env, source_key_var(platform))?,
            llm_api_key: require(env, GEMINI_API_KEY_VAR)?,
            webhook_url: require(env, SLACK_WEBHOOK_VAR)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn complete_twitter_credentials() {
        let env = env(&[
            (TWITTER_API_KEY_VAR, "tw"),
            (GEMINI_API_KEY_VAR, "gm"),
            (SLACK_WEBHOOK_VAR, "https://hooks.slack.com/services/x"),
        ]);
        let creds = MonitorCredentials::from_env(&env, Platform::Twitter).unwrap();
        assert_eq!(creds.source_api_key.expose(), "tw");
        assert_eq!(creds.llm_api_key.expose(), "gm");
    }

    #[test]
    fn linkedin_needs_scrapin_key() {
        let env = env(&[
            (TWITTER_API_KEY_VAR, "tw"),
            (GEMINI_API_KEY_VAR, "gm"),
            (SLACK_WEBHOOK_VAR, "https://hooks.slack.com/services/x"),
        ]);
        let err = MonitorCredentials::from_env(&env, Platform::LinkedIn).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingCredential {
                variable: LINKEDIN_API_KEY_VAR
            }
        );
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let env = env(&[(SLACK_WEBHOOK_VAR, "   ")]);
        assert_eq!(
            require(&env, SLACK_WEBHOOK_VAR).unwrap_err(),
            ConfigError::MissingCredential {
                variable: SLACK_WEBHOOK_VAR
            }
        );
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("super-secret");
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }
}
