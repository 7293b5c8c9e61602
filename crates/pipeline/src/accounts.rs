//! Parsing of the tracked-account list.
//!
//! One entry per line. Twitter lines are `handle:Display Name` or a bare
//! handle; LinkedIn lines are bare company URLs (which contain `:` themselves,
//! so they are never split). Blank lines and `#` comments are skipped. Line
//! order is rotation order.

use std::collections::HashSet;

use tracing::warn;

use crate::{AccountId, Platform, TrackedAccount};

/// Parses the contents of an account list file for `platform`.
///
/// Duplicate identifiers are dropped after the first occurrence so that the
/// rotation never polls the same account twice in one cycle.
pub fn parse_account_list(text: &str, platform: Platform) -> Vec<TrackedAccount> {
    let mut seen = HashSet::new();
    let mut accounts = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = match platform {
            Platform::Twitter => parse_twitter_line(line),
            Platform::LinkedIn => parse_linkedin_line(line),
        };
        let Some(account) = parsed else {
            warn!(line, "skipping unusable account list entry");
            continue;
        };

        if seen.insert(account.id.clone()) {
            accounts.push(account);
        } else {
            warn!(account = %account.id, "duplicate account in list, ignoring");
        }
    }

    accounts
}

fn parse_twitter_line(line: &str) -> Option<TrackedAccount> {
    let (handle, name) = match line.split_once(':') {
        Some((handle, name)) => (handle.trim(), name.trim()),
        None => (line, line),
    };
    let id = AccountId::new(handle.trim_start_matches('@'))?;
    let display_name = if name.is_empty() || name == handle {
        id.to_string()
    } else {
        name.to_string()
    };
    Some(TrackedAccount::new(id, display_name))
}

fn parse_linkedin_line(line: &str) -> Option<TrackedAccount> {
    let id = AccountId::new(line)?;
    let name = company_name_from_url(line);
    Some(TrackedAccount::new(id, name))
}

/// Derives a display name from a LinkedIn company URL.
///
/// `https://www.linkedin.com/company/sierra-ai/` becomes `"Sierra Ai"`.
pub fn company_name_from_url(url: &str) -> String {
    let mut parts = url.trim_matches('/').split('/');
    let slug = parts
        .by_ref()
        .find(|p| *p == "company")
        .and_then(|_| parts.next())
        .filter(|s| !s.is_empty());

    match slug {
        Some(slug) => slug
            .split(['-', '_'])
            .filter(|w| !w.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" "),
        None => "Unknown Company".to_string(),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
