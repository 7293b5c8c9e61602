//! Slack mrkdwn rendering of intelligence items.
//!
//! Items are grouped by [`Category`] in its display order; each line links the
//! entity name to the source post: `• 🚨 <url|Name>: headline`.

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::{Days, NaiveDate};

use crate::{Category, CompetitorNews, IntelligenceItem, Platform};

/// Escapes the three characters Slack treats as control characters.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Makes `url` safe inside `<url|label>`: percent-encodes the characters that
/// would end the link early. `None` for a blank URL.
pub fn link_target(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '|' => out.push_str("%7C"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            c if c.is_whitespace() => out.push_str("%20"),
            c => out.push(c),
        }
    }
    Some(out)
}

/// Renders the message sent after a monitoring run, e.g.
///
/// ```text
/// *LinkedIn Update: 16 Oct*
///
/// *💰 Fund Raise:*
/// • 🚨 <https://…|Sierra>: Raises $175M Series C
/// ```
pub fn run_update(platform: Platform, date: NaiveDate, items: &[IntelligenceItem]) -> String {
    let mut out = format!(
        "*{} Update: {}*\n",
        platform.display_name(),
        date.format("%-d %b")
    );
    let refs: Vec<&IntelligenceItem> = items.iter().collect();
    if refs.is_empty() {
        out.push_str("\nNo significant updates today.");
        return out;
    }
    write_sections(&mut out, &refs);
    out
}

/// Renders the once-a-day digest for `date`, as seen on `today`.
///
/// Items are deduplicated by headline (case-insensitive, first occurrence
/// wins). An empty day still produces a message so the channel shows the
/// job is alive. The header says "Yesterday's" only when `date` is the day
/// before `today`.
pub fn daily_digest(date: NaiveDate, today: NaiveDate, items: &[&IntelligenceItem]) -> String {
    let unique = dedupe_by_headline(items);
    if unique.is_empty() {
        return format!(
            "📭 No significant competitive intelligence detected on {date}.\n\n\
             _Daily monitoring system is active and running._"
        );
    }

    let mut out = if date.checked_add_days(Days::new(1)) == Some(today) {
        format!("*Yesterday's Competitive Intelligence Summary ({date})*\n")
    } else {
        format!("*Competitive Intelligence Summary ({date})*\n")
    };
    write_sections(&mut out, &unique);
    let _ = write!(
        out,
        "\n_Monitoring system processed {} intelligence items._",
        unique.len()
    );
    out
}

/// Renders the reply to an on-demand scan over the last `lookback_hours`.
pub fn latest_intelligence(items: &[IntelligenceItem], lookback_hours: u32) -> String {
    let mut out = String::from("📊 *Latest Competitive Intelligence*\n");
    if items.is_empty() {
        let _ = write!(
            out,
            "\nNo significant developments detected in the last {lookback_hours} hours \
             from monitored accounts."
        );
        return out;
    }
    let refs: Vec<&IntelligenceItem> = items.iter().collect();
    write_sections(&mut out, &refs);
    out
}

/// Sent instead of a scan result when no account could be fetched.
pub fn service_issue() -> String {
    "⚠️ *Service Issue*\n\nThere was a temporary issue accessing the monitoring services. \
     Please try again in a few minutes."
        .to_string()
}

/// Renders a competitor news bulletin.
///
/// ```text
/// *📊 Today's Competitor Intelligence*
///
/// *💰 Fund Raise*
/// • *Sierra*: Raised $175M Series C <https://…|🔗>
/// ```
pub fn competitor_news(news: &CompetitorNews) -> String {
    let mut out = String::from("*📊 Today's Competitor Intelligence*\n");
    for section in news.sections() {
        let header = match section.category() {
            Some(category) => format!("{} {}", category.emoji(), category.display_name()),
            None => format!("📋 {}", escape(&section.name)),
        };
        let _ = writeln!(out, "\n*{header}*");
        for entry in &section.entries {
            let company = escape(&entry.company);
            let text = escape(&entry.text);
            match entry.url.as_deref().and_then(link_target) {
                Some(url) => {
                    let _ = writeln!(out, "• *{company}*: {text} <{url}|🔗>");
                }
                None => {
                    let _ = writeln!(out, "• *{company}*: {text}");
                }
            }
        }
    }
    out
}

/// Drops items whose normalised headline was already seen.
pub fn dedupe_by_headline<'a>(items: &[&'a IntelligenceItem]) -> Vec<&'a IntelligenceItem> {
    let mut seen = HashSet::new();
    items
        .iter()
        .copied()
        .filter(|item| {
            let key = item.headline.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

fn write_sections(out: &mut String, items: &[&IntelligenceItem]) {
    for category in Category::ALL {
        let mut in_category = items.iter().filter(|i| i.category == category).peekable();
        if in_category.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "\n*{} {}:*", category.emoji(), category.display_name());
        for item in in_category {
            let prefix = if item.critical { "🚨 " } else { "" };
            let name = escape(item.entity_name());
            let headline = escape(&item.headline);
            match link_target(&item.url) {
                Some(url) => {
                    let _ = writeln!(out, "• {prefix}<{url}|{name}>: {headline}");
                }
                None => {
                    let _ = writeln!(out, "• {prefix}{name}: {headline}");
                }
            }
        }
    }
}
