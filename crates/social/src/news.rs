//! Competitor news from an external bulletin endpoint.
//!
//! `GET <url>` answers with a JSON object of sections, each mapping a company
//! to one line of news that ends with its source link in parentheses:
//!
//! ```text
//! { "Fund Raise": { "Sierra": "Raised $175M Series C (https://…)" }, "Hiring": {} }
//! ```
//!
//! The body is sometimes wrapped in a markdown code fence.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use pipeline::{CompetitorNews, FetchError, NewsEntry, NewsFeed, NewsSection};
use regex::Regex;
use tracing::{info, instrument};

use crate::http::{check_status, transport_error, REQUEST_TIMEOUT};

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```[A-Za-z]*\s*").unwrap());
static FENCE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)\s*```$").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\((https?://[^)]+)\)").unwrap());

/// Client for the competitor news endpoint.
pub struct CompetitorNewsClient {
    client: reqwest::Client,
    url: String,
}

impl CompetitorNewsClient {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

type Sections = BTreeMap<String, Option<BTreeMap<String, String>>>;

/// Decodes a bulletin body.
pub fn parse_bulletin(raw: &str) -> Result<CompetitorNews, FetchError> {
    let body = FENCE_OPEN.replace_all(raw, "");
    let body = FENCE_CLOSE.replace_all(&body, "");
    let sections: Sections = serde_json::from_str(body.trim()).map_err(|e| FetchError::Decode {
        message: e.to_string(),
    })?;

    let sections = sections
        .into_iter()
        .map(|(name, companies)| NewsSection {
            name,
            entries: companies
                .unwrap_or_default()
                .into_iter()
                .map(|(company, line)| entry(company, &line))
                .collect(),
        })
        .collect();
    Ok(CompetitorNews::new(sections))
}

fn entry(company: String, line: &str) -> NewsEntry {
    let url = LINK.captures(line).map(|c| c[1].to_string());
    let text = LINK.replace_all(line, "").trim().to_string();
    NewsEntry { company, text, url }
}

#[async_trait]
impl NewsFeed for CompetitorNewsClient {
    #[instrument(skip_all)]
    async fn latest(&self) -> Result<CompetitorNews, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(transport_error)?;
        let news = parse_bulletin(&body)?;
        info!(
            sections = news.sections().len(),
            entries = news.entry_count(),
            "fetched competitor news"
        );
        Ok(news)
    }
}
