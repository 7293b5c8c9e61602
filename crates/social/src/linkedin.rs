//! LinkedIn company posts through the ScrapIn enrichment API.
//!
//! `GET /v1/enrichment/companies/activities/posts?apikey=…&linkedInUrl=…`
//! returns `{"success": true, "posts": [...]}`. Each post carries `text`,
//! `activityUrl` and `activityDate`. Companies are addressed by URL, so no ID
//! resolution is needed and the default [`PostSource::resolve_user_id`] applies.

use async_trait::async_trait;
use pipeline::config::Secret;
use pipeline::{
    FetchError, Platform, PlatformUserId, PostId, PostSource, RawPost, Timestamp, TrackedAccount,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::http::{check_status, parse_timestamp, transport_error, REQUEST_TIMEOUT};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.scrapin.io";

const POSTS_PATH: &str = "/v1/enrichment/companies/activities/posts";

/// ScrapIn client.
pub struct ScrapinClient {
    client: reqwest::Client,
    api_key: Secret,
    base_url: String,
}

impl ScrapinClient {
    #[must_use]
    pub fn new(api_key: Secret) -> Self {
        Self::with_client(reqwest::Client::new(), api_key)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: Secret) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    posts: Vec<ApiPost>,
    #[serde(default, alias = "title")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPost {
    text: Option<String>,
    activity_url: Option<String>,
    activity_date: Option<String>,
}

#[async_trait]
impl PostSource for ScrapinClient {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    #[instrument(skip_all, fields(account = %account.id))]
    async fn fetch_posts(
        &self,
        account: &TrackedAccount,
        _user_id: Option<PlatformUserId>,
        since: Timestamp,
    ) -> Result<Vec<RawPost>, FetchError> {
        let response = self
            .client
            .get(format!("{}{POSTS_PATH}", self.base_url))
            .query(&[
                ("apikey", self.api_key.expose()),
                ("linkedInUrl", account.id.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let body: PostsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        if !body.success {
            return Err(FetchError::Api {
                message: body
                    .message
                    .unwrap_or_else(|| "request was not successful".into()),
            });
        }

        let received = body.posts.len();
        let mut posts = Vec::new();
        for post in body.posts {
            let (Some(text), Some(url), Some(date)) =
                (post.text, post.activity_url, post.activity_date)
            else {
                warn!("skipping post with missing fields");
                continue;
            };
            let Some(posted_at) = parse_timestamp(&date) else {
                warn!(date = %date, "skipping post with unparseable date");
                continue;
            };
            if posted_at < since {
                continue;
            }
            let Some(id) = PostId::new(url.clone()) else {
                continue;
            };
            posts.push(RawPost {
                id,
                account: account.id.clone(),
                text,
                url,
                posted_at: Some(posted_at),
            });
        }

        info!(received, kept = posts.len(), "fetched linkedin posts");
        Ok(posts)
    }
}
