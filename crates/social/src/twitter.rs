//! Twitter posts through the twitterapi.io proxy.
//!
//! Two endpoints are used:
//!
//! - `GET /twitter/user/info?userName=<handle>` resolves the numeric user ID;
//! - `GET /twitter/user/last_tweets?userId=<id>` (or `userName=`) returns the
//!   most recent tweets, newest first.
//!
//! Every response carries `"status": "success"` or an error message; the
//! payload sits under `data`. The proxy has no server-side time filter, so
//! tweets older than the requested window are dropped here.

use async_trait::async_trait;
use pipeline::config::Secret;
use pipeline::{
    FetchError, Platform, PlatformUserId, PostId, PostSource, RawPost, Timestamp, TrackedAccount,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::http::{check_status, parse_timestamp, transport_error, REQUEST_TIMEOUT};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.twitterapi.io";

/// The proxy returns at most this many tweets per page.
const PAGE_SIZE: usize = 20;

/// twitterapi.io client.
pub struct TwitterApiIoClient {
    client: reqwest::Client,
    api_key: Secret,
    base_url: String,
    max_results: usize,
}

impl TwitterApiIoClient {
    /// Creates a client against the production endpoint.
    #[must_use]
    pub fn new(api_key: Secret) -> Self {
        Self::with_client(reqwest::Client::new(), api_key)
    }

    /// Creates a client with a shared HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: Secret) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: 10,
        }
    }

    /// Overrides the endpoint (tests, self-hosted mirrors).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Caps the number of tweets returned per account.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, PAGE_SIZE);
        self
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, FetchError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("X-API-Key", self.api_key.expose())
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: Envelope<T> = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        envelope.into_data()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: String,
    #[serde(default, alias = "msg")]
    message: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, FetchError> {
        if self.status != "success" {
            return Err(FetchError::Api {
                message: self
                    .message
                    .unwrap_or_else(|| format!("status '{}'", self.status)),
            });
        }
        self.data.ok_or_else(|| FetchError::Decode {
            message: "response has no data field".into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    /// The proxy returns the ID as a string; tolerate a bare number too.
    id: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct TweetPage {
    #[serde(default)]
    tweets: Vec<ApiTweet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTweet {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    url: Option<String>,
}

fn parse_user_id(value: &serde_json::Value) -> Option<PlatformUserId> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64().map(PlatformUserId::new),
        _ => None,
    }
}

fn to_raw_post(account: &TrackedAccount, tweet: ApiTweet) -> Option<RawPost> {
    let id = PostId::new(tweet.id)?;
    let url = tweet
        .url
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("https://x.com/{}/status/{id}", account.id));
    Some(RawPost {
        posted_at: parse_timestamp(&tweet.created_at),
        id,
        account: account.id.clone(),
        text: tweet.text,
        url,
    })
}

#[async_trait]
impl PostSource for TwitterApiIoClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    #[instrument(skip_all, fields(account = %account.id))]
    async fn resolve_user_id(
        &self,
        account: &TrackedAccount,
    ) -> Result<Option<PlatformUserId>, FetchError> {
        let info: UserInfo = self
            .get(
                "/twitter/user/info",
                &[("userName", account.id.to_string())],
            )
            .await?;
        let id = parse_user_id(&info.id).ok_or_else(|| FetchError::Decode {
            message: format!("user id {} is not numeric", info.id),
        })?;
        debug!(%id, "resolved user id");
        Ok(Some(id))
    }

    #[instrument(skip_all, fields(account = %account.id))]
    async fn fetch_posts(
        &self,
        account: &TrackedAccount,
        user_id: Option<PlatformUserId>,
        since: Timestamp,
    ) -> Result<Vec<RawPost>, FetchError> {
        let mut query = vec![("count", self.max_results.to_string())];
        match user_id {
            Some(id) => query.push(("userId", id.to_string())),
            None => query.push(("userName", account.id.to_string())),
        }

        let page: TweetPage = self.get("/twitter/user/last_tweets", &query).await?;
        let received = page.tweets.len();
        let posts: Vec<RawPost> = page
            .tweets
            .into_iter()
            .filter_map(|t| to_raw_post(account, t))
            // Tweets whose time cannot be parsed are kept rather than lost.
            .filter(|p| p.posted_at.map_or(true, |at| at >= since))
            .take(self.max_results)
            .collect();

        info!(received, kept = posts.len(), "fetched tweets");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pipeline::AccountId;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn account() -> TrackedAccount {
        TrackedAccount::new(AccountId::new("DecagonAI").unwrap(), "Decagon")
    }

    fn client(server: &MockServer) -> TwitterApiIoClient {
        TwitterApiIoClient::new(Secret::new("test-key")).with_base_url(server.uri())
    }

    fn since() -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 10, 15, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn resolves_user_id_from_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/twitter/user/info"))
            .and(query_param("userName", "DecagonAI"))
            .and(header("X-API-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "id": "1587654321", "userName": "DecagonAI" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server).resolve_user_id(&account()).await.unwrap();
        assert_eq!(id, Some(PlatformUserId::new(1_587_654_321)));
    }

    #[tokio::test]
    async fn fetch_by_user_id_filters_old_tweets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/twitter/user/last_tweets"))
            .and(query_param("userId", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "tweets": [
                    { "id": "1", "text": "fresh", "createdAt": "2026-10-15T09:00:00Z",
                      "url": "https://x.com/DecagonAI/status/1" },
                    { "id": "2", "text": "stale", "createdAt": "Mon Oct 13 09:00:00 +0000 2026" },
                    { "id": "3", "text": "undated", "createdAt": "" },
                    { "id": "", "text": "no id" }
                ]}
            })))
            .mount(&server)
            .await;

        let posts = client(&server)
            .fetch_posts(&account(), Some(PlatformUserId::new(42)), since())
            .await
            .unwrap();
        let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["fresh", "undated"]);
        assert_eq!(posts[1].url, "https://x.com/DecagonAI/status/3");
        assert!(posts[1].posted_at.is_none());
    }

    #[tokio::test]
    async fn max_results_caps_request_and_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/twitter/user/last_tweets"))
            .and(query_param("count", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "tweets": [
                    { "id": "1", "text": "one", "createdAt": "2026-10-15T09:00:00Z" },
                    { "id": "2", "text": "two", "createdAt": "2026-10-15T08:00:00Z" },
                    { "id": "3", "text": "three", "createdAt": "2026-10-15T07:00:00Z" }
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let posts = client(&server)
            .with_max_results(2)
            .fetch_posts(&account(), None, since())
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);

        let clamped = client(&server).with_max_results(500);
        assert_eq!(clamped.max_results, PAGE_SIZE);
    }

    #[tokio::test]
    async fn fetch_without_id_uses_handle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/twitter/user/last_tweets"))
            .and(query_param("userName", "DecagonAI"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "tweets": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let posts = client(&server)
            .fetch_posts(&account(), None, since())
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_posts(&account(), None, since())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::RateLimited {
                retry_after: Some(std::time::Duration::from_secs(60))
            }
        );
    }

    #[tokio::test]
    async fn error_status_in_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "msg": "user not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .resolve_user_id(&account())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Api {
                message: "user not found".into()
            }
        );
    }

    #[tokio::test]
    async fn unauthorized_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_posts(&account(), None, since())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Unauthorized);
    }
}
