//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::config::Secret;
use pipeline::errors::truncate_body;
use pipeline::{Finding, RawPost, SummarizeError, Summarizer, TrackedAccount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{parse, prompt};

/// Production endpoint, API-key authentication.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini summarizer.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: Secret,
    base_url: String,
    model: String,
}

impl GeminiSummarizer {
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
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sends `prompt` and returns the concatenated text of the first candidate.
    async fn generate(&self, prompt: String) -> Result<String, SummarizeError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SummarizeError::Transport {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, 300),
            });
        }

        let body: GenerateResponse =
            response.json().await.map_err(|e| SummarizeError::Malformed {
                message: format!("unexpected response body: {e}"),
            })?;
        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SummarizeError::Malformed {
                message: "response has no candidates".into(),
            })?;
        debug!(finish_reason = ?candidate.finish_reason, "model responded");
        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    #[instrument(skip_all, fields(account = %account.id, posts = posts.len()))]
    async fn summarize(
        &self,
        account: &TrackedAccount,
        posts: &[RawPost],
    ) -> Result<Vec<Finding>, SummarizeError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let text = self.generate(prompt::build(account, posts)).await?;
        let findings = parse::findings(&text)?;
        info!(findings = findings.len(), "summarized posts");
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{AccountId, Category, PostId};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn account() -> TrackedAccount {
        TrackedAccount::new(AccountId::new("sierra").unwrap(), "Sierra")
    }

    fn posts() -> Vec<RawPost> {
        vec![RawPost {
            id: PostId::new("1").unwrap(),
            account: AccountId::new("sierra").unwrap(),
            text: "Sierra raises $175M at a $4.5B valuation".into(),
            url: "https://x.com/sierra/status/1".into(),
            posted_at: None,
        }]
    }

    fn summarizer(server: &MockServer) -> GeminiSummarizer {
        GeminiSummarizer::new(Secret::new("gm-key")).with_base_url(server.uri())
    }

    fn model_answer(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
    }

    #[tokio::test]
    async fn summarizes_into_findings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "gm-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(model_answer(
                "```json\n{\"fund_raise\": [{\"description\": \"Raised $175M\", \
                 \"url\": \"https://x.com/sierra/status/1\", \"critical\": true},]}\n```",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let findings = summarizer(&server)
            .summarize(&account(), &posts())
            .await
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::FundRaise);
        assert!(findings[0].critical);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(model_answer("{}"))
            .expect(0)
            .mount(&server)
            .await;

        let findings = summarizer(&server).summarize(&account(), &[]).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn http_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = summarizer(&server)
            .summarize(&account(), &posts())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SummarizeError::Status {
                status: 429,
                body: "quota exceeded".into()
            }
        );
    }

    #[tokio::test]
    async fn blocked_prompt_without_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = summarizer(&server)
            .summarize(&account(), &posts())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::Malformed { .. }));
    }

    #[tokio::test]
    async fn custom_model_changes_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .respond_with(model_answer("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let findings = summarizer(&server)
            .with_model("gemini-2.5-pro")
            .summarize(&account(), &posts())
            .await
            .unwrap();
        assert!(findings.is_empty());
    }
}
