//! HTTP plumbing shared by the post sources: status mapping, `Retry-After`
//! parsing and provider timestamp formats.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pipeline::errors::truncate_body;
use pipeline::{FetchError, Timestamp};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};

/// Per-request timeout for provider calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Maps a `reqwest` failure onto the domain error.
pub(crate) fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_decode() {
        FetchError::Decode {
            message: err.to_string(),
        }
    } else {
        FetchError::Transport {
            message: err.without_url().to_string(),
        }
    }
}

/// Passes 2xx responses through; turns everything else into a [`FetchError`].
pub(crate) async fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(FetchError::RateLimited {
            retry_after: retry_after(response.headers()),
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY_CHARS),
            })
        }
    }
}

/// Reads a delay-seconds `Retry-After` header. HTTP-date values are ignored.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Parses a provider timestamp: RFC 3339 (`2026-10-15T08:00:00Z`) or the
/// classic Twitter format (`Tue Dec 10 07:00:30 +0000 2024`).
pub(crate) fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y"))
        .ok()
        .map(|dt| Timestamp::from_utc(dt.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::header::HeaderValue;

    #[test]
    fn parses_rfc3339_and_twitter_formats() {
        let expected = Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 12, 10, 7, 0, 30).unwrap());
        assert_eq!(parse_timestamp("2024-12-10T07:00:30Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-12-10T12:30:30+05:30"), Some(expected));
        assert_eq!(parse_timestamp("Tue Dec 10 07:00:30 +0000 2024"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn retry_after_seconds_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("45"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(45)));
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }
}
