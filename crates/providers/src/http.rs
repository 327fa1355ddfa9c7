//! HTTP provider: fetches a JSON-encoded [`RawSnapshot`] from the target's
//! endpoint using [`reqwest`].
//!
//! Status and error mapping:
//!
//! | Outcome                        | Reason        |
//! |--------------------------------|---------------|
//! | client timeout                 | `timeout`     |
//! | connect / transport error      | `network`     |
//! | HTTP 404                       | `not_found`   |
//! | other non-2xx status           | `network`     |
//! | body is not a valid snapshot   | `parse_error` |

use std::time::Duration;

use async_trait::async_trait;
use napwatch_core::platform::{FailureReason, FetchFailure, PlatformTarget, RawSnapshot};
use reqwest::StatusCode;

use crate::provider::PlatformProvider;

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpPlatformProvider {
    client: reqwest::Client,
}

impl HttpPlatformProvider {
    /// Build a provider whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("napwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

/// Map a transport-level reqwest error onto a failure reason.
pub fn classify_request_error(err: &reqwest::Error) -> FailureReason {
    if err.is_timeout() {
        FailureReason::Timeout
    } else if err.is_decode() {
        FailureReason::ParseError
    } else {
        FailureReason::Network
    }
}

/// Map a non-success HTTP status onto a failure reason.
pub fn classify_status(status: StatusCode) -> FailureReason {
    if status == StatusCode::NOT_FOUND {
        FailureReason::NotFound
    } else {
        FailureReason::Network
    }
}

/// Decode a response body into a snapshot.
pub fn parse_snapshot(body: &[u8]) -> Result<RawSnapshot, FetchFailure> {
    serde_json::from_slice(body)
        .map_err(|e| FetchFailure::new(FailureReason::ParseError, e.to_string()))
}

#[async_trait]
impl PlatformProvider for HttpPlatformProvider {
    async fn fetch_snapshot(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure> {
        let response = self
            .client
            .get(&target.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchFailure::new(classify_request_error(&e), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::new(
                classify_status(status),
                format!("{} returned HTTP {}", target.name, status.as_u16()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchFailure::new(classify_request_error(&e), e.to_string()))?;

        let snapshot = parse_snapshot(&body)?;
        tracing::debug!(platform = %target.name, "Fetched platform snapshot");
        Ok(snapshot)
    }
}
