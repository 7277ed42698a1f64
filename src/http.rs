//! Shared HTTP plumbing for the feed clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::FeedError;

const USER_AGENT: &str = concat!("tavla/", env!("CARGO_PKG_VERSION"));

const TIMEOUT: Duration = Duration::from_secs(20);

pub fn client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
}

/// Send a request and fail on any non-success status.
pub async fn send_checked(
    request: RequestBuilder,
    feed: &'static str,
) -> Result<Response, FeedError> {
    let response = request
        .send()
        .await
        .map_err(|e| FeedError::http(feed, e))?;
    let status = response.status();
    tracing::debug!(feed, url = %response.url(), status = status.as_u16(), "response");

    if !status.is_success() {
        return Err(FeedError::Status {
            feed,
            status: status.as_u16(),
        });
    }
    Ok(response)
}

pub async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    feed: &'static str,
) -> Result<T, FeedError> {
    let body = send_checked(request, feed)
        .await?
        .text()
        .await
        .map_err(|e| FeedError::http(feed, e))?;
    decode_json(&body, feed)
}

pub fn decode_json<T: DeserializeOwned>(body: &str, feed: &'static str) -> Result<T, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::decode(feed, e))
}
