use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client};
use tokio::time::Instant;
use url::Url;

use crate::app::Result;
use crate::config::RetrievalConfig;
use crate::domain::{FetchOutcome, FetchStatus};
use crate::strategy::{status_from_error, status_from_response, FetchStrategy, StrategyId};

/// Pause before the single post-challenge retry; some origins pass a request
/// once the cookie jar carries their first-response cookies.
const CHALLENGE_RETRY_DELAY: Duration = Duration::from_millis(750);

/// Direct HTTP fetch dressed as a browser: full header set, cookie jar,
/// compressed transfer. Cheapest rung of the cascade.
pub struct LightClient {
    client: Client,
}

impl LightClient {
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10))
            .redirect(redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    async fn attempt(&self, url: &Url, deadline: Instant) -> FetchStatus {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return FetchStatus::Timeout;
        }

        match self.client.get(url.clone()).timeout(remaining).send().await {
            Ok(response) => status_from_response(response).await,
            Err(e) => status_from_error(&e),
        }
    }
}

#[async_trait]
impl FetchStrategy for LightClient {
    fn id(&self) -> StrategyId {
        StrategyId::LightClient
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome {
        let deadline = Instant::now() + timeout;

        let mut status = self.attempt(url, deadline).await;

        if matches!(status, FetchStatus::Blocked) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining > CHALLENGE_RETRY_DELAY * 2 {
                tracing::debug!(url = %url, "challenge detected, retrying with warmed cookie jar");
                tokio::time::sleep(CHALLENGE_RETRY_DELAY).await;
                status = self.attempt(url, deadline).await;
            }
        }

        FetchOutcome::new(StrategyId::LightClient, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_identity() {
        let client = LightClient::new(&RetrievalConfig::default()).unwrap();
        assert_eq!(client.id(), StrategyId::LightClient);
    }

    #[tokio::test]
    async fn test_exhausted_timeout_reports_timeout_without_io() {
        let client = LightClient::new(&RetrievalConfig::default()).unwrap();
        let url = Url::parse("https://example.com/article").unwrap();
        let outcome = client.fetch(&url, Duration::ZERO).await;
        assert_eq!(outcome.strategy, StrategyId::LightClient);
        assert!(matches!(outcome.status, FetchStatus::Timeout));
    }
}
