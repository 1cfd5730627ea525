use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use url::Url;

use crate::app::Result;
use crate::domain::{FetchOutcome, FetchStatus};
use crate::strategy::{status_from_error, status_from_response, FetchStrategy, StrategyId};

/// Plain HTTP GET with no evasion at all.
///
/// Identifies itself honestly and carries no cookies, which some origins
/// treat better than a half-convincing browser imitation.
pub struct DirectFetch {
    client: Client,
}

impl DirectFetch {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("longform/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchStrategy for DirectFetch {
    fn id(&self) -> StrategyId {
        StrategyId::DirectFetch
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome {
        let deadline = Instant::now() + timeout;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return FetchOutcome::new(StrategyId::DirectFetch, FetchStatus::Timeout);
        }

        let status = match self.client.get(url.clone()).timeout(remaining).send().await {
            Ok(response) => status_from_response(response).await,
            Err(e) => status_from_error(&e),
        };

        FetchOutcome::new(StrategyId::DirectFetch, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_identity() {
        let fetcher = DirectFetch::new().unwrap();
        assert_eq!(fetcher.id(), StrategyId::DirectFetch);
    }

    #[tokio::test]
    async fn test_exhausted_timeout_reports_timeout_without_io() {
        let fetcher = DirectFetch::new().unwrap();
        let url = Url::parse("https://example.com/article").unwrap();
        let outcome = fetcher.fetch(&url, Duration::ZERO).await;
        assert!(matches!(outcome.status, FetchStatus::Timeout));
    }
}
