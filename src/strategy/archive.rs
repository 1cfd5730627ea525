use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use url::Url;

use crate::app::Result;
use crate::config::RetrievalConfig;
use crate::domain::{FetchOutcome, FetchStatus};
use crate::strategy::{status_from_error, status_from_response, FetchStrategy, StrategyId};

const AVAILABILITY_ENDPOINT: &str = "https://archive.org/wayback/available";

/// Fetch the most recent Wayback Machine snapshot instead of the live page.
///
/// Last resort for origins that are unreachable or permanently blocking.
/// The availability API is asked for the closest snapshot first; if it has
/// nothing useful the `web.archive.org/web/<url>` redirect form is tried,
/// which resolves to the latest capture on its own.
pub struct ArchivedSnapshot {
    client: Client,
}

impl ArchivedSnapshot {
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }

    async fn closest_snapshot(&self, url: &Url, deadline: Instant) -> Option<String> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }

        let response = self
            .client
            .get(AVAILABILITY_ENDPOINT)
            .query(&[("url", url.as_str())])
            .timeout(remaining)
            .send()
            .await
            .ok()?;

        let body = response.text().await.ok()?;
        let value: serde_json::Value = serde_json::from_str(&body).ok()?;
        let closest = value.get("archived_snapshots")?.get("closest")?;
        if !closest.get("available")?.as_bool()? {
            return None;
        }

        let snapshot = closest.get("url")?.as_str()?;
        // The API still hands out http:// snapshot URLs
        Some(if let Some(rest) = snapshot.strip_prefix("http://") {
            format!("https://{rest}")
        } else {
            snapshot.to_string()
        })
    }
}

#[async_trait]
impl FetchStrategy for ArchivedSnapshot {
    fn id(&self) -> StrategyId {
        StrategyId::ArchivedSnapshot
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome {
        let deadline = Instant::now() + timeout;

        let target = match self.closest_snapshot(url, deadline).await {
            Some(snapshot) => snapshot,
            None => format!("https://web.archive.org/web/{url}"),
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return FetchOutcome::new(StrategyId::ArchivedSnapshot, FetchStatus::Timeout);
        }

        tracing::debug!(snapshot = %target, "fetching archived snapshot");
        let status = match self.client.get(&target).timeout(remaining).send().await {
            Ok(response) => status_from_response(response).await,
            Err(e) => status_from_error(&e),
        };

        FetchOutcome::new(StrategyId::ArchivedSnapshot, status)
    }
}
