use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use rand::Rng;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use url::Url;

use crate::config::RetrievalConfig;
use crate::domain::{FetchOutcome, FetchStatus};
use crate::strategy::{is_challenge_page, FetchStrategy, StrategyId};

const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const WINDOW_SIZES: [(u32, u32); 4] = [(1920, 1080), (1680, 1050), (1536, 864), (1440, 900)];

/// Full browser rendering for pages that defeat the HTTP strategies.
///
/// Each fetch launches a fresh browser instance, so sessions never bleed
/// into each other. Instances are the most expensive resource in the crate;
/// a semaphore caps how many exist at once across all concurrent cascades.
/// The pool permit, the page, and the browser process are all released on
/// every exit path, timeout included.
pub struct StealthBrowser {
    pool: Arc<Semaphore>,
    headless: bool,
    wait_after_load: Duration,
}

impl StealthBrowser {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            pool: Arc::new(Semaphore::new(config.browser_instances)),
            headless: config.headless,
            wait_after_load: config.wait_after_load(),
        }
    }

    async fn launch(&self) -> Result<(Browser, Handler), String> {
        let (width, height, user_agent) = {
            let mut rng = rand::thread_rng();
            let (w, h) = WINDOW_SIZES[rng.gen_range(0..WINDOW_SIZES.len())];
            let ua = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];
            (w, h, ua)
        };

        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--window-size={width},{height}"))
            .arg(format!("--user-agent={user_agent}"));

        if !self.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| format!("failed to build browser config: {e}"))?;

        Browser::launch(browser_config).await.map_err(|e| {
            format!("failed to launch browser: {e}. Is Chrome or Chromium installed and in PATH?")
        })
    }

    async fn capture(&self, browser: &Browser, url: &Url) -> Result<String, String> {
        let page = browser
            .new_page(url.as_str())
            .await
            .map_err(|e| format!("failed to create page: {e}"))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| format!("navigation failed: {e}"))?;

        // Give client-side rendering a chance to fill the page in
        tokio::time::sleep(self.wait_after_load).await;

        let html = page
            .content()
            .await
            .map_err(|e| format!("failed to read page content: {e}"))?;

        let _ = page.close().await;
        Ok(html)
    }

    async fn render(&self, url: &Url, deadline: Instant) -> FetchStatus {
        let (mut browser, mut handler) = match self.launch().await {
            Ok(launched) => launched,
            Err(e) => return FetchStatus::NetworkError(e),
        };

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drain browser events
            }
        });

        let remaining = deadline.saturating_duration_since(Instant::now());
        let status = if remaining.is_zero() {
            FetchStatus::Timeout
        } else {
            match tokio::time::timeout(remaining, self.capture(&browser, url)).await {
                Ok(Ok(html)) if is_challenge_page(&html) => FetchStatus::Blocked,
                Ok(Ok(html)) => FetchStatus::Success { html },
                Ok(Err(e)) => FetchStatus::NetworkError(e),
                Err(_) => FetchStatus::Timeout,
            }
        };

        // Session teardown runs on every path, including timeout
        let _ = browser.close().await;
        let _ = browser.wait().await;
        handler_task.abort();

        status
    }
}

#[async_trait]
impl FetchStrategy for StealthBrowser {
    fn id(&self) -> StrategyId {
        StrategyId::StealthBrowser
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome {
        let deadline = Instant::now() + timeout;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return FetchOutcome::new(StrategyId::StealthBrowser, FetchStatus::Timeout);
        }

        // A busy pool counts against this attempt's budget
        let permit = match tokio::time::timeout(remaining, self.pool.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return FetchOutcome::new(
                    StrategyId::StealthBrowser,
                    FetchStatus::NetworkError("browser pool closed".into()),
                )
            }
            Err(_) => return FetchOutcome::new(StrategyId::StealthBrowser, FetchStatus::Timeout),
        };

        let status = self.render(url, deadline).await;
        drop(permit);

        FetchOutcome::new(StrategyId::StealthBrowser, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_identity() {
        let browser = StealthBrowser::new(&RetrievalConfig::default());
        assert_eq!(browser.id(), StrategyId::StealthBrowser);
    }

    #[test]
    fn test_pool_sized_from_config() {
        let config = RetrievalConfig {
            browser_instances: 1,
            ..Default::default()
        };
        let browser = StealthBrowser::new(&config);
        assert_eq!(browser.pool.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_timeout_reports_timeout_without_launching() {
        let browser = StealthBrowser::new(&RetrievalConfig::default());
        let url = Url::parse("https://example.com/article").unwrap();
        let outcome = browser.fetch(&url, Duration::ZERO).await;
        assert!(matches!(outcome.status, FetchStatus::Timeout));
    }
}
