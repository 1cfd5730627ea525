mod archive;
mod direct_fetch;
mod light_client;
mod stealth_browser;

pub use archive::ArchivedSnapshot;
pub use direct_fetch::DirectFetch;
pub use light_client::LightClient;
pub use stealth_browser::StealthBrowser;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{FetchOutcome, FetchStatus};

/// Identity of one acquisition technique.
///
/// Cascade position is policy (see `RetrievalConfig::strategy_order`), not
/// part of the identity; new techniques are new variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    LightClient,
    StealthBrowser,
    DirectFetch,
    ArchivedSnapshot,
}

impl StrategyId {
    pub const ALL: [StrategyId; 4] = [
        StrategyId::LightClient,
        StrategyId::StealthBrowser,
        StrategyId::DirectFetch,
        StrategyId::ArchivedSnapshot,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StrategyId::LightClient => "light client",
            StrategyId::StealthBrowser => "stealth browser",
            StrategyId::DirectFetch => "direct fetch",
            StrategyId::ArchivedSnapshot => "archived snapshot",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One technique for obtaining raw page content.
///
/// Implementations absorb every failure into a [`FetchStatus`] variant and
/// honor `timeout` across all of their I/O, including any internal retry.
/// The controller additionally hard-cancels strategies that overrun.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn id(&self) -> StrategyId;

    async fn fetch(&self, url: &Url, timeout: Duration) -> FetchOutcome;
}

/// Map a transport-level reqwest failure onto a fetch status.
pub(crate) fn status_from_error(e: &reqwest::Error) -> FetchStatus {
    if e.is_timeout() {
        FetchStatus::Timeout
    } else {
        FetchStatus::NetworkError(e.to_string())
    }
}

/// Map an HTTP response onto a fetch status, reading the body on success.
///
/// 403/503/429 are treated as bot blocks; a 200 whose body looks like a
/// challenge interstitial is a block too, not a success.
pub(crate) async fn status_from_response(response: reqwest::Response) -> FetchStatus {
    let status = response.status();

    if status == StatusCode::FORBIDDEN
        || status == StatusCode::SERVICE_UNAVAILABLE
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        return FetchStatus::Blocked;
    }
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return FetchStatus::NotFound;
    }
    if !status.is_success() {
        return FetchStatus::NetworkError(format!("HTTP {status}"));
    }

    match response.text().await {
        Ok(html) if is_challenge_page(&html) => FetchStatus::Blocked,
        Ok(html) => FetchStatus::Success { html },
        Err(e) => status_from_error(&e),
    }
}

/// Challenge interstitials are small; anything page-sized is assumed real.
const CHALLENGE_SNIFF_MAX_LEN: usize = 60_000;

const CHALLENGE_MARKERS: [&str; 6] = [
    "cf-chl",
    "challenge-platform",
    "just a moment",
    "attention required",
    "checking your browser",
    "cf-browser-verification",
];

pub(crate) fn is_challenge_page(html: &str) -> bool {
    if html.len() > CHALLENGE_SNIFF_MAX_LEN {
        return false;
    }
    let lower = html.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| lower.contains(marker))
}
