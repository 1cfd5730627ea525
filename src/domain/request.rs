use std::time::Duration;

use url::Url;

use crate::app::{LongformError, Result};
use crate::config::RetrievalConfig;
use crate::strategy::StrategyId;

/// One article-retrieval job. Immutable once constructed.
///
/// Construction validates everything the cascade depends on: an absolute
/// http(s) URL, a positive time budget, and a non-empty strategy order with
/// no strategy listed twice. Invalid input is rejected here, loudly, so the
/// cascade itself never has to second-guess its inputs.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub url: Url,
    pub time_budget: Duration,
    pub strategy_order: Vec<StrategyId>,
    pub min_words: usize,
}

impl RetrievalRequest {
    /// Build a request with the budget, order, and threshold from `config`.
    pub fn new(url: &str, config: &RetrievalConfig) -> Result<Self> {
        Self::with_overrides(url, config, None, None, None)
    }

    /// Build a request, overriding the config's budget, word threshold, or
    /// strategy order for this one retrieval.
    pub fn with_overrides(
        url: &str,
        config: &RetrievalConfig,
        time_budget: Option<Duration>,
        min_words: Option<usize>,
        strategy_order: Option<Vec<StrategyId>>,
    ) -> Result<Self> {
        let url = parse_article_url(url)?;
        let time_budget = time_budget.unwrap_or_else(|| config.overall_budget());
        let strategy_order = strategy_order.unwrap_or_else(|| config.strategy_order.clone());

        if time_budget.is_zero() {
            return Err(LongformError::InvalidRequest(
                "time budget must be positive".into(),
            ));
        }
        if strategy_order.is_empty() {
            return Err(LongformError::InvalidRequest(
                "strategy order is empty".into(),
            ));
        }
        for (i, id) in strategy_order.iter().enumerate() {
            if strategy_order[..i].contains(id) {
                return Err(LongformError::InvalidRequest(format!(
                    "strategy {id} listed more than once"
                )));
            }
        }

        Ok(Self {
            url,
            time_budget,
            strategy_order,
            min_words: min_words.unwrap_or(config.min_words),
        })
    }
}

fn parse_article_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| LongformError::InvalidRequest(format!("malformed URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LongformError::InvalidRequest(format!(
            "unsupported URL scheme {other:?}"
        ))),
    }
}
