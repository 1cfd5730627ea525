use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app::{LongformError, Result};
use crate::strategy::StrategyId;

/// Configuration for the retrieval cascade.
///
/// Every tunable the cascade, strategies, extractor, and evaluator consult
/// lives here. All fields have defaults, so a partial TOML document (or
/// `RetrievalConfig::default()`) is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Strategies to try, in order. Each variant runs at most once per cascade.
    pub strategy_order: Vec<StrategyId>,

    /// Wall-clock ceiling for one whole cascade in seconds (default: 60)
    pub overall_budget_secs: u64,

    /// Timeout for a single strategy attempt in seconds (default: 20)
    pub attempt_timeout_secs: u64,

    /// Minimum word count for an extracted article to be usable (default: 40)
    pub min_words: usize,

    /// Minimum character count for an extraction candidate (default: 100)
    pub min_extract_chars: usize,

    /// Extracted text shorter than this is checked against block signatures (default: 500)
    pub block_page_max_chars: usize,

    /// Phrases that mark short extractions as block/challenge pages
    pub block_signatures: Vec<String>,

    /// Phrases that mark an extraction as a block page at any length
    pub hard_block_signatures: Vec<String>,

    /// CSS selectors to try for article content extraction, in priority order
    pub content_selectors: Vec<String>,

    /// CSS selectors for elements to remove (ads, navigation, etc.)
    pub remove_selectors: Vec<String>,

    /// Browser-like user agent presented by the light client
    pub user_agent: String,

    /// Whether to run the stealth browser in headless mode (default: true)
    pub headless: bool,

    /// Wait time after page load for dynamic content in milliseconds (default: 2000)
    pub wait_after_load_ms: u64,

    /// Maximum concurrent stealth browser instances (default: 2)
    pub browser_instances: usize,

    /// Maximum concurrent cascades in batch retrieval (default: 4)
    pub workers: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy_order: vec![
                StrategyId::LightClient,
                StrategyId::DirectFetch,
                StrategyId::StealthBrowser,
                StrategyId::ArchivedSnapshot,
            ],
            overall_budget_secs: 60,
            attempt_timeout_secs: 20,
            min_words: 40,
            min_extract_chars: 100,
            block_page_max_chars: 500,
            block_signatures: vec![
                "cloudflare".to_string(),
                "attention required".to_string(),
                "access denied".to_string(),
                "security service".to_string(),
                "challenge-platform".to_string(),
                "enable cookies".to_string(),
                "enable javascript".to_string(),
                "captcha".to_string(),
                "human verification".to_string(),
                "ray id".to_string(),
            ],
            hard_block_signatures: vec![
                "security service to protect itself from online attacks".to_string(),
            ],
            content_selectors: vec![
                "article".to_string(),
                "[role=\"main\"]".to_string(),
                "main".to_string(),
                ".post-content".to_string(),
                ".article-content".to_string(),
                ".entry-content".to_string(),
                ".article-body".to_string(),
                ".story-body".to_string(),
                ".content".to_string(),
                "#content".to_string(),
                ".post".to_string(),
                ".article".to_string(),
            ],
            remove_selectors: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                ".sidebar".to_string(),
                ".advertisement".to_string(),
                ".ad".to_string(),
                ".ads".to_string(),
                ".social-share".to_string(),
                ".comments".to_string(),
                ".related-posts".to_string(),
                ".newsletter".to_string(),
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
                "form".to_string(),
                "iframe".to_string(),
            ],
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            headless: true,
            wait_after_load_ms: 2000,
            browser_instances: 2,
            workers: 4,
        }
    }
}

impl RetrievalConfig {
    /// Get the overall cascade budget as a Duration
    pub fn overall_budget(&self) -> Duration {
        Duration::from_secs(self.overall_budget_secs)
    }

    /// Get the per-attempt timeout as a Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Get the post-load settle time as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }

    /// Create a config optimized for speed (less thorough)
    pub fn fast() -> Self {
        Self {
            overall_budget_secs: 30,
            attempt_timeout_secs: 10,
            wait_after_load_ms: 1000,
            strategy_order: vec![StrategyId::LightClient, StrategyId::DirectFetch],
            ..Default::default()
        }
    }

    /// Create a config optimized for stubborn pages (slower)
    pub fn thorough() -> Self {
        Self {
            overall_budget_secs: 120,
            attempt_timeout_secs: 30,
            wait_after_load_ms: 4000,
            browser_instances: 1,
            ..Default::default()
        }
    }

    /// Reject configurations the cascade cannot run with.
    ///
    /// Empty strategy orders, duplicate strategies, and non-positive budgets
    /// are reported immediately rather than silently defaulted.
    pub fn validate(&self) -> Result<()> {
        if self.strategy_order.is_empty() {
            return Err(LongformError::Config("strategy_order is empty".into()));
        }
        for (i, id) in self.strategy_order.iter().enumerate() {
            if self.strategy_order[..i].contains(id) {
                return Err(LongformError::Config(format!(
                    "strategy_order lists {id} more than once"
                )));
            }
        }
        if self.overall_budget_secs == 0 {
            return Err(LongformError::Config("overall_budget_secs must be positive".into()));
        }
        if self.attempt_timeout_secs == 0 {
            return Err(LongformError::Config("attempt_timeout_secs must be positive".into()));
        }
        if self.browser_instances == 0 {
            return Err(LongformError::Config("browser_instances must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(LongformError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = RetrievalConfig::default();
        assert_eq!(config.strategy_order.len(), 4);
        assert_eq!(config.strategy_order[0], StrategyId::LightClient);
        assert_eq!(config.overall_budget_secs, 60);
        assert_eq!(config.attempt_timeout_secs, 20);
        assert_eq!(config.min_words, 40);
        assert_eq!(config.browser_instances, 2);
        assert!(config.headless);
        assert!(!config.block_signatures.is_empty());
        assert!(!config.content_selectors.is_empty());
        assert!(!config.remove_selectors.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fast_config() {
        let config = RetrievalConfig::fast();
        assert_eq!(config.overall_budget_secs, 30);
        assert_eq!(config.attempt_timeout_secs, 10);
        // Fast mode skips the browser entirely
        assert!(!config.strategy_order.contains(&StrategyId::StealthBrowser));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thorough_config() {
        let config = RetrievalConfig::thorough();
        assert_eq!(config.overall_budget_secs, 120);
        assert_eq!(config.wait_after_load_ms, 4000);
        assert_eq!(config.browser_instances, 1);
        // Inherits defaults for the rest
        assert_eq!(config.min_words, 40);
    }

    #[test]
    fn test_duration_accessors() {
        let config = RetrievalConfig::default();
        assert_eq!(config.overall_budget(), Duration::from_secs(60));
        assert_eq!(config.attempt_timeout(), Duration::from_secs(20));
        assert_eq!(config.wait_after_load(), Duration::from_millis(2000));
    }

    #[test]
    fn test_empty_strategy_order_rejected() {
        let config = RetrievalConfig {
            strategy_order: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_strategy_rejected() {
        let config = RetrievalConfig {
            strategy_order: vec![StrategyId::DirectFetch, StrategyId::DirectFetch],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = RetrievalConfig {
            overall_budget_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_config() {
        let content = r#"
overall_budget_secs = 15
min_words = 80
strategy_order = ["light_client", "archived_snapshot"]
"#;
        let config: RetrievalConfig = toml::from_str(content).expect("partial config should parse");
        assert_eq!(config.overall_budget_secs, 15);
        assert_eq!(config.min_words, 80);
        assert_eq!(
            config.strategy_order,
            vec![StrategyId::LightClient, StrategyId::ArchivedSnapshot]
        );
        // Default value
        assert_eq!(config.attempt_timeout_secs, 20);
    }

    #[test]
    fn test_empty_toml_config() {
        let config: RetrievalConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.overall_budget_secs, 60);
        assert!(config.validate().is_ok());
    }
}
