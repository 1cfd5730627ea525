use std::sync::Arc;

use crate::app::Result;
use crate::batch::BatchRetriever;
use crate::cache::ArticleCache;
use crate::cascade::CascadeController;
use crate::config::RetrievalConfig;
use crate::domain::{CascadeResult, RetrievalRequest};
use crate::evaluator::OutcomeEvaluator;
use crate::extractor::ContentExtractor;
use crate::strategy::{
    ArchivedSnapshot, DirectFetch, FetchStrategy, LightClient, StealthBrowser,
};

/// Wires the retrieval core together: strategies, cascade controller,
/// article cache, and batch retriever, all built from one validated config.
pub struct AppContext {
    config: RetrievalConfig,
    cascade: Arc<CascadeController>,
    cache: Arc<ArticleCache>,
    batch: BatchRetriever,
}

impl AppContext {
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        config.validate()?;

        let strategies: Vec<Arc<dyn FetchStrategy>> = vec![
            Arc::new(LightClient::new(&config)?),
            Arc::new(DirectFetch::new()?),
            Arc::new(StealthBrowser::new(&config)),
            Arc::new(ArchivedSnapshot::new(&config)?),
        ];

        let cascade = Arc::new(CascadeController::new(
            strategies,
            ContentExtractor::new(&config),
            OutcomeEvaluator::new(&config),
            config.attempt_timeout(),
        ));
        let batch = BatchRetriever::with_workers(cascade.clone(), config.workers);

        Ok(Self {
            config,
            cascade,
            cache: Arc::new(ArticleCache::new()),
            batch,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(RetrievalConfig::default())
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    /// Run one cascade for `url` with the configured defaults.
    pub async fn retrieve(&self, url: &str) -> Result<CascadeResult> {
        let request = RetrievalRequest::new(url, &self.config)?;
        Ok(self.cascade.run(&request).await)
    }

    /// Run one cascade for an already-built request.
    pub async fn retrieve_with(&self, request: &RetrievalRequest) -> CascadeResult {
        self.cascade.run(request).await
    }

    /// Run one cascade and feed a usable result into the cache; returns the
    /// assigned article identifier alongside the result.
    pub async fn retrieve_and_cache(&self, url: &str) -> Result<(CascadeResult, Option<u64>)> {
        let result = self.retrieve(url).await?;
        let id = result
            .article()
            .map(|article| self.cache.insert(url, article.clone()));
        Ok((result, id))
    }

    /// Retrieve a batch of URLs concurrently; results are `(caller_id,
    /// result)` pairs in no particular order.
    pub async fn retrieve_all(
        &self,
        requests: Vec<(u64, RetrievalRequest)>,
    ) -> Vec<(u64, CascadeResult)> {
        self.batch.retrieve_all(requests).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builds_from_default_config() {
        let ctx = AppContext::with_defaults().unwrap();
        assert_eq!(ctx.config().strategy_order.len(), 4);
        assert!(ctx.cache().is_empty());
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let config = RetrievalConfig {
            strategy_order: vec![],
            ..Default::default()
        };
        assert!(AppContext::new(config).is_err());
    }

    #[tokio::test]
    async fn test_retrieve_rejects_malformed_url() {
        let ctx = AppContext::with_defaults().unwrap();
        assert!(ctx.retrieve("definitely not a url").await.is_err());
    }
}
