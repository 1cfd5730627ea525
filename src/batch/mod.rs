use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::cascade::CascadeController;
use crate::domain::{CascadeResult, RetrievalRequest};

pub const DEFAULT_WORKERS: usize = 4;

/// Runs several per-article cascades concurrently.
///
/// Each cascade is still strictly sequential inside; the semaphore bounds
/// how many are in flight at once. Results carry the caller's identifier
/// because completion order is not arrival order.
pub struct BatchRetriever {
    controller: Arc<CascadeController>,
    semaphore: Arc<Semaphore>,
}

impl BatchRetriever {
    pub fn new(controller: Arc<CascadeController>) -> Self {
        Self::with_workers(controller, DEFAULT_WORKERS)
    }

    pub fn with_workers(controller: Arc<CascadeController>, workers: usize) -> Self {
        Self {
            controller,
            semaphore: Arc::new(Semaphore::new(workers)),
        }
    }

    /// Retrieve every request, returning `(caller_id, result)` pairs.
    /// Correlate by the identifier, not by position.
    pub async fn retrieve_all(
        &self,
        requests: Vec<(u64, RetrievalRequest)>,
    ) -> Vec<(u64, CascadeResult)> {
        let mut handles = Vec::new();

        for (caller_id, request) in requests {
            let controller = self.controller.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                let result = controller.run(&request).await;
                (caller_id, result)
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("cascade task join error: {}", e);
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use url::Url;

    use crate::config::RetrievalConfig;
    use crate::domain::{FetchOutcome, FetchStatus};
    use crate::evaluator::OutcomeEvaluator;
    use crate::extractor::ContentExtractor;
    use crate::strategy::{FetchStrategy, StrategyId};

    /// Tracks how many fetches run at once.
    struct GaugedStrategy {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FetchStrategy for GaugedStrategy {
        fn id(&self) -> StrategyId {
            StrategyId::DirectFetch
        }

        async fn fetch(&self, url: &Url, _timeout: Duration) -> FetchOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            // Succeed only for even-numbered story paths
            let even = url.path().ends_with('0') || url.path().ends_with('2');
            let status = if even {
                let body: String = (0..50).map(|i| format!("word{i} ")).collect();
                FetchStatus::Success {
                    html: format!("<html><body><article><p>{body}</p></article></body></html>"),
                }
            } else {
                FetchStatus::Blocked
            };
            FetchOutcome::new(StrategyId::DirectFetch, status)
        }
    }

    fn batch(workers: usize) -> (BatchRetriever, Arc<AtomicUsize>) {
        let config = RetrievalConfig::default();
        let peak = Arc::new(AtomicUsize::new(0));
        let strategy = GaugedStrategy {
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: peak.clone(),
        };
        let controller = Arc::new(CascadeController::new(
            vec![Arc::new(strategy)],
            ContentExtractor::new(&config),
            OutcomeEvaluator::new(&config),
            Duration::from_secs(5),
        ));
        (BatchRetriever::with_workers(controller, workers), peak)
    }

    fn requests(n: usize) -> Vec<(u64, RetrievalRequest)> {
        let config = RetrievalConfig::default();
        (0..n)
            .map(|i| {
                let request = RetrievalRequest::with_overrides(
                    &format!("https://example.com/story/{i}"),
                    &config,
                    None,
                    Some(10),
                    Some(vec![StrategyId::DirectFetch]),
                )
                .unwrap();
                (i as u64, request)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_results_correlate_by_caller_id() {
        let (batch, _) = batch(4);
        let results = batch.retrieve_all(requests(4)).await;

        assert_eq!(results.len(), 4);
        for (caller_id, result) in &results {
            // Stories 0 and 2 succeed, 1 and 3 are blocked
            assert_eq!(result.is_usable(), *caller_id % 2 == 0, "story {caller_id}");
        }
    }

    #[tokio::test]
    async fn test_worker_limit_bounds_concurrency() {
        let (batch, peak) = batch(2);
        let results = batch.retrieve_all(requests(6)).await;

        assert_eq!(results.len(), 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_empty_batch_returns_no_results() {
        let (batch, _) = batch(2);
        let results = tokio_test::block_on(batch.retrieve_all(Vec::new()));
        assert!(results.is_empty());
    }
}
