use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{
    Attempt, CascadeResult, FetchOutcome, FetchStatus, RetrievalRequest, UnusableReason,
};
use crate::evaluator::OutcomeEvaluator;
use crate::extractor::ContentExtractor;
use crate::strategy::{FetchStrategy, StrategyId};

/// Slack past the per-attempt timeout before the controller hard-cancels an
/// attempt by dropping its future. A cooperative strategy uses the window to
/// report its own `Timeout` and release what it holds.
const CANCEL_GRACE: Duration = Duration::from_millis(250);

/// Runs one retrieval: strategies in request order, extract + evaluate after
/// each, stop at the first usable article or when strategies or the overall
/// time budget run out.
///
/// Each strategy is attempted at most once per run, with a timeout no larger
/// than the remaining overall budget, so one slow strategy cannot starve the
/// rest of the cascade.
pub struct CascadeController {
    strategies: HashMap<StrategyId, Arc<dyn FetchStrategy>>,
    extractor: ContentExtractor,
    evaluator: OutcomeEvaluator,
    attempt_timeout: Duration,
}

impl CascadeController {
    pub fn new(
        strategies: Vec<Arc<dyn FetchStrategy>>,
        extractor: ContentExtractor,
        evaluator: OutcomeEvaluator,
        attempt_timeout: Duration,
    ) -> Self {
        let strategies = strategies.into_iter().map(|s| (s.id(), s)).collect();
        Self {
            strategies,
            extractor,
            evaluator,
            attempt_timeout,
        }
    }

    pub async fn run(&self, request: &RetrievalRequest) -> CascadeResult {
        let deadline = Instant::now() + request.time_budget;
        let mut attempts: Vec<Attempt> = Vec::new();

        for &id in &request.strategy_order {
            let Some(strategy) = self.strategies.get(&id) else {
                tracing::warn!(strategy = %id, "strategy not registered, skipping");
                attempts.push(Attempt::new(
                    id,
                    UnusableReason::NetworkError("strategy not available".into()),
                ));
                continue;
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::debug!(url = %request.url, "overall budget exhausted mid-cascade");
                break;
            }

            let per_attempt = remaining.min(self.attempt_timeout);
            tracing::debug!(
                strategy = %id,
                url = %request.url,
                timeout_ms = per_attempt.as_millis() as u64,
                "attempting fetch"
            );

            let outcome = match tokio::time::timeout(
                per_attempt + CANCEL_GRACE,
                strategy.fetch(&request.url, per_attempt),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(strategy = %id, "attempt overran its timeout and was cancelled");
                    FetchOutcome::new(id, FetchStatus::Timeout)
                }
            };

            match outcome.status {
                FetchStatus::Success { html } => {
                    let extraction = self.extractor.extract(&html, &request.url, id);
                    match self.evaluator.judge(extraction, request.min_words) {
                        Ok(article) => {
                            tracing::info!(
                                strategy = %id,
                                words = article.word_count,
                                url = %request.url,
                                "article retrieved"
                            );
                            return CascadeResult::Usable { article, attempts };
                        }
                        Err(reason) => {
                            tracing::debug!(strategy = %id, %reason, "fetch succeeded but unusable");
                            attempts.push(Attempt::new(id, reason));
                        }
                    }
                }
                FetchStatus::Blocked => attempts.push(Attempt::new(id, UnusableReason::Blocked)),
                FetchStatus::NetworkError(detail) => {
                    attempts.push(Attempt::new(id, UnusableReason::NetworkError(detail)))
                }
                FetchStatus::Timeout => attempts.push(Attempt::new(id, UnusableReason::Timeout)),
                FetchStatus::NotFound => attempts.push(Attempt::new(id, UnusableReason::NotFound)),
            }
        }

        tracing::info!(url = %request.url, attempts = attempts.len(), "cascade exhausted");
        CascadeResult::Exhausted { attempts }
    }
}
