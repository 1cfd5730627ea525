use std::fmt;

use crate::domain::ExtractedArticle;
use crate::strategy::StrategyId;

/// What a single fetch attempt produced.
#[derive(Debug, Clone)]
pub enum FetchStatus {
    /// Raw page HTML, possibly a challenge page dressed up as HTTP 200
    Success { html: String },
    /// The origin detected and rejected the request (403/503/429, challenge)
    Blocked,
    /// Connection, DNS, TLS, or unexpected HTTP failure
    NetworkError(String),
    /// The attempt did not finish within its timeout
    Timeout,
    /// The origin (or archive) has no such page (404/410)
    NotFound,
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Success { .. })
    }
}

/// One strategy's result, handed from the strategy to the extractor.
/// Never mutated after creation.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub strategy: StrategyId,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn new(strategy: StrategyId, status: FetchStatus) -> Self {
        Self { strategy, status }
    }
}

/// Why a finished attempt did not yield a usable article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnusableReason {
    Blocked,
    NetworkError(String),
    Timeout,
    NotFound,
    /// Fetch succeeded but extraction found no meaningful content
    NoContent,
    /// Extraction produced fewer words than the configured minimum
    TooShort { words: usize },
    /// Extracted text matched a block/challenge signature
    BlockPage,
}

impl fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnusableReason::Blocked => write!(f, "blocked by origin"),
            UnusableReason::NetworkError(detail) => write!(f, "network error: {detail}"),
            UnusableReason::Timeout => write!(f, "timed out"),
            UnusableReason::NotFound => write!(f, "page not found"),
            UnusableReason::NoContent => write!(f, "no content extracted"),
            UnusableReason::TooShort { words } => {
                write!(f, "only {words} words extracted")
            }
            UnusableReason::BlockPage => write!(f, "returned a block page"),
        }
    }
}

/// Diagnostic record of one failed attempt, in execution order.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub strategy: StrategyId,
    pub reason: UnusableReason,
}

impl Attempt {
    pub fn new(strategy: StrategyId, reason: UnusableReason) -> Self {
        Self { strategy, reason }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Terminal value of one cascade run.
///
/// `attempts` preserves execution order in both variants; on success it
/// holds the failed attempts that preceded the winning strategy.
#[derive(Debug, Clone)]
pub enum CascadeResult {
    Usable {
        article: ExtractedArticle,
        attempts: Vec<Attempt>,
    },
    Exhausted {
        attempts: Vec<Attempt>,
    },
}

impl CascadeResult {
    pub fn is_usable(&self) -> bool {
        matches!(self, CascadeResult::Usable { .. })
    }

    pub fn article(&self) -> Option<&ExtractedArticle> {
        match self {
            CascadeResult::Usable { article, .. } => Some(article),
            CascadeResult::Exhausted { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        match self {
            CascadeResult::Usable { attempts, .. } => attempts,
            CascadeResult::Exhausted { attempts } => attempts,
        }
    }

    /// Render the attempt history as a human-readable trace, one
    /// `strategy: reason` line per attempt.
    pub fn trace(&self) -> String {
        let mut lines: Vec<String> = self.attempts().iter().map(Attempt::to_string).collect();
        if let CascadeResult::Usable { article, .. } = self {
            lines.push(format!(
                "{}: succeeded ({} words)",
                article.source_strategy, article.word_count
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(words: &str, strategy: StrategyId) -> ExtractedArticle {
        ExtractedArticle::new(Some("T".into()), words.into(), strategy)
    }

    #[test]
    fn test_status_is_success() {
        assert!(FetchStatus::Success { html: "<p>x</p>".into() }.is_success());
        assert!(!FetchStatus::Blocked.is_success());
        assert!(!FetchStatus::Timeout.is_success());
    }

    #[test]
    fn test_attempt_display() {
        let attempt = Attempt::new(StrategyId::LightClient, UnusableReason::Blocked);
        assert_eq!(attempt.to_string(), "light client: blocked by origin");

        let attempt = Attempt::new(
            StrategyId::StealthBrowser,
            UnusableReason::TooShort { words: 7 },
        );
        assert_eq!(attempt.to_string(), "stealth browser: only 7 words extracted");
    }

    #[test]
    fn test_exhausted_trace_preserves_order() {
        let result = CascadeResult::Exhausted {
            attempts: vec![
                Attempt::new(StrategyId::LightClient, UnusableReason::Blocked),
                Attempt::new(StrategyId::DirectFetch, UnusableReason::Timeout),
                Attempt::new(StrategyId::ArchivedSnapshot, UnusableReason::NotFound),
            ],
        };
        let trace = result.trace();
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("light client"));
        assert!(lines[1].starts_with("direct fetch"));
        assert!(lines[2].starts_with("archived snapshot"));
    }

    #[test]
    fn test_usable_trace_ends_with_success_line() {
        let result = CascadeResult::Usable {
            article: article("a b c", StrategyId::DirectFetch),
            attempts: vec![Attempt::new(StrategyId::LightClient, UnusableReason::Blocked)],
        };
        let trace = result.trace();
        assert!(trace.ends_with("direct fetch: succeeded (3 words)"));
    }

    #[test]
    fn test_article_accessor() {
        let result = CascadeResult::Usable {
            article: article("a b", StrategyId::LightClient),
            attempts: vec![],
        };
        assert!(result.is_usable());
        assert_eq!(result.article().map(|a| a.word_count), Some(2));

        let failed = CascadeResult::Exhausted { attempts: vec![] };
        assert!(!failed.is_usable());
        assert!(failed.article().is_none());
    }
}
