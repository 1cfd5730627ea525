use crate::config::RetrievalConfig;
use crate::domain::{ExtractedArticle, FetchOutcome, UnusableReason};
use crate::extractor::Extraction;

/// Decides whether a fetch+extract result is worth returning to the caller.
///
/// Usable means: the fetch actually succeeded, extraction found content, the
/// content clears the word floor, and the text is not a block/challenge page
/// that slipped through with HTTP 200.
pub struct OutcomeEvaluator {
    block_signatures: Vec<String>,
    hard_block_signatures: Vec<String>,
    block_page_max_chars: usize,
}

impl OutcomeEvaluator {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            block_signatures: lowercase_all(&config.block_signatures),
            hard_block_signatures: lowercase_all(&config.hard_block_signatures),
            block_page_max_chars: config.block_page_max_chars,
        }
    }

    /// The full judgment: the article on success, the reason it is unusable
    /// otherwise. The reason feeds the cascade's diagnostic trace.
    pub fn judge(
        &self,
        extraction: Extraction,
        min_words: usize,
    ) -> Result<ExtractedArticle, UnusableReason> {
        let article = match extraction {
            Extraction::Article(article) => article,
            Extraction::Empty => return Err(UnusableReason::NoContent),
        };

        if self.is_block_page(&article.body) {
            return Err(UnusableReason::BlockPage);
        }
        if article.word_count < min_words {
            return Err(UnusableReason::TooShort {
                words: article.word_count,
            });
        }

        Ok(article)
    }

    /// Pure usability predicate over one attempt's fetch outcome and
    /// extraction. `judge` is the operational form; this is the contract.
    pub fn is_usable(
        &self,
        outcome: &FetchOutcome,
        extraction: &Extraction,
        min_words: usize,
    ) -> bool {
        outcome.status.is_success() && self.judge(extraction.clone(), min_words).is_ok()
    }

    /// Block pages are short and carry telltale phrases; one phrase family
    /// ("security service...") is conclusive at any length because
    /// extraction sometimes isolates exactly that sentence from a real page.
    pub fn is_block_page(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        if self
            .hard_block_signatures
            .iter()
            .any(|sig| lower.contains(sig))
        {
            return true;
        }

        text.chars().count() < self.block_page_max_chars
            && self.block_signatures.iter().any(|sig| lower.contains(sig))
    }
}

fn lowercase_all(signatures: &[String]) -> Vec<String> {
    signatures.iter().map(|s| s.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FetchStatus;
    use crate::strategy::StrategyId;

    fn evaluator() -> OutcomeEvaluator {
        OutcomeEvaluator::new(&RetrievalConfig::default())
    }

    fn article(body: &str) -> Extraction {
        Extraction::Article(ExtractedArticle::new(
            Some("T".into()),
            body.into(),
            StrategyId::LightClient,
        ))
    }

    fn long_article() -> Extraction {
        article(&"word ".repeat(120))
    }

    fn success_outcome() -> FetchOutcome {
        FetchOutcome::new(StrategyId::LightClient, FetchStatus::Success { html: "<p>x</p>".into() })
    }

    #[test]
    fn test_long_clean_article_usable() {
        assert!(evaluator().is_usable(&success_outcome(), &long_article(), 40));
        assert!(evaluator().judge(long_article(), 40).is_ok());
    }

    #[test]
    fn test_empty_extraction_unusable() {
        assert_eq!(
            evaluator().judge(Extraction::Empty, 40),
            Err(UnusableReason::NoContent)
        );
    }

    #[test]
    fn test_below_word_floor_never_usable() {
        let short = article("only a handful of words here");
        assert_eq!(
            evaluator().judge(short.clone(), 40),
            Err(UnusableReason::TooShort { words: 6 })
        );
        // Even with a successful fetch
        assert!(!evaluator().is_usable(&success_outcome(), &short, 40));
    }

    #[test]
    fn test_word_floor_boundary() {
        let exactly = article(&"word ".repeat(40));
        assert!(evaluator().judge(exactly, 40).is_ok());
        let one_under = article(&"word ".repeat(39));
        assert!(evaluator().judge(one_under, 40).is_err());
    }

    #[test]
    fn test_failed_fetch_never_usable() {
        let outcome = FetchOutcome::new(StrategyId::LightClient, FetchStatus::Blocked);
        assert!(!evaluator().is_usable(&outcome, &long_article(), 40));
    }

    #[test]
    fn test_short_block_page_rejected() {
        let block = article("Attention Required! Please complete the CAPTCHA to continue.");
        assert_eq!(evaluator().judge(block, 5), Err(UnusableReason::BlockPage));
    }

    #[test]
    fn test_block_signature_case_insensitive() {
        assert!(evaluator().is_block_page("CLOUDFLARE Ray ID: abc123"));
    }

    #[test]
    fn test_long_text_with_incidental_signature_allowed() {
        // A real article discussing CAPTCHAs is longer than any block page
        let body = format!(
            "The rise of captcha walls has changed how readers reach news. {}",
            "Publishers keep experimenting with verification flows. ".repeat(20)
        );
        assert!(!evaluator().is_block_page(&body));
        assert!(evaluator().judge(article(&body), 40).is_ok());
    }

    #[test]
    fn test_hard_signature_rejected_at_any_length() {
        let body = format!(
            "This website is using a security service to protect itself from online attacks. {}",
            "filler text ".repeat(100)
        );
        assert!(evaluator().is_block_page(&body));
    }
}
