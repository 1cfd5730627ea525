use serde::{Deserialize, Serialize};

use crate::strategy::StrategyId;

/// Article text recovered from one fetch attempt.
///
/// `word_count` is always derived from `body` at construction; there is no
/// other way to build one, so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    pub body: String,
    pub word_count: usize,
    pub source_strategy: StrategyId,
}

impl ExtractedArticle {
    pub fn new(title: Option<String>, body: String, source_strategy: StrategyId) -> Self {
        let word_count = count_words(&body);
        Self {
            title,
            body,
            word_count,
            source_strategy,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
