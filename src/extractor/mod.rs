use dom_query::Document;
use dom_smoothie::Readability;
use url::Url;

use crate::config::RetrievalConfig;
use crate::domain::ExtractedArticle;
use crate::strategy::StrategyId;

/// Result of running the extractor over raw HTML.
///
/// `Empty` is a normal outcome for pages with no meaningful article text
/// (link hubs, media pages, shells that only render client-side), not an
/// error; the evaluator treats it as "unusable" and the cascade moves on.
#[derive(Debug, Clone)]
pub enum Extraction {
    Article(ExtractedArticle),
    Empty,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::Empty)
    }
}

/// Isolates article title and body text from raw page HTML.
///
/// Two passes: a Readability pass first, then a selector heuristic that
/// strips known boilerplate and walks the configured content selectors in
/// priority order. Whichever pass first clears the minimum-length gate wins.
pub struct ContentExtractor {
    content_selectors: Vec<String>,
    remove_selectors: Vec<String>,
    min_chars: usize,
}

impl ContentExtractor {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            content_selectors: config.content_selectors.clone(),
            remove_selectors: config.remove_selectors.clone(),
            min_chars: config.min_extract_chars,
        }
    }

    pub fn extract(&self, html: &str, url: &Url, strategy: StrategyId) -> Extraction {
        if html.trim().is_empty() {
            return Extraction::Empty;
        }

        if let Some((title, body)) = self.readability_pass(html, url) {
            if body.chars().count() >= self.min_chars {
                return Extraction::Article(ExtractedArticle::new(title, body, strategy));
            }
        }

        if let Some((title, body)) = self.selector_pass(html) {
            if body.chars().count() >= self.min_chars {
                return Extraction::Article(ExtractedArticle::new(title, body, strategy));
            }
        }

        Extraction::Empty
    }

    fn readability_pass(&self, html: &str, url: &Url) -> Option<(Option<String>, String)> {
        let mut readability = Readability::new(html, Some(url.as_str()), None).ok()?;
        let article = readability.parse().ok()?;

        let body = normalize_whitespace(&article.text_content);
        let title = Some(article.title.trim().to_string()).filter(|t| !t.is_empty());
        Some((title, body))
    }

    fn selector_pass(&self, html: &str) -> Option<(Option<String>, String)> {
        let doc = Document::from(html);

        for selector in &self.remove_selectors {
            doc.select(selector).remove();
        }

        let title = page_title(&doc);

        for selector in &self.content_selectors {
            let selection = doc.select(selector);
            if !selection.exists() {
                continue;
            }
            let text = normalize_whitespace(&selection.text());
            if text.chars().count() >= self.min_chars {
                return Some((title, text));
            }
        }

        // Last resort: whatever the body holds after boilerplate removal
        let body = doc.select("body");
        if body.exists() {
            let text = normalize_whitespace(&body.text());
            if !text.is_empty() {
                return Some((title, text));
            }
        }

        None
    }
}

fn page_title(doc: &Document) -> Option<String> {
    let title = doc.select("title");
    if title.exists() {
        let text = title.text().trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }

    doc.select("h1")
        .nodes()
        .first()
        .map(|node| node.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Decode entities, collapse intra-line whitespace, and squeeze blank-line
/// runs down to single paragraph breaks.
fn normalize_whitespace(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);

    let mut lines: Vec<String> = Vec::new();
    let mut in_blank_run = false;
    for raw in decoded.lines() {
        let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            in_blank_run = true;
            continue;
        }
        if in_blank_run && !lines.is_empty() {
            lines.push(String::new());
        }
        in_blank_run = false;
        lines.push(line);
    }

    lines.join("\n")
}
