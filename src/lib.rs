//! # Longform
//!
//! Best-effort retrieval of readable article text from origins that may
//! block, challenge, or require JavaScript rendering.
//!
//! ## Architecture
//!
//! The core is a cascade of fetch strategies of increasing cost:
//!
//! ```text
//! URL → Cascade Controller → (Strategy → Extractor → Evaluator) → ...
//!                                  ↓ first usable result
//!                          ExtractedArticle (→ ArticleCache)
//! ```
//!
//! Strategies run one at a time, in configured order, each with its own
//! timeout carved out of an overall wall-clock budget. The first attempt
//! that yields usable article text wins and later strategies never run;
//! when every strategy fails, the result carries an ordered trace of what
//! was tried and why each attempt failed.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use longform::app::AppContext;
//!
//! let ctx = AppContext::with_defaults()?;
//! match ctx.retrieve("https://example.com/news/story").await? {
//!     result if result.is_usable() => {
//!         let article = result.article().unwrap();
//!         println!("{}\n\n{}", article.display_title(), article.body);
//!     }
//!     result => eprintln!("retrieval failed:\n{}", result.trace()),
//! }
//! ```

/// Application wiring and error handling.
///
/// [`AppContext`](app::AppContext) builds the strategies, controller,
/// cache, and batch retriever from one validated [`RetrievalConfig`](config::RetrievalConfig).
pub mod app;

/// Concurrent retrieval of multiple articles.
///
/// Cascades stay sequential internally; [`BatchRetriever`](batch::BatchRetriever)
/// bounds how many run at once.
pub mod batch;

/// In-process article store with small sequential identifiers.
pub mod cache;

/// The retrieval cascade state machine.
///
/// [`CascadeController`](cascade::CascadeController) walks the strategy
/// order, enforces per-attempt and overall time budgets, and stops at the
/// first usable article.
pub mod cascade;

/// Configuration surface: strategy order, budgets, thresholds, selector and
/// block-signature lists.
pub mod config;

/// Core domain types.
///
/// - [`RetrievalRequest`](domain::RetrievalRequest): one validated retrieval job
/// - [`ExtractedArticle`](domain::ExtractedArticle): title + body + word count
/// - [`CascadeResult`](domain::CascadeResult): usable article or ordered failure trace
pub mod domain;

/// Usability judgment for fetch+extract results.
pub mod evaluator;

/// Article text extraction from raw HTML: a Readability pass with a
/// selector-heuristic fallback.
pub mod extractor;

/// Fetch strategies.
///
/// - [`LightClient`](strategy::LightClient): browser-headed HTTP with cookie jar
/// - [`DirectFetch`](strategy::DirectFetch): plain GET, no evasion
/// - [`StealthBrowser`](strategy::StealthBrowser): headless Chrome rendering, pooled
/// - [`ArchivedSnapshot`](strategy::ArchivedSnapshot): Wayback Machine fallback
pub mod strategy;
