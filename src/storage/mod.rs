//! Persistence boundary for articles, sources, and categories.
//!
//! The aggregation core depends on these traits only; `LocalStore` is the
//! bundled JSON-file implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── articles.json     # Stored article rows
//! ├── sources.json      # Source registry (seeded on first open)
//! └── categories.json   # Category taxonomy (seeded on first open)
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Article, Category, NormalizedArticle, Source};

// Re-export for convenience
pub use local::LocalStore;

/// Article lookup and persistence.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Find a stored article by its canonical URL.
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// Persist one article as a single atomic unit.
    ///
    /// Returns `AppError::Conflict` when a row with the same
    /// (url, source_id) already exists.
    async fn insert(&self, article: &NormalizedArticle) -> Result<Article>;

    /// Find a stored article by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>>;
}

/// Source registry lookups and fetch bookkeeping.
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Resolve a slug to its registry record.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Source>>;

    /// All sources currently flagged active.
    async fn active_sources(&self) -> Result<Vec<Source>>;

    /// Record the completion time of a fetch cycle for a source.
    async fn mark_fetched(&self, slug: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Read access to the category taxonomy, in load order.
#[async_trait]
pub trait CategoryProvider: Send + Sync {
    async fn all_categories(&self) -> Result<Vec<Category>>;
}
