// src/services/aggregator.rs

//! Fetch-cycle orchestration: fetch, dedup by URL, persist.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::NormalizedArticle;
use crate::services::sources::{FetchFilters, SourceAdapter};
use crate::storage::ArticleStore;

/// Runs one fetch cycle for a source adapter.
///
/// Performs no retries itself: a call either fully succeeds with a count
/// of newly stored articles or fails with the adapter's error. Retry is
/// the job layer's decision.
pub struct AggregatorService {
    store: Arc<dyn ArticleStore>,
}

impl AggregatorService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Fetch from the adapter and store what is new.
    pub async fn fetch_from(
        &self,
        adapter: &SourceAdapter,
        filters: &FetchFilters,
    ) -> Result<u64> {
        log::info!("Starting fetch from {}", adapter.name());

        let articles = match adapter.fetch_articles(filters).await {
            Ok(articles) => articles,
            Err(e) => {
                log::error!("Failed to fetch from {}: {e}", adapter.name());
                return Err(e);
            }
        };

        self.ingest(&articles, adapter.name()).await
    }

    /// Deduplicate a batch against the store and persist the new articles,
    /// in batch order. Returns the count of newly stored articles.
    pub async fn ingest(&self, articles: &[NormalizedArticle], source_name: &str) -> Result<u64> {
        if articles.is_empty() {
            log::info!("No articles fetched from {source_name}");
            return Ok(0);
        }

        let mut new_count: u64 = 0;
        for article in articles {
            if self.store.find_by_url(&article.url).await?.is_some() {
                continue;
            }

            match self.store.insert(article).await {
                Ok(_) => new_count += 1,
                // A concurrent cycle won the insert race; the article
                // exists, which is all the dedup loop wanted.
                Err(AppError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Fetched {new_count} new articles from {source_name} (Total: {})",
            articles.len()
        );
        Ok(new_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use crate::storage::LocalStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn make_article(url: &str) -> NormalizedArticle {
        NormalizedArticle {
            source_id: 1,
            category_id: None,
            title: format!("Article at {url}"),
            description: None,
            content: None,
            author: None,
            url: url.to_string(),
            url_to_image: None,
            published_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    async fn service_over_tempdir(tmp: &TempDir) -> AggregatorService {
        let store = LocalStore::open(tmp.path()).await.unwrap();
        AggregatorService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn empty_batch_stores_nothing() {
        let tmp = TempDir::new().unwrap();
        let service = service_over_tempdir(&tmp).await;
        assert_eq!(service.ingest(&[], "Test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn repeated_batch_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let service = service_over_tempdir(&tmp).await;

        let batch = vec![
            make_article("https://example.com/1"),
            make_article("https://example.com/2"),
            make_article("https://example.com/3"),
        ];

        assert_eq!(service.ingest(&batch, "Test").await.unwrap(), 3);
        assert_eq!(service.ingest(&batch, "Test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_url_within_batch_stores_once() {
        let tmp = TempDir::new().unwrap();
        let service = service_over_tempdir(&tmp).await;

        // Sequential loop: the first copy's insert commits before the
        // second copy's lookup, so the duplicate is caught by find_by_url,
        // not by the store constraint.
        let batch = vec![
            make_article("https://example.com/dup"),
            make_article("https://example.com/dup"),
        ];

        assert_eq!(service.ingest(&batch, "Test").await.unwrap(), 1);
    }

    /// A store whose lookup never sees the article but whose insert
    /// reports a uniqueness conflict, simulating a concurrent cycle
    /// winning the check-then-insert race.
    struct RacingStore;

    #[async_trait]
    impl ArticleStore for RacingStore {
        async fn find_by_url(&self, _url: &str) -> crate::error::Result<Option<Article>> {
            Ok(None)
        }

        async fn insert(&self, article: &NormalizedArticle) -> crate::error::Result<Article> {
            Err(AppError::Conflict {
                url: article.url.clone(),
            })
        }

        async fn find_by_id(&self, _id: i64) -> crate::error::Result<Option<Article>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn insert_conflict_counts_as_existing() {
        let service = AggregatorService::new(Arc::new(RacingStore));
        let batch = vec![make_article("https://example.com/raced")];

        // The conflict is a skip, not a failure, and not a new article.
        assert_eq!(service.ingest(&batch, "Test").await.unwrap(), 0);
    }
}
