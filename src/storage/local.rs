//! Local filesystem store.
//!
//! JSON files under a root directory, written atomically (temp file +
//! rename). A fresh root is seeded with the default source registry and
//! category taxonomy. An internal mutex serializes mutations so the
//! check-then-insert inside [`LocalStore::insert`] behaves like a
//! store-level uniqueness constraint within the process.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Article, Category, NormalizedArticle, Source};
use crate::storage::{ArticleStore, CategoryProvider, SourceRegistry};

const ARTICLES_FILE: &str = "articles.json";
const SOURCES_FILE: &str = "sources.json";
const CATEGORIES_FILE: &str = "categories.json";

/// Local filesystem storage backend.
pub struct LocalStore {
    root_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Open a store rooted at the given directory, seeding the source and
    /// category tables when absent.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            root_dir: root_dir.into(),
            write_lock: Mutex::new(()),
        };

        tokio::fs::create_dir_all(&store.root_dir).await?;

        if store.read_json::<Vec<Source>>(SOURCES_FILE).await?.is_none() {
            store.write_json(SOURCES_FILE, &Source::defaults()).await?;
            log::info!("Seeded default source registry");
        }
        if store
            .read_json::<Vec<Category>>(CATEGORIES_FILE)
            .await?
            .is_none()
        {
            store
                .write_json(CATEGORIES_FILE, &Category::defaults())
                .await?;
            log::info!("Seeded default category taxonomy");
        }

        Ok(store)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn load_articles(&self) -> Result<Vec<Article>> {
        Ok(self.read_json(ARTICLES_FILE).await?.unwrap_or_default())
    }

    async fn load_sources(&self) -> Result<Vec<Source>> {
        Ok(self.read_json(SOURCES_FILE).await?.unwrap_or_default())
    }

    /// Number of stored articles.
    pub async fn article_count(&self) -> Result<usize> {
        Ok(self.load_articles().await?.len())
    }
}

#[async_trait]
impl ArticleStore for LocalStore {
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let articles = self.load_articles().await?;
        Ok(articles.into_iter().find(|a| a.url == url))
    }

    async fn insert(&self, article: &NormalizedArticle) -> Result<Article> {
        let _guard = self.write_lock.lock().await;

        let mut articles = self.load_articles().await?;
        if articles
            .iter()
            .any(|a| a.url == article.url && a.source_id == article.source_id)
        {
            return Err(AppError::Conflict {
                url: article.url.clone(),
            });
        }

        let next_id = articles.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let stored = Article::from_normalized(next_id, article);
        articles.push(stored.clone());
        self.write_json(ARTICLES_FILE, &articles).await?;

        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Article>> {
        let articles = self.load_articles().await?;
        Ok(articles.into_iter().find(|a| a.id == id))
    }
}

#[async_trait]
impl SourceRegistry for LocalStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Source>> {
        let sources = self.load_sources().await?;
        Ok(sources.into_iter().find(|s| s.slug == slug))
    }

    async fn active_sources(&self) -> Result<Vec<Source>> {
        let sources = self.load_sources().await?;
        Ok(sources.into_iter().filter(|s| s.is_active).collect())
    }

    async fn mark_fetched(&self, slug: &str, at: DateTime<Utc>) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut sources = self.load_sources().await?;
        let Some(source) = sources.iter_mut().find(|s| s.slug == slug) else {
            return Err(AppError::validation(format!(
                "Unknown source slug: {slug}"
            )));
        };
        source.last_fetched_at = Some(at);
        self.write_json(SOURCES_FILE, &sources).await
    }
}

#[async_trait]
impl CategoryProvider for LocalStore {
    async fn all_categories(&self) -> Result<Vec<Category>> {
        Ok(self.read_json(CATEGORIES_FILE).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_article(url: &str, source_id: i64) -> NormalizedArticle {
        NormalizedArticle {
            source_id,
            category_id: None,
            title: "Title".to_string(),
            description: None,
            content: None,
            author: None,
            url: url.to_string(),
            url_to_image: None,
            published_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn open_seeds_sources_and_categories() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        let sources = store.active_sources().await.unwrap();
        assert_eq!(sources.len(), 3);

        let categories = store.all_categories().await.unwrap();
        assert_eq!(categories.len(), 10);
    }

    #[tokio::test]
    async fn open_preserves_existing_data() {
        let tmp = TempDir::new().unwrap();
        {
            let store = LocalStore::open(tmp.path()).await.unwrap();
            store
                .mark_fetched("newsapi", Utc::now())
                .await
                .unwrap();
        }

        // Re-open must not reset the registry to the seeds.
        let store = LocalStore::open(tmp.path()).await.unwrap();
        let source = store.find_by_slug("newsapi").await.unwrap().unwrap();
        assert!(source.last_fetched_at.is_some());
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_finds_back() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        let first = store
            .insert(&make_article("https://example.com/a", 1))
            .await
            .unwrap();
        let second = store
            .insert(&make_article("https://example.com/b", 1))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let found = store
            .find_by_url("https://example.com/a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);

        let by_id = store.find_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(by_id.url, "https://example.com/b");

        assert!(store.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_duplicate_url_is_conflict() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        let article = make_article("https://example.com/dup", 1);
        store.insert(&article).await.unwrap();

        let err = store.insert(&article).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { url } if url == "https://example.com/dup"));
    }

    #[tokio::test]
    async fn same_url_different_source_is_allowed() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        store
            .insert(&make_article("https://example.com/shared", 1))
            .await
            .unwrap();
        store
            .insert(&make_article("https://example.com/shared", 2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn mark_fetched_unknown_slug_fails() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        assert!(store.mark_fetched("bbc", Utc::now()).await.is_err());
    }
}
