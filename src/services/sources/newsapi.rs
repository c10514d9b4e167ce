// src/services/sources/newsapi.rs

//! NewsAPI adapter (<https://newsapi.org>).
//!
//! Top-headlines endpoint. Supports language, page size, and category
//! filters; `content` is the provider's truncated body field.

use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{NormalizedArticle, ProviderCredentials, Source};
use crate::services::CategoryMapper;
use crate::services::sources::{FetchFilters, present};

const BASE_URL: &str = "https://newsapi.org/v2";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    source: Option<RawSourceRef>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    content: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSourceRef {
    category: Option<String>,
}

#[derive(Debug)]
pub struct NewsApiAdapter {
    source: Source,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    mapper: CategoryMapper,
}

impl NewsApiAdapter {
    pub const NAME: &'static str = "NewsAPI";
    pub const SLUG: &'static str = "newsapi";

    pub fn new(
        source: Source,
        credentials: &ProviderCredentials,
        client: reqwest::Client,
        mapper: CategoryMapper,
    ) -> Result<Self> {
        let api_key = credentials
            .key()
            .ok_or_else(|| {
                AppError::config("NewsAPI key is not configured. Set NEWSAPI_KEY in the environment.")
            })?
            .to_string();

        Ok(Self {
            source,
            api_key,
            base_url: BASE_URL.to_string(),
            client,
            mapper,
        })
    }

    pub async fn fetch_articles(&self, filters: &FetchFilters) -> Result<Vec<NormalizedArticle>> {
        let url = format!("{}/top-headlines", self.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("apiKey", self.api_key.clone()),
            (
                "language",
                filters.language.clone().unwrap_or_else(|| "en".into()),
            ),
            ("pageSize", filters.page_size.unwrap_or(100).to_string()),
        ];
        if let Some(category) = &filters.category {
            query.push(("category", category.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                log::error!("{} fetch failed: {e}", Self::NAME);
                AppError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = AppError::transport(Self::NAME, status.as_u16(), None);
            log::error!("{err}");
            return Err(err);
        }

        self.parse_response(&body)
    }

    fn parse_response(&self, body: &str) -> Result<Vec<NormalizedArticle>> {
        let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
            log::error!("{} response parse failed: {e}", Self::NAME);
            AppError::from(e)
        })?;

        if envelope.status != "ok" {
            let err = AppError::provider(
                Self::NAME,
                envelope.message.unwrap_or_else(|| "Unknown error".into()),
            );
            log::error!("{err}");
            return Err(err);
        }

        Ok(envelope
            .articles
            .into_iter()
            .filter_map(|raw| self.adapt(raw))
            .collect())
    }

    /// Map one raw item; items without a link or title are dropped.
    fn adapt(&self, raw: RawArticle) -> Option<NormalizedArticle> {
        let url = present(raw.url)?;
        let title = present(raw.title)?;

        // Prefer the category on the article's source entry; the top-level
        // field is a fallback when that one maps to nothing.
        let source_category = raw.source.as_ref().and_then(|s| s.category.as_deref());
        let category_id = self
            .mapper
            .map_to_id(source_category)
            .or_else(|| self.mapper.map_to_id(raw.category.as_deref()));

        Some(NormalizedArticle {
            source_id: self.source.id,
            category_id,
            title,
            description: raw.description,
            content: raw.content,
            author: raw.author,
            url,
            url_to_image: raw.url_to_image,
            published_at: raw
                .published_at
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        })
    }
}
