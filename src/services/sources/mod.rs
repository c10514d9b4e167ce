// src/services/sources/mod.rs

//! Source adapters for the supported news providers.
//!
//! Each adapter translates one provider's API and schema into the internal
//! [`NormalizedArticle`] shape. The set of providers is closed: adding one
//! means adding a variant, not registering a trait object.

mod guardian;
mod newsapi;
mod nytimes;

pub use guardian::GuardianAdapter;
pub use newsapi::NewsApiAdapter;
pub use nytimes::NyTimesAdapter;

use crate::error::{AppError, Result};
use crate::models::{FetchConfig, NormalizedArticle, ProvidersConfig};
use crate::services::CategoryMapper;
use crate::storage::SourceRegistry;

/// Slugs the factory accepts.
pub const SUPPORTED_SLUGS: [&str; 3] = ["newsapi", "guardian", "nytimes"];

/// Per-cycle fetch parameters. Each adapter applies only the fields its
/// provider supports.
#[derive(Debug, Clone, Default)]
pub struct FetchFilters {
    /// Article language (NewsAPI)
    pub language: Option<String>,

    /// Page size override (NewsAPI, Guardian)
    pub page_size: Option<u32>,

    /// Category filter (NewsAPI)
    pub category: Option<String>,

    /// Top-stories section (NY Times)
    pub section: Option<String>,
}

impl FetchFilters {
    pub fn from_config(fetch: &FetchConfig) -> Self {
        Self {
            language: Some(fetch.language.clone()),
            page_size: fetch.page_size,
            category: fetch.category.clone(),
            section: Some(fetch.section.clone()),
        }
    }
}

/// One concrete adapter per provider.
#[derive(Debug)]
pub enum SourceAdapter {
    NewsApi(NewsApiAdapter),
    Guardian(GuardianAdapter),
    NyTimes(NyTimesAdapter),
}

impl SourceAdapter {
    /// Fetch and normalize the provider's current articles.
    pub async fn fetch_articles(&self, filters: &FetchFilters) -> Result<Vec<NormalizedArticle>> {
        match self {
            Self::NewsApi(adapter) => adapter.fetch_articles(filters).await,
            Self::Guardian(adapter) => adapter.fetch_articles(filters).await,
            Self::NyTimes(adapter) => adapter.fetch_articles(filters).await,
        }
    }

    /// Display name of the provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewsApi(_) => NewsApiAdapter::NAME,
            Self::Guardian(_) => GuardianAdapter::NAME,
            Self::NyTimes(_) => NyTimesAdapter::NAME,
        }
    }

    /// Stable identifier of the provider.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::NewsApi(_) => NewsApiAdapter::SLUG,
            Self::Guardian(_) => GuardianAdapter::SLUG,
            Self::NyTimes(_) => NyTimesAdapter::SLUG,
        }
    }
}

/// Everything an adapter needs at construction.
pub struct AdapterContext<'a> {
    pub registry: &'a dyn SourceRegistry,
    pub credentials: &'a ProvidersConfig,
    pub client: &'a reqwest::Client,
    pub mapper: CategoryMapper,
}

/// Resolves slugs to adapter instances.
pub struct SourceAdapterFactory;

impl SourceAdapterFactory {
    /// Build the adapter for a slug.
    ///
    /// Unknown slugs fail with `UnsupportedSource`; known slugs missing
    /// their registry record or credentials fail with a Config error
    /// before any fetch is attempted.
    pub async fn make(slug: &str, ctx: &AdapterContext<'_>) -> Result<SourceAdapter> {
        if !SUPPORTED_SLUGS.contains(&slug) {
            return Err(AppError::UnsupportedSource {
                slug: slug.to_string(),
            });
        }

        let source = ctx.registry.find_by_slug(slug).await?.ok_or_else(|| {
            AppError::config(format!("Source '{slug}' is not registered in the store"))
        })?;

        let adapter = match slug {
            NewsApiAdapter::SLUG => SourceAdapter::NewsApi(NewsApiAdapter::new(
                source,
                &ctx.credentials.newsapi,
                ctx.client.clone(),
                ctx.mapper.clone(),
            )?),
            GuardianAdapter::SLUG => SourceAdapter::Guardian(GuardianAdapter::new(
                source,
                &ctx.credentials.guardian,
                ctx.client.clone(),
                ctx.mapper.clone(),
            )?),
            NyTimesAdapter::SLUG => SourceAdapter::NyTimes(NyTimesAdapter::new(
                source,
                &ctx.credentials.nytimes,
                ctx.client.clone(),
                ctx.mapper.clone(),
            )?),
            _ => unreachable!("slug checked against SUPPORTED_SLUGS"),
        };

        Ok(adapter)
    }

    /// The fixed list of supported slugs, for discovery.
    pub fn supported_slugs() -> &'static [&'static str] {
        &SUPPORTED_SLUGS
    }
}

/// Presence filter for raw payload fields: blank counts as missing.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
