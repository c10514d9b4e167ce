// src/services/sources/nytimes.rs

//! New York Times adapter (<https://developer.nytimes.com>).
//!
//! Top-stories endpoint, one section per call. The endpoint carries no
//! article body, so `content` is always None; images come from the
//! multimedia list with a preference for the superJumbo variant.

use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{NormalizedArticle, ProviderCredentials, Source};
use crate::services::CategoryMapper;
use crate::services::sources::{FetchFilters, present};

const BASE_URL: &str = "https://api.nytimes.com/svc";
const PREFERRED_FORMAT: &str = "superJumbo";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    results: Vec<RawStory>,
}

#[derive(Debug, Deserialize)]
struct RawStory {
    title: Option<String>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    url: Option<String>,
    byline: Option<String>,
    section: Option<String>,
    subsection: Option<String>,
    published_date: Option<String>,
    #[serde(default)]
    multimedia: Vec<RawMedia>,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    url: Option<String>,
    format: Option<String>,
}

#[derive(Debug)]
pub struct NyTimesAdapter {
    source: Source,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    mapper: CategoryMapper,
}

impl NyTimesAdapter {
    pub const NAME: &'static str = "New York Times";
    pub const SLUG: &'static str = "nytimes";

    pub fn new(
        source: Source,
        credentials: &ProviderCredentials,
        client: reqwest::Client,
        mapper: CategoryMapper,
    ) -> Result<Self> {
        let api_key = credentials
            .key()
            .ok_or_else(|| {
                AppError::config(
                    "NY Times API key is not configured. Set NYTIMES_KEY in the environment.",
                )
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
        let section = filters.section.as_deref().unwrap_or("home");
        let url = format!("{}/topstories/v2/{}.json", self.base_url, section);

        log::debug!("{} request: {url}", Self::NAME);

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("{} fetch failed: {e}", Self::NAME);
                AppError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The Times wraps errors two ways depending on the gateway.
            let detail = error_detail(&body);
            let err = AppError::transport(Self::NAME, status.as_u16(), detail);
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

        if envelope.status != "OK" {
            let err = AppError::provider(
                Self::NAME,
                format!("unexpected status \"{}\"", envelope.status),
            );
            log::error!("{err}");
            return Err(err);
        }

        Ok(envelope
            .results
            .into_iter()
            .filter_map(|raw| self.adapt(raw))
            .collect())
    }

    /// Map one raw story; stories without a link or title are dropped.
    fn adapt(&self, raw: RawStory) -> Option<NormalizedArticle> {
        let url = present(raw.url)?;
        let title = present(raw.title)?;

        let section = raw
            .section
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(raw.subsection.as_deref());
        let category_id = self.mapper.map_to_id(section);

        Some(NormalizedArticle {
            source_id: self.source.id,
            category_id,
            title,
            description: raw.summary,
            content: None, // top stories carries no body text
            author: raw.byline,
            url,
            url_to_image: pick_image(&raw.multimedia),
            published_at: raw
                .published_date
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        })
    }
}

/// Prefer the large-format variant, falling back to the first entry.
fn pick_image(multimedia: &[RawMedia]) -> Option<String> {
    multimedia
        .iter()
        .find(|m| m.format.as_deref() == Some(PREFERRED_FORMAT))
        .and_then(|m| m.url.clone())
        .or_else(|| multimedia.first().and_then(|m| m.url.clone()))
}

/// Pull a human-readable message out of an error body, if there is one.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/fault/faultstring")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("message").and_then(|v| v.as_str()))
        .map(String::from)
}
