// src/services/sources/guardian.rs

//! Guardian Content API adapter (<https://open-platform.theguardian.com>).
//!
//! Search endpoint ordered by newest. The show-fields parameter pulls the
//! trail text, full body, byline, and thumbnail into the response.

use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{NormalizedArticle, ProviderCredentials, Source};
use crate::services::CategoryMapper;
use crate::services::sources::{FetchFilters, present};

const BASE_URL: &str = "https://content.guardianapis.com";
const SHOW_FIELDS: &str = "trailText,body,byline,thumbnail";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Inner,
}

#[derive(Debug, Deserialize)]
struct Inner {
    status: String,
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    web_title: Option<String>,
    web_url: Option<String>,
    web_publication_date: Option<String>,
    section_id: Option<String>,
    section_name: Option<String>,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFields {
    trail_text: Option<String>,
    body: Option<String>,
    byline: Option<String>,
    thumbnail: Option<String>,
}

#[derive(Debug)]
pub struct GuardianAdapter {
    source: Source,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    mapper: CategoryMapper,
}

impl GuardianAdapter {
    pub const NAME: &'static str = "The Guardian";
    pub const SLUG: &'static str = "guardian";

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
                    "Guardian API key is not configured. Set GUARDIAN_KEY in the environment.",
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
        let url = format!("{}/search", self.base_url);

        let query: Vec<(&str, String)> = vec![
            ("api-key", self.api_key.clone()),
            ("page-size", filters.page_size.unwrap_or(50).to_string()),
            ("show-fields", SHOW_FIELDS.to_string()),
            ("order-by", "newest".to_string()),
        ];

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

        if envelope.response.status != "ok" {
            let err = AppError::provider(
                Self::NAME,
                format!("unexpected status \"{}\"", envelope.response.status),
            );
            log::error!("{err}");
            return Err(err);
        }

        Ok(envelope
            .response
            .results
            .into_iter()
            .filter_map(|raw| self.adapt(raw))
            .collect())
    }

    /// Map one raw item; items without a link or title are dropped.
    fn adapt(&self, raw: RawResult) -> Option<NormalizedArticle> {
        let url = present(raw.web_url)?;
        let title = present(raw.web_title)?;

        // The section id is the more specific label; the display name is
        // only consulted when the id is absent.
        let section = raw
            .section_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(raw.section_name.as_deref());
        let category_id = self.mapper.map_to_id(section);

        Some(NormalizedArticle {
            source_id: self.source.id,
            category_id,
            title,
            description: raw.fields.trail_text,
            content: raw.fields.body,
            author: raw.fields.byline,
            url,
            url_to_image: raw.fields.thumbnail,
            published_at: raw
                .web_publication_date
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::services::CategorySet;
    use std::sync::Arc;

    fn adapter() -> GuardianAdapter {
        let source = Source {
            id: 2,
            name: GuardianAdapter::NAME.into(),
            slug: GuardianAdapter::SLUG.into(),
            api_endpoint: None,
            is_active: true,
            last_fetched_at: None,
        };
        let credentials = ProviderCredentials {
            key: Some("k".into()),
            secret: None,
        };
        let mapper = CategoryMapper::from_set(Arc::new(CategorySet::new(Category::defaults())));
        GuardianAdapter::new(source, &credentials, reqwest::Client::new(), mapper).unwrap()
    }

    #[test]
    fn construction_requires_key() {
        let source = Source {
            id: 2,
            name: GuardianAdapter::NAME.into(),
            slug: GuardianAdapter::SLUG.into(),
            api_endpoint: None,
            is_active: true,
            last_fetched_at: None,
        };
        let mapper = CategoryMapper::from_set(Arc::new(CategorySet::new(Category::defaults())));
        let result = GuardianAdapter::new(
            source,
            &ProviderCredentials::default(),
            reqwest::Client::new(),
            mapper,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn parse_maps_show_fields() {
        let body = r#"{
            "response": {
                "status": "ok",
                "total": 2,
                "results": [
                    {
                        "webTitle": "Body politics",
                        "webUrl": "https://www.theguardian.com/politics/2026/aug/01/body",
                        "webPublicationDate": "2026-08-01T08:30:00Z",
                        "sectionId": "politics",
                        "sectionName": "Politics",
                        "fields": {
                            "trailText": "A teaser",
                            "body": "<p>Full body text</p>",
                            "byline": "Staff Reporter",
                            "thumbnail": "https://media.guim.co.uk/thumb.jpg"
                        }
                    },
                    {"webTitle": "No link item"}
                ]
            }
        }"#;

        let articles = adapter().parse_response(body).unwrap();
        assert_eq!(articles.len(), 1);

        let article = &articles[0];
        assert_eq!(article.source_id, 2);
        assert_eq!(article.description.as_deref(), Some("A teaser"));
        assert_eq!(article.content.as_deref(), Some("<p>Full body text</p>"));
        assert_eq!(article.author.as_deref(), Some("Staff Reporter"));
        assert_eq!(
            article.url_to_image.as_deref(),
            Some("https://media.guim.co.uk/thumb.jpg")
        );
        // "politics" is category id 7 in the default taxonomy.
        assert_eq!(article.category_id, Some(7));
    }

    #[test]
    fn parse_uses_section_name_when_id_missing() {
        let body = r#"{
            "response": {
                "status": "ok",
                "results": [{
                    "webTitle": "Match report",
                    "webUrl": "https://www.theguardian.com/football/1",
                    "sectionName": "Football"
                }]
            }
        }"#;

        let articles = adapter().parse_response(body).unwrap();
        assert_eq!(articles[0].category_id, Some(6));
    }

    #[test]
    fn parse_guardian_sections_map_onto_taxonomy() {
        let body = r#"{
            "response": {
                "status": "ok",
                "results": [
                    {"webTitle": "A", "webUrl": "https://g.example/a", "sectionId": "uk-news"},
                    {"webTitle": "B", "webUrl": "https://g.example/b", "sectionId": "film"},
                    {"webTitle": "C", "webUrl": "https://g.example/c", "sectionId": "crosswords"}
                ]
            }
        }"#;

        let articles = adapter().parse_response(body).unwrap();
        assert_eq!(articles[0].category_id, Some(8)); // world
        assert_eq!(articles[1].category_id, Some(3)); // entertainment
        assert_eq!(articles[2].category_id, None);
    }

    #[test]
    fn error_envelope_is_provider_error() {
        let body = r#"{"response": {"status": "error", "message": "invalid api key"}}"#;

        let err = adapter().parse_response(body).unwrap_err();
        assert!(matches!(err, AppError::Provider { .. }));
    }
}
