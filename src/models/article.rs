//! Article data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An article in the normalized schema every adapter maps into.
///
/// Transient: built per fetch call, consumed by the aggregator, then
/// discarded. The persisted row is [`Article`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedArticle {
    /// Id of the source this article was fetched from
    pub source_id: i64,

    /// Internal category id, if the source label mapped to one
    pub category_id: Option<i64>,

    /// Article headline ("Untitled" when the source omits it)
    pub title: String,

    /// Short summary or teaser text
    pub description: Option<String>,

    /// Body text (availability differs per provider)
    pub content: Option<String>,

    /// Byline
    pub author: Option<String>,

    /// Canonical external link. Sole dedup key; never empty.
    pub url: String,

    /// Lead image URL
    pub url_to_image: Option<String>,

    /// Publication timestamp as reported by the provider (RFC 3339),
    /// or the fetch time when the provider omits it
    pub published_at: String,
}

/// A stored article row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub source_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Build a stored row from a normalized article with an assigned id.
    pub fn from_normalized(id: i64, article: &NormalizedArticle) -> Self {
        Self {
            id,
            source_id: article.source_id,
            category_id: article.category_id,
            title: article.title.clone(),
            description: article.description.clone(),
            content: article.content.clone(),
            author: article.author.clone(),
            url: article.url.clone(),
            url_to_image: article.url_to_image.clone(),
            published_at: article.published_at.clone(),
            created_at: Utc::now(),
        }
    }
}
