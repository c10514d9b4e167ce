//! News source registry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered news provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    /// Registry id, stamped onto every article fetched from this source
    pub id: i64,

    /// Display name (e.g., "The Guardian")
    pub name: String,

    /// Stable identifier used by the factory and CLI
    pub slug: String,

    /// Provider API root, informational
    pub api_endpoint: Option<String>,

    /// Inactive sources are skipped by the fetch pipeline
    pub is_active: bool,

    /// Set by the job layer after each completed fetch cycle
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Source {
    /// The three providers seeded into a fresh store.
    pub fn defaults() -> Vec<Source> {
        let entries = [
            ("NewsAPI", "newsapi", "https://newsapi.org/v2"),
            ("The Guardian", "guardian", "https://content.guardianapis.com"),
            ("New York Times", "nytimes", "https://api.nytimes.com/svc"),
        ];

        entries
            .iter()
            .enumerate()
            .map(|(i, (name, slug, endpoint))| Source {
                id: i as i64 + 1,
                name: name.to_string(),
                slug: slug.to_string(),
                api_endpoint: Some(endpoint.to_string()),
                is_active: true,
                last_fetched_at: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_supported_slugs() {
        let sources = Source::defaults();
        let slugs: Vec<&str> = sources.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newsapi", "guardian", "nytimes"]);
        assert!(sources.iter().all(|s| s.is_active));
        assert!(sources.iter().all(|s| s.last_fetched_at.is_none()));
    }
}
