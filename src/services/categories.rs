// src/services/categories.rs

//! Category taxonomy mapping.
//!
//! External providers each ship their own section/category labels. The
//! mapper folds those onto the internal taxonomy: a static lookup table
//! first, then a fuzzy substring fallback over the cached category slugs.
//! Absence of a mapping is a normal `None`, never an error.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::models::Category;
use crate::storage::CategoryProvider;

/// How long a loaded category set stays fresh.
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// External label (normalized: lowercase, `_`/`-` as spaces) to internal
/// slug. `None` marks labels that are deliberately left uncategorized.
///
/// Many-to-one; exact matches are never ambiguous.
static MAPPINGS: &[(&str, Option<&str>)] = &[
    ("business", Some("business")),
    ("technology", Some("technology")),
    ("tech", Some("technology")),
    ("entertainment", Some("entertainment")),
    ("health", Some("health")),
    ("science", Some("science")),
    ("sports", Some("sports")),
    ("sport", Some("sports")),
    ("politics", Some("politics")),
    ("world", Some("world")),
    ("world news", Some("world")),
    ("us news", Some("world")),
    ("uk news", Some("world")),
    ("international", Some("world")),
    ("environment", Some("environment")),
    ("education", Some("education")),
    ("general", None),
    // Guardian sections
    ("film", Some("entertainment")),
    ("music", Some("entertainment")),
    ("books", Some("entertainment")),
    ("stage", Some("entertainment")),
    ("artanddesign", Some("entertainment")),
    ("tv and radio", Some("entertainment")),
    ("games", Some("entertainment")),
    ("money", Some("business")),
    ("football", Some("sports")),
    ("lifeandstyle", Some("health")),
    ("society", Some("world")),
    ("media", Some("technology")),
    ("culture", Some("entertainment")),
    // NY Times sections
    ("arts", Some("entertainment")),
    ("automobiles", Some("technology")),
    ("nyregion", Some("world")),
    ("opinion", Some("politics")),
    ("realestate", Some("business")),
    ("sundayreview", Some("politics")),
    ("magazine", Some("entertainment")),
    ("fashion", Some("entertainment")),
    ("food", Some("health")),
    ("travel", Some("entertainment")),
    ("movies", Some("entertainment")),
    ("theater", Some("entertainment")),
    ("insider", Some("business")),
    ("t magazine", Some("entertainment")),
    ("upshot", Some("politics")),
];

/// An immutable snapshot of the category taxonomy.
///
/// Keeps the provider's load order, which is the iteration order for
/// fuzzy matching.
#[derive(Debug)]
pub struct CategorySet {
    categories: Vec<Category>,
    by_slug: HashMap<String, i64>,
}

impl CategorySet {
    pub fn new(categories: Vec<Category>) -> Self {
        let by_slug = categories
            .iter()
            .map(|c| (c.slug.clone(), c.id))
            .collect();
        Self {
            categories,
            by_slug,
        }
    }

    /// Resolve an internal slug to its id.
    pub fn id_of(&self, slug: &str) -> Option<i64> {
        self.by_slug.get(slug).copied()
    }

    /// Categories in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

struct CachedEntry {
    loaded_at: Instant,
    set: Arc<CategorySet>,
}

/// TTL cache over a [`CategoryProvider`].
///
/// Readers always get a complete snapshot; invalidation may race with
/// reads, in which case a reader sees either the stale set or the
/// freshly reloaded one, never a partial map.
pub struct CategoryCache {
    provider: Arc<dyn CategoryProvider>,
    ttl: Duration,
    inner: RwLock<Option<CachedEntry>>,
}

impl CategoryCache {
    pub fn new(provider: Arc<dyn CategoryProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_TTL)
    }

    /// Cache with a custom TTL, so tests can control staleness.
    pub fn with_ttl(provider: Arc<dyn CategoryProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Current category set, loading through the provider when the cached
    /// entry is missing or expired.
    pub async fn snapshot(&self) -> Result<Arc<CategorySet>> {
        {
            let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = guard.as_ref() {
                if entry.loaded_at.elapsed() < self.ttl {
                    return Ok(Arc::clone(&entry.set));
                }
            }
        }

        let categories = self.provider.all_categories().await?;
        let set = Arc::new(CategorySet::new(categories));

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(CachedEntry {
            loaded_at: Instant::now(),
            set: Arc::clone(&set),
        });
        Ok(set)
    }

    /// Drop the cached set; the next `snapshot` reloads.
    pub fn invalidate(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

/// Maps external category labels to internal category ids.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    categories: Arc<CategorySet>,
}

impl CategoryMapper {
    /// Build a mapper over the cache's current snapshot.
    pub async fn load(cache: &CategoryCache) -> Result<Self> {
        Ok(Self {
            categories: cache.snapshot().await?,
        })
    }

    /// Build a mapper directly over a category set.
    pub fn from_set(categories: Arc<CategorySet>) -> Self {
        Self { categories }
    }

    /// Map an external label to an internal category id.
    ///
    /// Returns None for empty labels, labels explicitly mapped to
    /// "uncategorized", and labels matching nothing. Never fails.
    pub fn map_to_id(&self, external: Option<&str>) -> Option<i64> {
        let raw = external?.trim();
        if raw.is_empty() {
            return None;
        }

        let normalized = normalize(raw);

        if let Some((_, mapped)) = MAPPINGS.iter().find(|(label, _)| *label == normalized) {
            // An exact hit is final: a None target or an unknown slug both
            // mean uncategorized, with no fuzzy fallback.
            return mapped.and_then(|slug| self.categories.id_of(slug));
        }

        self.fuzzy_match(&normalized)
    }

    /// First category (load order) whose slug occurs in the label, either
    /// as-is or with the label's spaces stripped.
    fn fuzzy_match(&self, normalized: &str) -> Option<i64> {
        let squeezed: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();

        for category in self.categories.iter() {
            let slug = category.slug.as_str();
            if normalized.contains(slug) || squeezed.contains(slug) {
                return Some(category.id);
            }
        }
        None
    }
}

fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['_', '-'], " ")
        .trim()
        .to_string()
}
