// src/pipeline/fetch.rs

//! Cross-source fetch fan-out.
//!
//! One job per active source, run concurrently up to the configured
//! limit. A source failing (including failing to construct its adapter)
//! never aborts the sibling jobs; failures land in the summary.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, Source};
use crate::pipeline::job::{FetchJob, RetryPolicy};
use crate::services::sources::{AdapterContext, FetchFilters, SourceAdapterFactory};
use crate::services::{AggregatorService, CategoryCache, CategoryMapper};
use crate::storage::{ArticleStore, CategoryProvider, SourceRegistry};
use crate::utils::http;

/// Result of one source's fetch cycle.
pub struct SourceOutcome {
    pub source_name: String,
    pub slug: String,
    pub result: Result<u64>,
}

/// Aggregate result of a fan-out run.
#[derive(Default)]
pub struct FetchSummary {
    pub outcomes: Vec<SourceOutcome>,
}

impl FetchSummary {
    /// Total newly stored articles across successful cycles.
    pub fn new_total(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    /// Number of sources whose cycle failed permanently.
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Collaborators behind the fetch pipeline.
pub struct FetchDeps {
    pub articles: Arc<dyn ArticleStore>,
    pub registry: Arc<dyn SourceRegistry>,
    pub categories: Arc<dyn CategoryProvider>,
}

/// Run fetch cycles for the active sources, optionally narrowed to one slug.
pub async fn run_fetch(
    config: &Config,
    deps: &FetchDeps,
    only_slug: Option<&str>,
) -> Result<FetchSummary> {
    let sources = select_sources(deps.registry.as_ref(), only_slug).await?;

    log::info!("Found {} active source(s)", sources.len());

    let client = http::create_async_client(&config.http)?;
    let cache = CategoryCache::new(Arc::clone(&deps.categories));
    let mapper = CategoryMapper::load(&cache).await?;

    let service = AggregatorService::new(Arc::clone(&deps.articles));
    let policy = RetryPolicy::from_config(&config.retry);
    let filters = FetchFilters::from_config(&config.fetch);

    let concurrency = config.fetch.max_concurrent.max(1);
    let outcomes: Vec<SourceOutcome> = stream::iter(sources)
        .map(|source| {
            let ctx = AdapterContext {
                registry: deps.registry.as_ref(),
                credentials: &config.providers,
                client: &client,
                mapper: mapper.clone(),
            };
            let service = &service;
            let registry = deps.registry.as_ref();
            let filters = filters.clone();
            let policy = policy.clone();

            async move {
                let result =
                    run_source_cycle(&source, ctx, filters, policy, service, registry).await;
                SourceOutcome {
                    source_name: source.name.clone(),
                    slug: source.slug.clone(),
                    result,
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let summary = FetchSummary { outcomes };
    log::info!(
        "Fetch complete: {} new article(s), {} source failure(s)",
        summary.new_total(),
        summary.failure_count()
    );
    Ok(summary)
}

/// Active sources, narrowed to one slug when requested.
async fn select_sources(
    registry: &dyn SourceRegistry,
    only_slug: Option<&str>,
) -> Result<Vec<Source>> {
    let mut sources = registry.active_sources().await?;
    if let Some(slug) = only_slug {
        sources.retain(|s| s.slug == slug);
    }
    if sources.is_empty() {
        return Err(AppError::validation("No active sources found"));
    }
    Ok(sources)
}

async fn run_source_cycle(
    source: &Source,
    ctx: AdapterContext<'_>,
    filters: FetchFilters,
    policy: RetryPolicy,
    service: &AggregatorService,
    registry: &dyn SourceRegistry,
) -> Result<u64> {
    // Construction failures (missing credentials, unknown slug) are fatal
    // for this source only.
    let adapter = match SourceAdapterFactory::make(&source.slug, &ctx).await {
        Ok(adapter) => adapter,
        Err(e) => {
            log::error!("Skipping {}: {e}", source.name);
            return Err(e);
        }
    };

    FetchJob::new(source.clone(), adapter, filters, policy)
        .run(service, registry)
        .await
}
