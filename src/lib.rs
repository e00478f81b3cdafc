pub mod config;
pub mod crawler;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod storage;

pub use config::{HarvestConfig, SiteConfig};
pub use crawler::{ArchiveCrawler, CrawlState, StopReason};
pub use error::HarvestError;
pub use fetchers::{Fetcher, RequestFetcher};
pub use model::{Ingredient, Recipe};
pub use page::{PageExtractor, RecipeSource};
pub use pipeline::{Checkpoint, HarvestPipeline, HarvestReport, NoCheckpoint, TransferReport};
pub use storage::{RecipeStore, SqliteStore};

use std::time::Duration;

/// Fetch and extract a single recipe page of the default site
pub fn fetch_recipe(url: &str) -> Result<Recipe, HarvestError> {
    fetch_recipe_with_timeout(url, None)
}

/// Fetch and extract a single recipe page with a custom request timeout
pub fn fetch_recipe_with_timeout(
    url: &str,
    timeout: Option<Duration>,
) -> Result<Recipe, HarvestError> {
    let fetcher = RequestFetcher::new(timeout)?;
    PageExtractor::new(SiteConfig::default(), fetcher).extract(url)
}
