use crate::config::PipelineConfig;
use crate::error::HarvestError;
use crate::model::Recipe;
use crate::page::RecipeSource;
use crate::storage::RecipeStore;
use log::{error, info, warn};
use std::thread;
use std::time::Duration;

/// Durable snapshots written while harvesting
pub trait Checkpoint {
    /// Called with every success so far, each time another batch completes
    fn save_progress(&mut self, recipes: &[Recipe]) -> Result<(), HarvestError>;

    /// Called once at the end with every URL that failed
    fn save_failures(&mut self, urls: &[String]) -> Result<(), HarvestError>;
}

/// Checkpoint that keeps nothing
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn save_progress(&mut self, _recipes: &[Recipe]) -> Result<(), HarvestError> {
        Ok(())
    }

    fn save_failures(&mut self, _urls: &[String]) -> Result<(), HarvestError> {
        Ok(())
    }
}

/// Outcome of one harvest pass, both lists in input order
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub successes: Vec<Recipe>,
    pub failures: Vec<String>,
}

/// Outcome of writing recipes to a store
#[derive(Debug, Default)]
pub struct TransferReport {
    /// Generated ids of the stored recipes
    pub stored: Vec<i64>,
    /// Source URLs of the recipes that could not be stored
    pub failed: Vec<String>,
}

/// Runs every URL through a [`RecipeSource`], one after another.
pub struct HarvestPipeline<S, C> {
    source: S,
    checkpoint: C,
    delay: Duration,
    checkpoint_every: usize,
}

impl<S: RecipeSource, C: Checkpoint> HarvestPipeline<S, C> {
    pub fn new(source: S, checkpoint: C, config: &PipelineConfig) -> Self {
        Self {
            source,
            checkpoint,
            delay: config.recipe_delay(),
            checkpoint_every: config.checkpoint_every,
        }
    }

    pub fn checkpoint(&self) -> &C {
        &self.checkpoint
    }

    /// Extract every URL, or the first `max_count` of them.
    ///
    /// A failing URL is logged and recorded; it never stops the batch.
    pub fn harvest(&mut self, urls: &[String], max_count: Option<usize>) -> HarvestReport {
        let urls = match max_count {
            Some(max) if max < urls.len() => {
                info!("Limited to first {} recipes", max);
                &urls[..max]
            }
            _ => urls,
        };

        let mut report = HarvestReport::default();
        let total = urls.len();

        for (i, url) in urls.iter().enumerate() {
            info!("Processing recipe {}/{}: {}", i + 1, total, url);

            match self.source.extract(url) {
                Ok(recipe) => {
                    report.successes.push(recipe);
                    if self.checkpoint_every > 0
                        && report.successes.len() % self.checkpoint_every == 0
                    {
                        if let Err(e) = self.checkpoint.save_progress(&report.successes) {
                            warn!("Failed to save progress: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to process {}: {}", url, e);
                    report.failures.push(url.clone());
                }
            }

            if i + 1 < total && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        info!(
            "Completed! Successfully processed {} recipes",
            report.successes.len()
        );
        if !report.failures.is_empty() {
            warn!("Failed to process {} URLs", report.failures.len());
            if let Err(e) = self.checkpoint.save_failures(&report.failures) {
                error!("Failed to save failed URLs: {}", e);
            }
        }

        report
    }
}

/// Write each recipe to `store`, carrying on past failures.
pub fn transfer<R: RecipeStore + ?Sized>(recipes: &[Recipe], store: &R) -> TransferReport {
    let mut report = TransferReport::default();

    for recipe in recipes {
        match store.persist(recipe) {
            Ok(id) => {
                info!("Successfully transferred recipe: {} (id {})", recipe.title, id);
                report.stored.push(id);
            }
            Err(e) => {
                error!("Failed to transfer {}: {}", recipe.source_url, e);
                report.failed.push(recipe.source_url.clone());
            }
        }
    }

    info!(
        "Transferred {} recipes, {} failed",
        report.stored.len(),
        report.failed.len()
    );
    report
}
