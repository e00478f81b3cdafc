use crate::config::SiteConfig;
use crate::error::HarvestError;
use crate::extractors::{EssenUndTrinkenExtractor, Extractor, ParsingContext};
use crate::fetchers::Fetcher;
use crate::model::Recipe;
use log::debug;

/// Anything that turns a recipe URL into a [`Recipe`].
pub trait RecipeSource {
    fn extract(&self, url: &str) -> Result<Recipe, HarvestError>;
}

impl<T: RecipeSource + ?Sized> RecipeSource for &T {
    fn extract(&self, url: &str) -> Result<Recipe, HarvestError> {
        (**self).extract(url)
    }
}

/// Fetches one recipe page and extracts it.
pub struct PageExtractor<F> {
    site: SiteConfig,
    fetcher: F,
    extractor: EssenUndTrinkenExtractor,
}

impl<F: Fetcher> PageExtractor<F> {
    pub fn new(site: SiteConfig, fetcher: F) -> Self {
        Self {
            site,
            fetcher,
            extractor: EssenUndTrinkenExtractor,
        }
    }

    /// Reject URLs outside the site's recipe section before any request.
    pub fn validate(&self, url: &str) -> Result<(), HarvestError> {
        let prefix = self.site.recipe_prefix();
        if url.starts_with(&prefix) {
            Ok(())
        } else {
            Err(HarvestError::InvalidSourceError {
                url: url.to_string(),
                prefix,
            })
        }
    }
}

impl<F: Fetcher> RecipeSource for PageExtractor<F> {
    fn extract(&self, url: &str) -> Result<Recipe, HarvestError> {
        self.validate(url)?;

        let html = self.fetcher.fetch(url)?;
        let context = ParsingContext::new(url, &html);
        let recipe = self.extractor.parse(&context)?;

        debug!("{:#?}", recipe);
        Ok(recipe)
    }
}
