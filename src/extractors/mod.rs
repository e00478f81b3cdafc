use crate::error::HarvestError;
use crate::model::Recipe;
use scraper::{ElementRef, Html, Selector};

mod essen_und_trinken;

pub use essen_und_trinken::{
    best_srcset_candidate, extract_image, extract_ingredients, extract_instructions,
    extract_rating, extract_time, extract_title, parse_amount, parse_rating_count,
    EssenUndTrinkenExtractor,
};

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }
}

pub trait Extractor {
    fn parse(&self, context: &ParsingContext) -> Result<Recipe, HarvestError>;
}

/// Parse a selector that is known at compile time.
///
/// Returns `None` instead of panicking so callers can chain with `?`.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// First descendant of `root` matching `css`.
pub(crate) fn select_first<'a>(root: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    root.select(&selector).next()
}

/// All text below `element`, trimmed.
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
