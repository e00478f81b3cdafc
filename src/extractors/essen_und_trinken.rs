//! Extractor for recipe pages of essen-und-trinken.de
//!
//! Every field is read by its own function. A missing element only
//! empties that field, the rest of the recipe is still extracted.

use super::{element_text, select_first, selector, Extractor, ParsingContext};
use crate::error::HarvestError;
use crate::model::{Ingredient, Recipe, DEFAULT_TITLE};
use log::debug;
use scraper::{ElementRef, Html};
use url::Url;

const IMAGE_CONTAINER: &str = "div.recipe-meta__image";
const IMAGE: &str = "img.image";
// Matched against the whole class attribute, not single classes
const TITLE: &str = r#"span[class="title__headline u-typo u-typo--article-title"]"#;
const INGREDIENTS_SECTION: &str = "section.recipe-ingredients";
const INGREDIENT_AMOUNT: &str = "x-beautify-number.recipe-ingredients__amount";
const INGREDIENT_LABEL: &str = "p.recipe-ingredients__label";
const UNIT_SINGULAR: &str = "span.recipe-ingredients__unit-singular";
const UNIT_PLURAL: &str = "span.recipe-ingredients__unit-plural";
const INGREDIENT_NAME: &str = r#"span[data-label=""]"#;
const PREPARATION_STEPS: &str = "div.group--preparation-steps";
const STEP_ITEM: &str = "li.group__text-element";
const STEP_TEXT: &str = "div.text-element";
const RATING_CONTAINER: &str = "div.recipe-rating";
const RATING_VALUE: &str = "x-rating";
const RATING_COUNT: &str = "span.recipe-rating__count";
const COOK_TIME: &str = r#"div[class="recipe-meta__item recipe-meta__item--cook-time"]"#;
const COOK_TIME_LABEL: &str = "span.u-typo.u-typo--recipe-info-text";

pub struct EssenUndTrinkenExtractor;

impl Extractor for EssenUndTrinkenExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<Recipe, HarvestError> {
        debug!("Attempting to extract recipe using essen-und-trinken extractor");
        let document = &context.document;

        if !has_recipe_structure(document) {
            return Err(HarvestError::NoRecipeFound(context.url.clone()));
        }

        let title = extract_title(document).unwrap_or_else(|| {
            debug!("No headline found, using placeholder title");
            DEFAULT_TITLE.to_string()
        });
        let image_url = extract_image(document).map(|src| absolute_url(&context.url, &src));
        let ingredients = extract_ingredients(document);
        let instructions = extract_instructions(document);
        let (rating, rating_count) = extract_rating(document);
        let time = extract_time(document);

        debug!("Recipe name: {}", title);
        debug!("Ingredients count: {}", ingredients.len());
        debug!("Instructions count: {}", instructions.len());

        Ok(Recipe {
            title,
            ingredients,
            instructions,
            image_url,
            rating,
            rating_count,
            time,
            source_url: context.url.clone(),
        })
    }
}

fn find<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    document.select(&selector).next()
}

/// A page without headline, ingredients and steps is not a recipe page.
fn has_recipe_structure(document: &Html) -> bool {
    [TITLE, INGREDIENTS_SECTION, PREPARATION_STEPS]
        .iter()
        .any(|css| find(document, css).is_some())
}

fn absolute_url(page_url: &str, src: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(String::from)
        .unwrap_or_else(|_| src.to_string())
}

/// Main recipe image, preferring the widest `srcset` candidate over `src`.
pub fn extract_image(document: &Html) -> Option<String> {
    let container = find(document, IMAGE_CONTAINER)?;
    let image = select_first(container, IMAGE)?;

    image
        .value()
        .attr("srcset")
        .and_then(best_srcset_candidate)
        .or_else(|| {
            image
                .value()
                .attr("src")
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(String::from)
        })
}

/// URL with the largest `NNNw` descriptor in a `srcset` value.
///
/// Candidates without a positive width descriptor are skipped. On equal
/// widths the first candidate wins.
pub fn best_srcset_candidate(srcset: &str) -> Option<String> {
    let mut best: Option<(u32, &str)> = None;

    for candidate in srcset.split(',') {
        let mut parts = candidate.split_whitespace();
        let (Some(url), Some(descriptor)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some(width) = descriptor
            .strip_suffix('w')
            .and_then(|width| width.parse::<u32>().ok())
            .filter(|width| *width > 0)
        else {
            continue;
        };

        if best.map_or(true, |(best_width, _)| width > best_width) {
            best = Some((width, url));
        }
    }

    best.map(|(_, url)| url.to_string())
}

pub fn extract_title(document: &Html) -> Option<String> {
    find(document, TITLE)
        .map(element_text)
        .filter(|title| !title.is_empty())
}

/// Ingredient lines, pairing amount and label elements by position.
///
/// Surplus amount or label elements are dropped.
pub fn extract_ingredients(document: &Html) -> Vec<Ingredient> {
    let Some(section) = find(document, INGREDIENTS_SECTION) else {
        return Vec::new();
    };
    let (Some(amounts), Some(labels)) = (selector(INGREDIENT_AMOUNT), selector(INGREDIENT_LABEL))
    else {
        return Vec::new();
    };

    section
        .select(&amounts)
        .zip(section.select(&labels))
        .map(|(amount, label)| {
            let amount = parse_amount(amount.value().attr("value").unwrap_or_default());
            let name = select_first(label, INGREDIENT_NAME)
                .map(element_text)
                .unwrap_or_default();
            let description = match ingredient_unit(label) {
                Some(unit) => format!("{unit} {name}").trim().to_string(),
                None => name,
            };
            Ingredient(amount, description)
        })
        .collect()
}

/// Singular unit if it has text, otherwise the plural unit.
fn ingredient_unit(label: ElementRef) -> Option<String> {
    [UNIT_SINGULAR, UNIT_PLURAL]
        .iter()
        .filter_map(|css| select_first(label, css))
        .map(element_text)
        .find(|unit| !unit.is_empty())
}

/// Amount with either `.` or `,` as decimal separator.
///
/// Anything that is not a finite, non-negative number becomes 0.0.
pub fn parse_amount(raw: &str) -> f64 {
    let value = raw.trim();
    if value.is_empty() {
        return 0.0;
    }

    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .unwrap_or(0.0)
}

/// Preparation steps in document order, skipping empty ones.
pub fn extract_instructions(document: &Html) -> Vec<String> {
    let Some(section) = find(document, PREPARATION_STEPS) else {
        return Vec::new();
    };
    let Some(items) = selector(STEP_ITEM) else {
        return Vec::new();
    };

    section
        .select(&items)
        .filter_map(|item| select_first(item, STEP_TEXT))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Average rating and number of ratings, each independently optional.
pub fn extract_rating(document: &Html) -> (Option<f64>, Option<u32>) {
    let Some(container) = find(document, RATING_CONTAINER) else {
        return (None, None);
    };

    let rating = select_first(container, RATING_VALUE)
        .and_then(|element| element.value().attr("value"))
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|rating| (0.0..=5.0).contains(rating));

    let rating_count = select_first(container, RATING_COUNT)
        .and_then(|element| parse_rating_count(&element_text(element)));

    (rating, rating_count)
}

/// Count shown as `"(77)"`. Text without the parentheses is rejected.
pub fn parse_rating_count(text: &str) -> Option<u32> {
    text.trim()
        .strip_prefix('(')?
        .strip_suffix(')')?
        .trim()
        .parse()
        .ok()
}

pub fn extract_time(document: &Html) -> Option<String> {
    let container = find(document, COOK_TIME)?;
    select_first(container, COOK_TIME_LABEL)
        .map(element_text)
        .filter(|time| !time.is_empty())
}
