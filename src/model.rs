use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when a page carries no recognizable headline.
pub const DEFAULT_TITLE: &str = "Recipe Title";

/// One ingredient line: amount and "unit name" description.
///
/// Serializes as a two-element array, `[2.5, "EL Olivenöl"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient(pub f64, pub String);

impl Ingredient {
    pub fn new(amount: f64, description: impl Into<String>) -> Self {
        Ingredient(amount, description.into())
    }
}

/// A recipe harvested from a single page.
///
/// Built once per successful extraction and never mutated afterwards.
/// Rendering (text, JSON, database rows) lives outside of construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    /// Preparation steps in order, without numbering
    pub instructions: Vec<String>,
    pub image_url: Option<String>,
    /// Average rating in [0, 5]
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    /// Preparation time label as shown on the page, e.g. "30 Min."
    pub time: Option<String>,
    #[serde(default)]
    pub source_url: String,
}

/// Render steps as a numbered block, starting at 1.
pub fn numbered_instructions(instructions: &[String]) -> String {
    instructions
        .iter()
        .enumerate()
        .map(|(i, instruction)| format!("{}. {}", i + 1, instruction))
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;

        if let Some(image_url) = &self.image_url {
            write!(f, "\nImage: {image_url}")?;
        }
        if let Some(rating) = self.rating {
            write!(f, "\nRating: {rating}/5")?;
        }
        if let Some(count) = self.rating_count {
            write!(f, " ({count} reviews)")?;
        }
        if let Some(time) = &self.time {
            write!(f, "\nTime: {time}")?;
        }

        let ingredients = self
            .ingredients
            .iter()
            .map(|Ingredient(amount, description)| format!("- {amount} {description}"))
            .collect::<Vec<_>>()
            .join("\n");

        write!(
            f,
            "\n\nINGREDIENTS:\n{}\n\nINSTRUCTIONS:\n{}",
            ingredients,
            numbered_instructions(&self.instructions)
        )
    }
}
