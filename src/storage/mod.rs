//! Relational storage for harvested recipes
//!
//! A recipe becomes one `recipes` row, one `ingredients` row per ingredient
//! and one `instructions` row holding the numbered steps.

mod schema;
mod sqlite;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStore;

use crate::error::HarvestError;
use crate::model::Recipe;

/// Destination for finished recipes
pub trait RecipeStore {
    /// Store the recipe and return its generated id
    fn persist(&self, recipe: &Recipe) -> Result<i64, HarvestError>;
}
