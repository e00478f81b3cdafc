//! SQLite storage implementation

use super::schema::initialize_schema;
use super::RecipeStore;
use crate::error::HarvestError;
use crate::model::{numbered_instructions, Ingredient, Recipe};
use log::debug;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite storage backend
///
/// Holds only the database path. Each call opens its own connection and
/// closes it before returning.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Opens or creates the database at `path` and makes sure the schema exists
    pub fn new(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        let conn = store.connect()?;
        initialize_schema(&conn)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, HarvestError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }
}

impl RecipeStore for SqliteStore {
    /// All three inserts share one transaction; a failure leaves no rows behind.
    fn persist(&self, recipe: &Recipe) -> Result<i64, HarvestError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO recipes (title, image_url, rating, rating_count, preparation_time, original_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                recipe.title,
                recipe.image_url,
                recipe.rating,
                recipe.rating_count,
                recipe.time,
                recipe.source_url
            ],
        )?;
        let recipe_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO ingredients (recipe_id, ingredient_number, amount, name)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (i, Ingredient(amount, name)) in recipe.ingredients.iter().enumerate() {
                stmt.execute(params![recipe_id, i as i64 + 1, amount, name])?;
            }
        }

        tx.execute(
            "INSERT INTO instructions (recipe_id, instructions) VALUES (?1, ?2)",
            params![recipe_id, numbered_instructions(&recipe.instructions)],
        )?;

        tx.commit()?;
        debug!("Stored recipe {} as id {}", recipe.source_url, recipe_id);
        Ok(recipe_id)
    }
}
