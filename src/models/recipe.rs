//! Recipe model
//!
//! A stored recipe: title, raw ingredient lines, steps, and provenance.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::grocery::IngredientSource;

/// A recipe in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    /// Raw ingredient lines as written by the source, e.g. "1 1/2 cups flour"
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub tags: Vec<String>,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IngredientSource for Recipe {
    fn ingredient_lines(&self) -> &[String] {
        &self.ingredients
    }
}

/// Decode a JSON array column
fn json_list(row: &Row, column: &str) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| {
        let index = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
    })
}

/// Escape `%`, `_` and `\` for a LIKE pattern using `ESCAPE '\'`
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            ingredients: json_list(row, "ingredients")?,
            instructions: json_list(row, "instructions")?,
            image_url: row.get("image_url")?,
            source_url: row.get("source_url")?,
            tags: json_list(row, "tags")?,
            archived: row.get::<_, i32>("archived")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new recipe
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recipes (title, ingredients, instructions, image_url, source_url, tags)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.title.trim(),
                serde_json::to_string(&data.ingredients)?,
                serde_json::to_string(&data.instructions)?,
                data.image_url,
                data.source_url,
                serde_json::to_string(&data.tags)?,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!("Created recipe {} '{}'", id, data.title.trim());
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a recipe by ID (archived or not)
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch several recipes in the order requested; unknown IDs are skipped
    /// and repeated IDs repeat the recipe
    pub fn get_many(conn: &Connection, ids: &[i64]) -> DbResult<Vec<Self>> {
        let mut recipes = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(recipe) = Self::get_by_id(conn, id)? {
                recipes.push(recipe);
            }
        }
        Ok(recipes)
    }

    /// Page through recipes ordered by title
    pub fn list(
        conn: &Connection,
        limit: i64,
        offset: i64,
        include_archived: bool,
    ) -> DbResult<Vec<Self>> {
        let sql = if include_archived {
            "SELECT * FROM recipes ORDER BY title COLLATE NOCASE ASC, id ASC LIMIT ?1 OFFSET ?2"
        } else {
            "SELECT * FROM recipes WHERE archived = 0
             ORDER BY title COLLATE NOCASE ASC, id ASC LIMIT ?1 OFFSET ?2"
        };

        let mut stmt = conn.prepare(sql)?;
        let recipes = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Case-insensitive substring search on title
    pub fn search(conn: &Connection, query: &str, include_archived: bool) -> DbResult<Vec<Self>> {
        let sql = if include_archived {
            "SELECT * FROM recipes WHERE title LIKE ?1 ESCAPE '\\'
             ORDER BY title COLLATE NOCASE ASC, id ASC"
        } else {
            "SELECT * FROM recipes WHERE title LIKE ?1 ESCAPE '\\' AND archived = 0
             ORDER BY title COLLATE NOCASE ASC, id ASC"
        };

        let mut stmt = conn.prepare(sql)?;
        let recipes = stmt
            .query_map([like_pattern(query.trim())], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Count recipes
    pub fn count(conn: &Connection, include_archived: bool) -> DbResult<i64> {
        let sql = if include_archived {
            "SELECT COUNT(*) FROM recipes"
        } else {
            "SELECT COUNT(*) FROM recipes WHERE archived = 0"
        };
        Ok(conn.query_row(sql, [], |row| row.get(0))?)
    }

    /// Archive (soft delete) or restore a recipe. Returns None if not found.
    pub fn set_archived(conn: &Connection, id: i64, archived: bool) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            "UPDATE recipes SET archived = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![archived as i32, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        tracing::info!(
            "{} recipe {}",
            if archived { "Archived" } else { "Restored" },
            id
        );
        Self::get_by_id(conn, id)
    }

    /// Permanently delete a recipe; its meal plan entries go with it.
    /// Returns false if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        // Explicit so the cascade holds even without the foreign_keys pragma
        conn.execute("DELETE FROM meal_plan_entries WHERE recipe_id = ?1", [id])?;
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        if rows > 0 {
            tracing::info!("Deleted recipe {}", id);
        }
        Ok(rows > 0)
    }
}
