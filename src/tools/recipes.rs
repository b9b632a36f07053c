//! Recipe MCP Tools
//!
//! Tools for adding, importing, browsing, archiving, and deleting recipes.

use serde::Serialize;

use crate::db::Database;
use crate::import::ScrapedRecipe;
use crate::models::{Recipe, RecipeCreate};

/// Response for add_recipe / import_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub title: String,
    pub ingredient_count: usize,
    pub source_url: Option<String>,
    pub created_at: String,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub ingredient_count: usize,
    pub tags: Vec<String>,
    pub archived: bool,
    pub source_url: Option<String>,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            ingredient_count: recipe.ingredients.len(),
            title: recipe.title,
            tags: recipe.tags,
            archived: recipe.archived,
            source_url: recipe.source_url,
        }
    }
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for search_recipes
#[derive(Debug, Serialize)]
pub struct SearchRecipesResponse {
    pub query: String,
    pub recipes: Vec<RecipeSummary>,
    pub count: usize,
}

/// Response for archive_recipe / restore_recipe
#[derive(Debug, Serialize)]
pub struct ArchiveRecipeResponse {
    pub id: i64,
    pub title: String,
    pub archived: bool,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Create a recipe from hand-entered data
pub fn create_recipe(db: &Database, data: RecipeCreate) -> Result<CreateRecipeResponse, String> {
    if data.title.trim().is_empty() {
        return Err("Recipe title cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    Ok(CreateRecipeResponse {
        id: recipe.id,
        ingredient_count: recipe.ingredients.len(),
        title: recipe.title,
        source_url: recipe.source_url,
        created_at: recipe.created_at,
    })
}

/// Store a recipe extracted from a web page
pub fn save_imported_recipe(
    db: &Database,
    scraped: ScrapedRecipe,
    tags: Vec<String>,
) -> Result<CreateRecipeResponse, String> {
    create_recipe(db, scraped.into_create(tags))
}

/// Get a recipe with all its fields
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<Recipe>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Recipe::get_by_id(&conn, id).map_err(|e| format!("Failed to get recipe: {}", e))
}

/// Page through recipes ordered by title
pub fn list_recipes(
    db: &Database,
    limit: i64,
    offset: i64,
    include_archived: bool,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn, limit, offset, include_archived)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;
    let total = Recipe::count(&conn, include_archived)
        .map_err(|e| format!("Failed to count recipes: {}", e))?;

    Ok(ListRecipesResponse {
        recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Search recipes by title
pub fn search_recipes(
    db: &Database,
    query: &str,
    include_archived: bool,
) -> Result<SearchRecipesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::search(&conn, query, include_archived)
        .map_err(|e| format!("Failed to search recipes: {}", e))?;

    Ok(SearchRecipesResponse {
        query: query.to_string(),
        count: recipes.len(),
        recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
    })
}

/// Archive or restore a recipe
pub fn set_recipe_archived(
    db: &Database,
    id: i64,
    archived: bool,
) -> Result<Option<ArchiveRecipeResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::set_archived(&conn, id, archived)
        .map_err(|e| format!("Failed to update recipe: {}", e))?;

    Ok(recipe.map(|r| ArchiveRecipeResponse {
        id: r.id,
        title: r.title,
        archived: r.archived,
    }))
}

/// Permanently delete a recipe and its meal plan entries
pub fn delete_recipe(db: &Database, id: i64) -> Result<Option<DeleteRecipeResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete(&conn, id)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;

    Ok(deleted.then_some(DeleteRecipeResponse {
        success: true,
        deleted_id: id,
    }))
}
