//! Larder MCP Server Implementation
//!
//! Implements the MCP server with all Larder tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::import::fetch_recipe;
use crate::models::RecipeCreate;
use crate::tools::grocery::{self, RecipeSelection};
use crate::tools::meal_plan;
use crate::tools::recipes;
use crate::tools::status::StatusTracker;

/// Larder MCP Service
#[derive(Clone)]
pub struct LarderService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<LarderService>,
}

impl LarderService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": format!("{} not found", what), "id": id }))
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportRecipeParams {
    /// Recipe page URL; the page must carry schema.org Recipe JSON-LD
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeParams {
    pub title: String,
    /// Ingredient lines as written, e.g. "1 1/2 cups flour, sifted"
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub include_archived: bool,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRecipesParams {
    /// Case-insensitive substring of the title
    pub query: String,
    #[serde(default)]
    pub include_archived: bool,
}

// ============================================================================
// Meal Plan Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddToMealPlanParams {
    pub recipe_id: i64,
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeekOffsetParams {
    /// Weeks from the current week; the window always starts on a Monday
    #[serde(default)]
    pub week_offset: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MoveMealParams {
    pub entry_id: i64,
    /// New date (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveMealParams {
    pub entry_id: i64,
}

// ============================================================================
// Grocery Parameter Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GroceryListParams {
    /// Use these recipes instead of the meal plan
    pub recipe_ids: Option<Vec<i64>>,
    /// First planned date to include (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Last planned date to include (YYYY-MM-DD)
    pub end_date: Option<String>,
}

impl GroceryListParams {
    fn selection(self) -> Result<RecipeSelection, McpError> {
        RecipeSelection::from_args(self.recipe_ids, self.start_date, self.end_date)
            .map_err(|e| McpError::invalid_params(e, None))
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckGroceryItemParams {
    /// Item name as shown on the list (case-insensitive)
    pub name: String,
    #[serde(default = "default_true")]
    pub checked: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ParseIngredientParams {
    pub line: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl LarderService {
    // --- Status ---

    #[tool(description = "Get the current status of the Larder service including build info, database status, and process information")]
    async fn larder_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for importing recipes, planning meals, and using the grocery list. Call this when starting a planning session or when unsure how the tools fit together.")]
    fn grocery_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::GROCERY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(GROCERY_INSTRUCTIONS)]))
    }

    // --- Recipes ---

    #[tool(description = "Import a recipe from a web page by reading its schema.org Recipe JSON-LD")]
    async fn import_recipe(&self, Parameters(p): Parameters<ImportRecipeParams>) -> Result<CallToolResult, McpError> {
        let url = p.url.clone();
        let scraped = tokio::task::spawn_blocking(move || fetch_recipe(&url))
            .await
            .map_err(|e| McpError::internal_error(format!("Import task failed: {}", e), None))?
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let result = recipes::save_imported_recipe(&self.database, scraped, p.tags)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add a recipe by hand")]
    fn add_recipe(&self, Parameters(p): Parameters<AddRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            title: p.title,
            ingredients: p.ingredients,
            instructions: p.instructions,
            image_url: p.image_url,
            source_url: p.source_url,
            tags: p.tags,
        };
        let result = recipes::create_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get full recipe details: ingredients, instructions, tags, and source")]
    fn get_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        match recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(recipe) => json_result(&recipe),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "List recipes alphabetically with pagination. Archived recipes are hidden unless include_archived is true.")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.limit, p.offset, p.include_archived)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search recipes by title")]
    fn search_recipes(&self, Parameters(p): Parameters<SearchRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::search_recipes(&self.database, &p.query, p.include_archived)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Archive a recipe (hide it from listings without deleting it)")]
    fn archive_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        match recipes::set_recipe_archived(&self.database, p.id, true).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "Restore an archived recipe")]
    fn restore_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        match recipes::set_recipe_archived(&self.database, p.id, false).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Recipe", p.id),
        }
    }

    #[tool(description = "Permanently delete a recipe. Also removes it from the meal plan.")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        match recipes::delete_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Recipe", p.id),
        }
    }

    // --- Meal Plan ---

    #[tool(description = "Add a recipe to the meal plan on a date (defaults to today)")]
    fn add_to_meal_plan(&self, Parameters(p): Parameters<AddToMealPlanParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::add_to_meal_plan(&self.database, p.recipe_id, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the two-week meal plan starting on Monday of the current week, shifted by week_offset weeks")]
    fn get_meal_plan(&self, Parameters(p): Parameters<WeekOffsetParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::get_meal_plan(&self.database, meal_plan::today(), p.week_offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Move a planned meal to another date")]
    fn move_meal(&self, Parameters(p): Parameters<MoveMealParams>) -> Result<CallToolResult, McpError> {
        match meal_plan::move_meal(&self.database, p.entry_id, &p.date).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Meal plan entry", p.entry_id),
        }
    }

    #[tool(description = "Remove a planned meal")]
    fn remove_meal(&self, Parameters(p): Parameters<RemoveMealParams>) -> Result<CallToolResult, McpError> {
        match meal_plan::remove_meal(&self.database, p.entry_id).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Meal plan entry", p.entry_id),
        }
    }

    #[tool(description = "Remove every planned meal in the two-week window at week_offset")]
    fn clear_meal_plan(&self, Parameters(p): Parameters<WeekOffsetParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::clear_meal_plan(&self.database, meal_plan::today(), p.week_offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Grocery List ---

    #[tool(description = "Build the grocery list: ingredients of every planned recipe (or the given recipes / date range) combined by name, with compatible units converted, sorted by name, with checked-off state")]
    fn get_grocery_list(&self, Parameters(p): Parameters<GroceryListParams>) -> Result<CallToolResult, McpError> {
        let selection = p.selection()?;
        let result = grocery::get_grocery_list(&self.database, &selection)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Check (or uncheck with checked=false) one grocery item by name")]
    fn check_grocery_item(&self, Parameters(p): Parameters<CheckGroceryItemParams>) -> Result<CallToolResult, McpError> {
        let result = grocery::check_item(&self.database, &p.name, p.checked)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Check every item on the grocery list (same recipe selection as get_grocery_list)")]
    fn check_all_grocery_items(&self, Parameters(p): Parameters<GroceryListParams>) -> Result<CallToolResult, McpError> {
        let selection = p.selection()?;
        let result = grocery::check_all(&self.database, &selection)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Uncheck every grocery item")]
    fn clear_grocery_checks(&self) -> Result<CallToolResult, McpError> {
        let result = grocery::clear_checks(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Show how one ingredient line is parsed into amount, unit, and name")]
    fn parse_ingredient(&self, Parameters(p): Parameters<ParseIngredientParams>) -> Result<CallToolResult, McpError> {
        json_result(&grocery::parse_ingredient_line(&p.line))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for LarderService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "larder".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Larder".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Larder - recipe box, two-week meal planner, and combined grocery list. \
                 IMPORTANT: Call grocery_instructions at the start of a planning session. \
                 Recipes: import_recipe (from URL), add_recipe, get/list/search_recipes, archive/restore/delete_recipe. \
                 Meal plan: add_to_meal_plan, get_meal_plan (week_offset), move_meal, remove_meal, clear_meal_plan. \
                 Grocery list: get_grocery_list, check_grocery_item, check_all_grocery_items, clear_grocery_checks. \
                 parse_ingredient shows how a single ingredient line is read."
                    .into(),
            ),
        }
    }
}
