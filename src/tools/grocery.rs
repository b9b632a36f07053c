//! Grocery List MCP Tools
//!
//! Builds the combined shopping list from planned (or chosen) recipes and
//! tracks which items have been checked off.

use std::collections::HashSet;

use serde::Serialize;

use crate::db::Database;
use crate::grocery::{combine_ingredients, format_quantity, parse_ingredient, AggregatedItem};
use crate::models::{GroceryCheck, MealPlanEntry, Recipe};

use super::meal_plan::parse_date;

/// One row of the grocery list
#[derive(Debug, Serialize)]
pub struct GroceryListItem {
    pub key: String,
    pub name: String,
    pub qty: f64,
    pub unit: String,
    pub display_amount: String,
    pub label: String,
    pub composite_unit: bool,
    pub checked: bool,
    pub sources: Vec<String>,
}

impl GroceryListItem {
    fn new(item: AggregatedItem, checked: &HashSet<String>) -> Self {
        let key = item.key();
        Self {
            checked: checked.contains(&key),
            display_amount: item.display_amount(),
            label: item.label(),
            composite_unit: item.is_composite(),
            key,
            name: item.name,
            qty: item.qty,
            unit: item.unit,
            sources: item.sources,
        }
    }
}

/// Response for get_grocery_list
#[derive(Debug, Serialize)]
pub struct GroceryListResponse {
    pub recipes: Vec<String>,
    pub items: Vec<GroceryListItem>,
    pub checked_count: usize,
    pub total_count: usize,
    /// e.g. "3 / 12 items checked"
    pub progress: String,
}

/// Response for check_grocery_item
#[derive(Debug, Serialize)]
pub struct CheckItemResponse {
    pub key: String,
    pub checked: bool,
}

/// Response for check_all_grocery_items / clear_grocery_checks
#[derive(Debug, Serialize)]
pub struct BulkCheckResponse {
    pub updated: usize,
    pub checked: bool,
}

/// Response for parse_ingredient
#[derive(Debug, Serialize)]
pub struct ParsedIngredientResponse {
    pub line: String,
    pub amount: f64,
    pub unit: String,
    pub name: String,
    pub display_amount: String,
    /// No leading quantity was found; the whole line is the name
    pub unquantified: bool,
}

/// Which recipes feed the grocery list
#[derive(Debug, Clone, Default)]
pub enum RecipeSelection {
    /// Every recipe in the meal plan, all dates
    #[default]
    WholePlan,
    /// Meal plan entries between two ISO dates (inclusive); either end may be open
    DateRange {
        start: Option<String>,
        end: Option<String>,
    },
    /// Explicit recipe ids, in order
    Recipes(Vec<i64>),
}

impl RecipeSelection {
    /// Selection from optional tool arguments; explicit ids win over dates
    pub fn from_args(
        recipe_ids: Option<Vec<i64>>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<Self, String> {
        if let Some(ids) = recipe_ids {
            return Ok(Self::Recipes(ids));
        }
        if start_date.is_none() && end_date.is_none() {
            return Ok(Self::WholePlan);
        }
        for date in start_date.iter().chain(end_date.iter()) {
            parse_date(date)?;
        }
        Ok(Self::DateRange {
            start: start_date,
            end: end_date,
        })
    }

    fn load(&self, conn: &rusqlite::Connection) -> Result<Vec<Recipe>, String> {
        let recipes = match self {
            Self::WholePlan => MealPlanEntry::planned_recipes(conn, None, None),
            Self::DateRange { start, end } => {
                MealPlanEntry::planned_recipes(conn, start.as_deref(), end.as_deref())
            }
            Self::Recipes(ids) => Recipe::get_many(conn, ids),
        };
        recipes.map_err(|e| format!("Failed to load recipes: {}", e))
    }
}

/// Aggregate the selected recipes' ingredients and attach checklist state
pub fn get_grocery_list(
    db: &Database,
    selection: &RecipeSelection,
) -> Result<GroceryListResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = selection.load(&conn)?;
    let checked = GroceryCheck::checked_keys(&conn)
        .map_err(|e| format!("Failed to load checklist: {}", e))?;

    let items: Vec<GroceryListItem> = combine_ingredients(&recipes)
        .into_iter()
        .map(|item| GroceryListItem::new(item, &checked))
        .collect();

    let checked_count = items.iter().filter(|i| i.checked).count();
    let total_count = items.len();

    Ok(GroceryListResponse {
        recipes: recipes.into_iter().map(|r| r.title).collect(),
        items,
        checked_count,
        total_count,
        progress: format!("{} / {} items checked", checked_count, total_count),
    })
}

/// Check or uncheck one item by name
pub fn check_item(db: &Database, name: &str, checked: bool) -> Result<CheckItemResponse, String> {
    if name.trim().is_empty() {
        return Err("Item name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let key = GroceryCheck::set(&conn, name, checked)
        .map_err(|e| format!("Failed to update checklist: {}", e))?;

    Ok(CheckItemResponse { key, checked })
}

/// Check every item currently on the list
pub fn check_all(db: &Database, selection: &RecipeSelection) -> Result<BulkCheckResponse, String> {
    let list = get_grocery_list(db, selection)?;
    let names: Vec<&str> = list.items.iter().map(|i| i.name.as_str()).collect();

    let updated = db
        .with_conn_mut(|conn| GroceryCheck::check_all(conn, &names))
        .map_err(|e| format!("Failed to update checklist: {}", e))?;

    Ok(BulkCheckResponse {
        updated,
        checked: true,
    })
}

/// Uncheck everything
pub fn clear_checks(db: &Database) -> Result<BulkCheckResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let updated = GroceryCheck::clear(&conn)
        .map_err(|e| format!("Failed to clear checklist: {}", e))?;

    Ok(BulkCheckResponse {
        updated,
        checked: false,
    })
}

/// Show how a single ingredient line is read
pub fn parse_ingredient_line(line: &str) -> ParsedIngredientResponse {
    let parsed = parse_ingredient(line);
    ParsedIngredientResponse {
        line: line.to_string(),
        display_amount: format_quantity(parsed.amount),
        unquantified: parsed.is_unquantified(),
        amount: parsed.amount,
        unit: parsed.unit,
        name: parsed.name,
    }
}
