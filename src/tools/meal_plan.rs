//! Meal Plan MCP Tools
//!
//! Tools for placing recipes on dates and reading the two-week planner.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::models::{date_key, two_week_dates, MealPlanDay, MealPlanEntry, Recipe};

/// Response for add_to_meal_plan / move_meal
#[derive(Debug, Serialize)]
pub struct PlannedMealResponse {
    pub entry_id: i64,
    pub recipe_id: i64,
    pub title: String,
    pub date: String,
    pub position: i64,
}

/// Response for get_meal_plan
#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub week_offset: i64,
    pub start_date: String,
    pub end_date: String,
    pub meal_count: usize,
    pub days: Vec<MealPlanDay>,
}

/// Response for remove_meal
#[derive(Debug, Serialize)]
pub struct RemoveMealResponse {
    pub success: bool,
    pub removed_id: i64,
}

/// Response for clear_meal_plan
#[derive(Debug, Serialize)]
pub struct ClearMealPlanResponse {
    pub start_date: String,
    pub end_date: String,
    pub removed: usize,
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an ISO date (YYYY-MM-DD)
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD format.", s))
}

/// First and last date of the planner window `week_offset` weeks from now
pub fn window_bounds(today: NaiveDate, week_offset: i64) -> (String, String) {
    let dates = two_week_dates(today, week_offset);
    // two_week_dates always yields a full window
    let first = dates.first().copied().unwrap_or(today);
    let last = dates.last().copied().unwrap_or(today);
    (date_key(first), date_key(last))
}

/// Add a recipe to a date (today if none given)
pub fn add_to_meal_plan(
    db: &Database,
    recipe_id: i64,
    date: Option<&str>,
) -> Result<PlannedMealResponse, String> {
    let date = match date {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let date = date_key(date);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found: {}", recipe_id))?;

    let entry = MealPlanEntry::add(&conn, recipe.id, &date)
        .map_err(|e| format!("Failed to add to meal plan: {}", e))?;

    Ok(PlannedMealResponse {
        entry_id: entry.id,
        recipe_id: recipe.id,
        title: recipe.title,
        date: entry.date,
        position: entry.position,
    })
}

/// The two-week planner window, every day included
pub fn get_meal_plan(
    db: &Database,
    today: NaiveDate,
    week_offset: i64,
) -> Result<MealPlanResponse, String> {
    let dates = two_week_dates(today, week_offset);
    let (start_date, end_date) = window_bounds(today, week_offset);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let days = MealPlanEntry::days(&conn, &dates)
        .map_err(|e| format!("Failed to load meal plan: {}", e))?;

    Ok(MealPlanResponse {
        week_offset,
        start_date,
        end_date,
        meal_count: days.iter().map(|d| d.meals.len()).sum(),
        days,
    })
}

/// Move a planned meal to another date
pub fn move_meal(
    db: &Database,
    entry_id: i64,
    date: &str,
) -> Result<Option<PlannedMealResponse>, String> {
    let date = date_key(parse_date(date)?);

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(entry) = MealPlanEntry::move_to(&mut conn, entry_id, &date)
        .map_err(|e| format!("Failed to move meal: {}", e))?
    else {
        return Ok(None);
    };

    let title = Recipe::get_by_id(&conn, entry.recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .map(|r| r.title)
        .unwrap_or_default();

    Ok(Some(PlannedMealResponse {
        entry_id: entry.id,
        recipe_id: entry.recipe_id,
        title,
        date: entry.date,
        position: entry.position,
    }))
}

/// Remove a planned meal
pub fn remove_meal(db: &Database, entry_id: i64) -> Result<Option<RemoveMealResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = MealPlanEntry::remove(&conn, entry_id)
        .map_err(|e| format!("Failed to remove meal: {}", e))?;

    Ok(removed.then_some(RemoveMealResponse {
        success: true,
        removed_id: entry_id,
    }))
}

/// Remove every meal in the planner window `week_offset` weeks from now
pub fn clear_meal_plan(
    db: &Database,
    today: NaiveDate,
    week_offset: i64,
) -> Result<ClearMealPlanResponse, String> {
    let (start_date, end_date) = window_bounds(today, week_offset);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let removed = MealPlanEntry::clear_range(&conn, &start_date, &end_date)
        .map_err(|e| format!("Failed to clear meal plan: {}", e))?;

    Ok(ClearMealPlanResponse {
        start_date,
        end_date,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeCreate;
    use crate::tools::recipes::create_recipe;
    use crate::tools::test_database;

    fn recipe(db: &Database, title: &str) -> i64 {
        let data = RecipeCreate {
            title: title.to_string(),
            ingredients: vec!["1 cup rice".to_string()],
            ..Default::default()
        };
        create_recipe(db, data).unwrap().id
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2026-10-19 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
        assert!(parse_date("10/19/2026").unwrap_err().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_window_bounds() {
        let thursday = NaiveDate::from_ymd_opt(2026, 10, 22).unwrap();
        assert_eq!(
            window_bounds(thursday, 0),
            ("2026-10-19".to_string(), "2026-11-01".to_string())
        );
        assert_eq!(window_bounds(thursday, -1).0, "2026-10-12");
    }

    #[test]
    fn test_plan_move_remove_clear() {
        let db = test_database("meal_plan_flow");
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let curry = recipe(&db, "Curry");

        let added = add_to_meal_plan(&db, curry, Some("2026-10-20")).unwrap();
        assert_eq!(added.title, "Curry");
        assert_eq!(added.date, "2026-10-20");
        assert!(add_to_meal_plan(&db, 999, Some("2026-10-20")).is_err());
        assert!(add_to_meal_plan(&db, curry, Some("tomorrow")).is_err());

        let plan = get_meal_plan(&db, today, 0).unwrap();
        assert_eq!(plan.days.len(), 14);
        assert_eq!(plan.meal_count, 1);
        assert_eq!(plan.days[1].meals[0].title, "Curry");

        let moved = move_meal(&db, added.entry_id, "2026-10-30").unwrap().unwrap();
        assert_eq!(moved.date, "2026-10-30");
        assert!(move_meal(&db, 999, "2026-10-30").unwrap().is_none());

        let second = add_to_meal_plan(&db, curry, Some("2026-11-05")).unwrap();
        assert!(remove_meal(&db, second.entry_id).unwrap().is_some());
        assert!(remove_meal(&db, second.entry_id).unwrap().is_none());

        add_to_meal_plan(&db, curry, Some("2026-11-05")).unwrap();
        let cleared = clear_meal_plan(&db, today, 0).unwrap();
        assert_eq!(cleared.removed, 1);
        assert_eq!(get_meal_plan(&db, today, 2).unwrap().meal_count, 1);
    }
}
