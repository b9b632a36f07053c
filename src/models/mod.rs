//! Data models
//!
//! Rust structs representing database entities.

mod grocery_check;
mod meal_plan;
mod recipe;

pub use grocery_check::GroceryCheck;
pub use meal_plan::{
    date_key, two_week_dates, MealPlanDay, MealPlanEntry, MealPlanEntryDetail, PLAN_WINDOW_DAYS,
};
pub use recipe::{Recipe, RecipeCreate};
