//! Larder Tools module
//!
//! MCP tool implementations for recipes, the meal plan, and the grocery list.

pub mod grocery;
pub mod meal_plan;
pub mod recipes;
pub mod status;

/// Pooled in-memory database shared by every connection in the pool
#[cfg(test)]
pub(crate) fn test_database(name: &str) -> crate::db::Database {
    let uri = format!("file:larder_{}?mode=memory&cache=shared", name);
    let database = crate::db::Database::new(uri).unwrap();
    database
        .with_conn(crate::db::migrations::run_migrations)
        .unwrap();
    database
}
