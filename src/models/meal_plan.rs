//! Meal plan model
//!
//! Recipes assigned to calendar dates, ordered within each day.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Recipe;

/// Days shown by the planner window
pub const PLAN_WINDOW_DAYS: i64 = 14;

/// A recipe placed on a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub id: i64,
    pub date: String, // ISO date: "2026-10-19"
    pub recipe_id: i64,
    pub position: i64,
    pub created_at: String,
}

/// Entry joined with its recipe title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanEntryDetail {
    pub entry_id: i64,
    pub recipe_id: i64,
    pub title: String,
    pub archived: bool,
}

/// All entries for one date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanDay {
    pub date: String,
    pub weekday: String,
    pub meals: Vec<MealPlanEntryDetail>,
}

/// The 14 dates of the planner window: Monday of `today`'s week, shifted by
/// `week_offset` weeks, through the Sunday a fortnight later
pub fn two_week_dates(today: NaiveDate, week_offset: i64) -> Vec<NaiveDate> {
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64)
        + Duration::weeks(week_offset);
    (0..PLAN_WINDOW_DAYS)
        .map(|i| monday + Duration::days(i))
        .collect()
}

/// ISO key used for a date
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl MealPlanEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            recipe_id: row.get("recipe_id")?,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    fn next_position(conn: &Connection, date: &str) -> DbResult<i64> {
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM meal_plan_entries WHERE date = ?1",
            [date],
            |row| row.get(0),
        )?;
        Ok(position)
    }

    /// Append a recipe to the end of a day
    pub fn add(conn: &Connection, recipe_id: i64, date: &str) -> DbResult<Self> {
        let position = Self::next_position(conn, date)?;
        conn.execute(
            "INSERT INTO meal_plan_entries (date, recipe_id, position) VALUES (?1, ?2, ?3)",
            params![date, recipe_id, position],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!("Planned recipe {} on {}", recipe_id, date);
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let entry = conn
            .query_row(
                "SELECT * FROM meal_plan_entries WHERE id = ?1",
                [id],
                Self::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Move an entry to the end of another day. Returns None if not found.
    pub fn move_to(conn: &mut Connection, id: i64, date: &str) -> DbResult<Option<Self>> {
        let tx = conn.transaction()?;
        if Self::get_by_id(&tx, id)?.is_none() {
            return Ok(None);
        }
        let position = Self::next_position(&tx, date)?;
        tx.execute(
            "UPDATE meal_plan_entries SET date = ?1, position = ?2 WHERE id = ?3",
            params![date, position, id],
        )?;
        tx.commit()?;

        Self::get_by_id(conn, id)
    }

    /// Remove an entry. Returns false if not found.
    pub fn remove(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meal_plan_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Remove every entry between two dates (inclusive); returns the count
    pub fn clear_range(conn: &Connection, start_date: &str, end_date: &str) -> DbResult<usize> {
        let rows = conn.execute(
            "DELETE FROM meal_plan_entries WHERE date >= ?1 AND date <= ?2",
            params![start_date, end_date],
        )?;
        tracing::info!("Cleared {} planned meals from {} to {}", rows, start_date, end_date);
        Ok(rows)
    }

    /// Entries with recipe titles, optionally limited to a date range,
    /// ordered by date then position
    pub fn list_details(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<Vec<(String, MealPlanEntryDetail)>> {
        let mut sql = String::from(
            "SELECT e.id, e.date, e.recipe_id, r.title, r.archived
             FROM meal_plan_entries e
             JOIN recipes r ON r.id = e.recipe_id
             WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND e.date >= ?{}", params_vec.len()));
        }
        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND e.date <= ?{}", params_vec.len()));
        }
        sql.push_str(" ORDER BY e.date ASC, e.position ASC, e.id ASC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, String>(1)?,
                    MealPlanEntryDetail {
                        entry_id: row.get(0)?,
                        recipe_id: row.get(2)?,
                        title: row.get(3)?,
                        archived: row.get::<_, i32>(4)? != 0,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// One [`MealPlanDay`] per date in `dates`, empty days included
    pub fn days(conn: &Connection, dates: &[NaiveDate]) -> DbResult<Vec<MealPlanDay>> {
        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            return Ok(Vec::new());
        };
        let entries = Self::list_details(conn, Some(&date_key(*first)), Some(&date_key(*last)))?;

        Ok(dates
            .iter()
            .map(|&date| {
                let key = date_key(date);
                let meals = entries
                    .iter()
                    .filter(|(d, _)| *d == key)
                    .map(|(_, detail)| detail.clone())
                    .collect();
                MealPlanDay {
                    weekday: date.format("%A").to_string(),
                    date: key,
                    meals,
                }
            })
            .collect())
    }

    /// Every planned recipe in date order, optionally limited to a date range.
    /// A recipe planned twice appears twice.
    pub fn planned_recipes(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<Vec<Recipe>> {
        let ids: Vec<i64> = Self::list_details(conn, start_date, end_date)?
            .into_iter()
            .map(|(_, detail)| detail.recipe_id)
            .collect();
        Recipe::get_many(conn, &ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::RecipeCreate;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn recipe(conn: &Connection, title: &str) -> Recipe {
        let data = RecipeCreate {
            title: title.to_string(),
            ingredients: vec![format!("1 cup {}", title.to_lowercase())],
            ..Default::default()
        };
        Recipe::create(conn, &data).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_two_week_window_starts_on_monday() {
        // 2026-10-22 is a Thursday
        let dates = two_week_dates(date("2026-10-22"), 0);
        assert_eq!(dates.len(), 14);
        assert_eq!(dates[0], date("2026-10-19"));
        assert_eq!(dates[13], date("2026-11-01"));

        let next = two_week_dates(date("2026-10-22"), 1);
        assert_eq!(next[0], date("2026-10-26"));
        let prev = two_week_dates(date("2026-10-19"), -2);
        assert_eq!(prev[0], date("2026-10-05"));
    }

    #[test]
    fn test_add_orders_within_day() {
        let conn = setup();
        let soup = recipe(&conn, "Soup");
        let salad = recipe(&conn, "Salad");

        let first = MealPlanEntry::add(&conn, soup.id, "2026-10-20").unwrap();
        let second = MealPlanEntry::add(&conn, salad.id, "2026-10-20").unwrap();
        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);

        let days = MealPlanEntry::days(&conn, &two_week_dates(date("2026-10-20"), 0)).unwrap();
        assert_eq!(days.len(), 14);
        assert_eq!(days[0].meals.len(), 0);
        assert_eq!(days[1].weekday, "Tuesday");
        let titles: Vec<&str> = days[1].meals.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Soup", "Salad"]);
    }

    #[test]
    fn test_move_and_remove() {
        let mut conn = setup();
        let soup = recipe(&conn, "Soup");
        let entry = MealPlanEntry::add(&conn, soup.id, "2026-10-20").unwrap();
        MealPlanEntry::add(&conn, soup.id, "2026-10-22").unwrap();

        let moved = MealPlanEntry::move_to(&mut conn, entry.id, "2026-10-22")
            .unwrap()
            .unwrap();
        assert_eq!(moved.date, "2026-10-22");
        assert_eq!(moved.position, 1);
        assert!(MealPlanEntry::move_to(&mut conn, 999, "2026-10-22").unwrap().is_none());

        assert!(MealPlanEntry::remove(&conn, entry.id).unwrap());
        assert!(!MealPlanEntry::remove(&conn, entry.id).unwrap());
    }

    #[test]
    fn test_clear_range_only_touches_window() {
        let conn = setup();
        let soup = recipe(&conn, "Soup");
        MealPlanEntry::add(&conn, soup.id, "2026-10-19").unwrap();
        MealPlanEntry::add(&conn, soup.id, "2026-11-01").unwrap();
        MealPlanEntry::add(&conn, soup.id, "2026-11-02").unwrap();

        let cleared = MealPlanEntry::clear_range(&conn, "2026-10-19", "2026-11-01").unwrap();
        assert_eq!(cleared, 2);
        let left = MealPlanEntry::list_details(&conn, None, None).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].0, "2026-11-02");
    }

    #[test]
    fn test_planned_recipes_follow_dates_and_deletes_cascade() {
        let conn = setup();
        let soup = recipe(&conn, "Soup");
        let bread = recipe(&conn, "Bread");
        MealPlanEntry::add(&conn, soup.id, "2026-10-21").unwrap();
        MealPlanEntry::add(&conn, bread.id, "2026-10-20").unwrap();
        MealPlanEntry::add(&conn, soup.id, "2026-10-25").unwrap();

        let planned = MealPlanEntry::planned_recipes(&conn, None, None).unwrap();
        let titles: Vec<&str> = planned.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Bread", "Soup", "Soup"]);

        let ranged =
            MealPlanEntry::planned_recipes(&conn, Some("2026-10-21"), Some("2026-10-24")).unwrap();
        assert_eq!(ranged.len(), 1);

        Recipe::delete(&conn, soup.id).unwrap();
        assert_eq!(MealPlanEntry::planned_recipes(&conn, None, None).unwrap().len(), 1);
    }
}
