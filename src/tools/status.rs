//! Larder Status Tool
//!
//! Provides runtime status information about the Larder service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::Recipe;

/// Grocery list instructions for AI assistants
pub const GROCERY_INSTRUCTIONS: &str = r#"
# Larder Meal Planning & Grocery List Instructions

## Overview

1. **Recipes** - imported from a web page (`import_recipe`) or entered by hand (`add_recipe`)
2. **Meal plan** - recipes placed on dates, shown two weeks at a time (Monday to Sunday, twice)
3. **Grocery list** - every planned recipe's ingredients combined into one list

---

## Importing Recipes

```
import_recipe(url: "https://example.com/best-chili", tags: ["dinner"])
```

The page must carry a schema.org Recipe in a JSON-LD block (most recipe sites do).
If it doesn't, fall back to `add_recipe` with the ingredient lines copied verbatim.

**Keep ingredient lines as written** ("1 1/2 cups flour, sifted"). The grocery list
parses them; rewriting them loses nothing but also gains nothing. One exception:
put a space between a whole number and a fraction glyph (`1 ½`, not `1½`, which
reads as 11/2).

---

## Planning Meals

```
add_to_meal_plan(recipe_id: 4, date: "2026-10-21")
get_meal_plan(week_offset: 0)     // this fortnight
get_meal_plan(week_offset: 2)     // the fortnight after
move_meal(entry_id: 12, date: "2026-10-23")
remove_meal(entry_id: 12)
clear_meal_plan(week_offset: 0)
```

`date` defaults to today. A recipe can be planned on several days.

---

## Grocery List

```
get_grocery_list()                                   // every planned recipe
get_grocery_list(start_date: "2026-10-19", end_date: "2026-10-25")
get_grocery_list(recipe_ids: [4, 7])                 // ignore the plan
```

### How lines combine

| Lines | Result |
|-------|--------|
| `1 tbsp olive oil` + `2 tsp olive oil` | `1 2/3 tbsp olive oil` |
| `1 cup flour` + `1/2 cup Flour` | `1 1/2 cup flour` |
| `2 eggs` + `1 egg` | two items (names differ) |
| `1 cup milk` + `2 oz milk` | `3 cup+oz milk` (no conversion, raw sum) |
| `salt to taste` | `salt to taste` (no amount) |

Only these conversions exist: 3 tsp = 1 tbsp, 16 tbsp = 1 cup, 1000 g = 1 kg,
1000 ml = 1 l, 16 oz = 1 lb. Items flagged `composite_unit: true` carry an
indicative amount only; tell the user to check the sources.

### Checking items off

```
check_grocery_item(name: "flour")
check_grocery_item(name: "flour", checked: false)
check_all_grocery_items()
clear_grocery_checks()
```

Checks are kept by item name, so they survive changes to the plan.

### Debugging a line

```
parse_ingredient(line: "1 ½ cups sugar")
```

---

## Quick Reference

| Task | Tool |
|------|------|
| Import from URL | `import_recipe` |
| Add by hand | `add_recipe` |
| Browse / search | `list_recipes`, `search_recipes`, `get_recipe` |
| Hide / unhide | `archive_recipe`, `restore_recipe` |
| Delete (also unplans it) | `delete_recipe` |
| Plan | `add_to_meal_plan`, `move_meal`, `remove_meal`, `clear_meal_plan` |
| View plan | `get_meal_plan` |
| Shopping | `get_grocery_list`, `check_grocery_item`, `check_all_grocery_items`, `clear_grocery_checks` |

## Notes

- Dates use ISO format: YYYY-MM-DD
- Archived recipes stay in the meal plan and on the grocery list
"#;

/// Runtime status of the Larder service
#[derive(Debug, Clone, Serialize)]
pub struct LarderStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub recipe_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, database: &Database) -> LarderStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let recipe_count = database
            .with_conn(|conn| Recipe::count(conn, true))
            .map_err(|e| tracing::warn!("Could not count recipes: {}", e))
            .ok();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        LarderStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            recipe_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
