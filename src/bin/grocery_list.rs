//! Print the grocery list for the meal plan
//!
//! Usage: grocery_list [START_DATE END_DATE]

use larder::tools::grocery::{get_grocery_list, RecipeSelection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let selection = match args.as_slice() {
        [] => RecipeSelection::WholePlan,
        [start, end] => RecipeSelection::from_args(None, Some(start.clone()), Some(end.clone()))?,
        _ => return Err("Usage: grocery_list [START_DATE END_DATE]".into()),
    };

    let (db_path, database) = larder::db::open_default()?;
    println!("Database path: {}", db_path.display());

    let list = get_grocery_list(&database, &selection)?;

    if list.recipes.is_empty() {
        println!("No recipes planned.");
        return Ok(());
    }

    println!("Recipes: {}", list.recipes.join(", "));
    println!();
    for item in &list.items {
        let mark = if item.checked { "x" } else { " " };
        println!("[{}] {}", mark, item.label);
    }
    println!();
    println!("{}", list.progress);

    Ok(())
}
