//! Import a recipe from a URL into the database
//!
//! Usage: import_recipe URL [TAG...]

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("larder=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().ok_or("Usage: import_recipe URL [TAG...]")?;
    let tags: Vec<String> = args.collect();

    let (db_path, database) = larder::db::open_default()?;
    println!("Database path: {}", db_path.display());

    let scraped = larder::import::fetch_recipe(&url)?;
    println!("Found: {}", scraped.title);
    println!("  Ingredients: {}", scraped.ingredients.len());
    println!("  Steps: {}", scraped.instructions.len());

    let created = larder::tools::recipes::save_imported_recipe(&database, scraped, tags)?;
    println!("Saved as recipe {}", created.id);

    Ok(())
}
