//! Larder
//!
//! An MCP server for recipes, meal planning, and grocery lists.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use larder::build_info;
use larder::db;
use larder::mcp::LarderService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("larder=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let (db_path, database) = db::open_default()?;
    eprintln!("Database path: {}", db_path.display());

    let version = database.with_conn(db::migrations::get_schema_version)?;
    eprintln!("Database schema version: {}", version);

    let service = LarderService::new(db_path, database);

    // Create stdio transport
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
