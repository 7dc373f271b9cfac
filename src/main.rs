//! Waterlog
//!
//! An MCP server for hydration tracking.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use waterlog::mcp::WaterlogService;
use waterlog::{build_info, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr, stdout carries MCP
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("waterlog=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = db::database_path();
    eprintln!("Database path: {}", db_path.display());

    eprintln!("Initializing database...");
    let database = db::open(&db_path)?;

    let version = database.with_conn(db::migrations::get_schema_version)?;
    tracing::info!(version, path = %db_path.display(), "database ready");

    let service = WaterlogService::new(db_path, database);

    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;

    server.waiting().await?;

    Ok(())
}
