//! roster-web - Volunteer-assignment tracker service
//!
//! Serves the JSON API for the roster: people and tasks with their role
//! assignments, partner recommendations, and bulk snapshot replace.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use roster_common::{auth, config, db};
use roster_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "roster-web", about = "Volunteer-assignment tracker service")]
struct Args {
    /// Root folder holding the database (overrides ROSTER_ROOT and config)
    #[arg(long)]
    root: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5780)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber before anything that can log
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting roster-web v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = config::resolve_root_folder(args.root.as_deref());
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match db::init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    // Bootstrap the login password hash on first run
    auth::init_auth_password(&pool).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("roster-web listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
