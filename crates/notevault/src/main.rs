//! notevault - Secure notes service with stateless bearer-token auth

use anyhow::Result;
use clap::Parser;
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::Config;
use notevault_api::{create_router, AppState};
use notevault_auth::{hash_password, JwtCodec};
use notevault_db::{Database, NewUser, Role};

/// notevault - Secure notes service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "NOTEVAULT_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "NOTEVAULT_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting notevault v{}", env!("CARGO_PKG_VERSION"));

    // Create data directories
    if let Some(parent) = std::path::Path::new(&config.database.path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    // Provision baseline accounts before the gate can be exercised
    if config.auth.seed_accounts {
        ensure_seed_accounts(&db).await?;
    }

    // Token codec; a too-short secret is a startup failure, not a request-time one
    let codec = Arc::new(JwtCodec::new(
        &config.auth.jwt_secret,
        config.auth.token_lifetime_ms,
    )?);

    // Route access policy
    let policy = Arc::new(config.auth.access_policy()?);

    // Create application state
    let state = AppState::new(db, codec, policy);

    // Create router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Ensure the baseline role-bearing accounts exist
///
/// Runs before the server accepts requests: one ordinary account and one
/// administrative account, fully enabled with a one-year expiry horizon.
/// Existing accounts are left untouched.
async fn ensure_seed_accounts(db: &Database) -> Result<()> {
    if db.get_user_by_username("user1").await?.is_none() {
        let password_hash = hash_password("password1")?;
        db.insert_user(NewUser::active(
            "user1",
            "user1@example.com",
            password_hash,
            BTreeSet::from([Role::User]),
        ))
        .await?;
        info!("Seeded baseline account: user1 (ROLE_USER)");
    }

    if db.get_user_by_username("admin").await?.is_none() {
        let password_hash = hash_password("adminPass")?;
        db.insert_user(NewUser::active(
            "admin",
            "admin@example.com",
            password_hash,
            BTreeSet::from([Role::Admin]),
        ))
        .await?;
        info!("Seeded baseline account: admin (ROLE_ADMIN)");
    }

    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
