// src/main.rs
use anyhow::Context;
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod app;
mod auth;
mod common;
mod export;
mod folders;
mod logging_middleware;
mod notes;
mod services;

#[cfg(test)]
mod test_support;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::tokens::TokenService;
use auth::transport::{CookieTransport, HeaderTransport, TokenTransport};
use common::config::TransportKind;
use common::{AppState, Config};
use services::{
    EmailSender, GoogleOAuthService, IdentityProvider, LogEmailSender, PrintPdfRenderer,
    SesEmailSender,
};

const DB_CONNECT_ATTEMPTS: u32 = 3;
const DB_RETRY_DELAY: Duration = Duration::from_secs(5);

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        production = config.production,
        transport = ?config.transport,
        port = config.port,
        "Configuration loaded"
    );

    let tokens = TokenService::new(&config.jwt_secret, config.access_ttl, config.refresh_ttl)
        .context("invalid token configuration")?;

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let pool = connect_with_retry(&config.database_url).await?;
    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let transport: Arc<dyn TokenTransport> = match config.transport {
        TransportKind::Header => Arc::new(HeaderTransport),
        TransportKind::Cookie => Arc::new(CookieTransport::new(
            config.production,
            config.refresh_ttl.num_seconds(),
        )),
    };

    let mailer: Arc<dyn EmailSender> = match &config.email {
        Some(email_config) => {
            info!("Email delivery via AWS SES");
            Arc::new(SesEmailSender::new(email_config).await)
        }
        None if config.production => {
            anyhow::bail!("EMAIL_FROM must be set in production");
        }
        None => {
            warn!("EMAIL_FROM not set, verification codes will only be logged");
            Arc::new(LogEmailSender)
        }
    };

    let identity_provider: Option<Arc<dyn IdentityProvider>> = match &config.google {
        Some(google) => {
            info!("Google OAuth enabled");
            Some(Arc::new(GoogleOAuthService::new(google.clone())))
        }
        None => {
            warn!("Google OAuth not configured");
            None
        }
    };

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.port;
    let state = Arc::new(AppState {
        db: pool.clone(),
        config: Arc::new(config),
        tokens,
        transport,
        mailer,
        identity_provider,
        pdf: Arc::new(PrintPdfRenderer),
    });

    let app = app::build_app(state);

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Closing database pool");
    pool.close().await;
    Ok(())
}

/// Opens the pool, retrying a fixed number of times before giving up.
async fn connect_with_retry(database_url: &str) -> anyhow::Result<SqlitePool> {
    ensure_sqlite_dir(database_url).await?;

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut attempt = 1;
    loop {
        match SqlitePoolOptions::new()
            .connect_with(connect_options.clone())
            .await
        {
            Ok(pool) => {
                info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < DB_CONNECT_ATTEMPTS => {
                warn!(
                    error = %e,
                    attempt,
                    retry_in_secs = DB_RETRY_DELAY.as_secs(),
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(DB_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => {
                error!(error = %e, attempt, "Database connection failed, giving up");
                return Err(e).context("could not connect to the database");
            }
        }
    }
}

/// Creates the parent directory of a file-backed SQLite database.
async fn ensure_sqlite_dir(database_url: &str) -> anyhow::Result<()> {
    if let Some(path_part) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
