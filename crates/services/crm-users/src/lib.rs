//! CRM Users Library
//!
//! Multi-tenant user management over HTTP. Every read and write is scoped to
//! the tenant resolved from the `X-Tenant-ID` header.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use common::{AppError, AppResult, ServiceConfig};

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::routes::create_router;
use crate::state::AppState;

/// Run the HTTP server, overriding the configured bind address.
///
/// With `in_memory` the service runs without a database; data is lost on exit.
pub async fn run_server(
    host: &str,
    port: u16,
    in_memory: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = UserServiceConfig::from_env();
    config.server.host = host.to_string();
    config.server.port = port;

    run_server_with_config(config, in_memory).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Socket address the server listens on.
fn bind_addr(server: &ServiceConfig) -> AppResult<SocketAddr> {
    let addr = server.addr();
    addr.parse()
        .map_err(|e| AppError::internal(format!("invalid bind address {}: {}", addr, e)))
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(
    config: UserServiceConfig,
    in_memory: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = if in_memory {
        warn!("Running on the in-memory store, data will not be persisted");
        AppState::in_memory()
    } else {
        let db = Database::connect(&config.database).await?;
        AppState::from_database(Arc::new(db))
    };

    // Build router
    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let app = create_router(state, timeout);

    let addr = bind_addr(&config.server)?;
    info!(service = %config.server.service_name, "Listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
