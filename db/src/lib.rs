pub mod models;
pub mod repository;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;
use util::config;

/// Connects using `DATABASE_PATH`, which may be a full DSN or a plain SQLite file path.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    connect_to(&config::database_path()).await
}

pub async fn connect_to(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    let url = database_url(path_or_url);
    tracing::debug!(url = %url, "Connecting to database");
    Database::connect(&url).await
}

/// Turns a file path into a SQLite DSN, creating its parent directory.
/// Anything that already looks like a DSN is returned untouched.
fn database_url(path_or_url: &str) -> String {
    if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        return path_or_url.to_string();
    }

    // SQLite won't create intermediate dirs.
    if let Some(parent) = Path::new(path_or_url).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(
                error = %e,
                dir = %parent.display(),
                "Could not create database directory"
            );
        }
    }
    format!("sqlite://{path_or_url}?mode=rwc")
}
