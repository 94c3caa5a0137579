// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Setup the SQLite pool backing the local store and create its tables

use crate::config::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Table definitions for the three record families
/// `place_id` / `owner_id` are resolved by the repositories, never supplied by callers
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS places (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        rating REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        place_id INTEGER NOT NULL REFERENCES places(id),
        search_name TEXT NOT NULL,
        name TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        rating REAL,
        review_count INTEGER NOT NULL DEFAULT 0,
        price TEXT,
        url TEXT NOT NULL,
        UNIQUE (name, search_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS photos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        search_name TEXT NOT NULL,
        origin INTEGER NOT NULL,
        title TEXT,
        farm_id TEXT NOT NULL,
        server_id TEXT NOT NULL,
        photo_id TEXT NOT NULL,
        secret TEXT NOT NULL,
        url TEXT NOT NULL,
        UNIQUE (photo_id, search_name)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reviews_search_name ON reviews (search_name)",
    "CREATE INDEX IF NOT EXISTS idx_reviews_name ON reviews (name)",
    "CREATE INDEX IF NOT EXISTS idx_photos_search_name ON photos (search_name)",
];

/// Initialize SQLite connection pool
/// DOCUMENTATION: Opens (or creates) the store file and makes sure the tables exist
/// Called once during application startup; a failure here is fatal for the process
pub async fn init_db_pool(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    log::info!("Initializing database pool: {}", config.database_url);

    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections.max(1))
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;

    log::info!("Database pool initialized successfully");
    Ok(pool)
}

/// Create tables and indexes if they are missing
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// In-memory store with a single connection (every connection to
/// `sqlite::memory:` would otherwise see its own empty database)
pub async fn init_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}
