//! Database connection module for the Open Wearables MCP server
//!
//! This module provides a pooled SQLite connection. A file-backed database is
//! used when a path is configured, otherwise an in-memory database is created
//! (used by tests and for quick local runs).

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::{error, info};

use super::migrations::run_sqlite_migrations;

/// Global database pool used by the server binary
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Default location of the SQLite database, relative to the data directory
pub const DEFAULT_SQLITE_FILE: &str = "open_wearables.db";

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based or in-memory)
    Sqlite,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Filesystem error while preparing the database location
    #[error("Failed to prepare database directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Invalid configuration value
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (only sqlite is supported)
    pub db_type: DatabaseType,
    /// Path to SQLite database file; `None` selects an in-memory database
    pub sqlite_path: Option<PathBuf>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some(PathBuf::from("data").join(DEFAULT_SQLITE_FILE)),
            max_connections: 20,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: None,
            ..Self::default()
        }
    }

    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = db_type_str.parse::<DatabaseType>()?;

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path == ":memory:" => None,
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => Self::default().sqlite_path,
        };

        let max_connections = parse_env_or("DB_MAX_CONNECTIONS", 20u32)?;
        let timeout_seconds = parse_env_or("DB_TIMEOUT_SECONDS", 30u64)?;

        match &sqlite_path {
            Some(path) => info!("Using SQLite database at: {}", path.display()),
            None => info!("Using in-memory SQLite database"),
        }
        info!(
            "Database configuration: max_connections={}, timeout={}s",
            max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }

    /// Anchor a relative SQLite path to `base` so the server does not depend
    /// on the working directory it was launched from
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        if let Some(path) = &self.sqlite_path {
            if path.is_relative() {
                self.sqlite_path = Some(base.join(path));
            }
        }
        self
    }
}

fn parse_env_or<T: FromStr>(name: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| DatabaseError::ConfigError(format!("{} must be a number, got '{}'", name, value))),
        Err(_) => Ok(default),
    }
}

/// Pooled SQLite connections
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: Arc<r2d2::Pool<SqliteConnectionManager>>,
}

impl DatabasePool {
    /// Check out a connection from the pool
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, DatabaseError> {
        Ok(self.pool.get()?)
    }

    /// Current pool state (connections, idle connections)
    pub fn state(&self) -> r2d2::State {
        self.pool.state()
    }
}

/// Create a connection pool and bring the schema up to date
pub fn create_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let pool = match &config.sqlite_path {
        Some(path) => create_file_pool(path, config)?,
        None => create_in_memory_pool(config)?,
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    Ok(pool)
}

fn create_file_pool(path: &Path, config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing SQLite database at: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|source| DatabaseError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let busy_timeout = Duration::from_secs(config.timeout_seconds);
    let manager = SqliteConnectionManager::file(path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(move |conn| init_connection(conn, busy_timeout));

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
        .map_err(|e| {
            error!("Failed to create SQLite connection pool: {}", e);
            DatabaseError::SqlitePoolError(e)
        })?;

    info!("SQLite connection pool created successfully");
    Ok(DatabasePool { pool: Arc::new(pool) })
}

/// In-memory databases live per connection, so the pool holds exactly one
/// and never recycles it
fn create_in_memory_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let busy_timeout = Duration::from_secs(config.timeout_seconds);
    let manager = SqliteConnectionManager::memory().with_init(move |conn| init_connection(conn, busy_timeout));
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    Ok(DatabasePool { pool: Arc::new(pool) })
}

/// Per-connection setup: busy timeout and the `fold_case` SQL function.
///
/// SQLite's `lower()` and `LIKE` only fold ASCII letters; `fold_case` applies
/// Unicode lowercasing so searches match the in-memory repositories.
fn init_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|value| value.to_lowercase()))
        },
    )
}

/// Initialize the process-wide database pool
pub fn initialize_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    info!("Initializing database pool with type: {:?}", config.db_type);
    let pool = create_database_pool(config)?;

    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    Ok(pool)
}

/// Get the process-wide database pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Get information about a database connection pool
pub fn get_connection_info(pool: &DatabasePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;

    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;
    let location = if path.is_empty() || path == ":memory:" {
        "SQLite in-memory database".to_string()
    } else {
        format!("SQLite database at {}", path)
    };

    let state = pool.state();
    Ok(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.db_type, DatabaseType::Sqlite);
        assert!(config.sqlite_path.is_some());
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_database_type_from_str() {
        assert_eq!("sqlite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert_eq!("SQLite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert!("postgres".parse::<DatabaseType>().is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let config = DatabaseConfig {
            sqlite_path: Some(PathBuf::from("data/db.sqlite")),
            ..DatabaseConfig::default()
        }
        .resolve_relative_to(Path::new("/srv/wearables"));
        assert_eq!(config.sqlite_path.unwrap(), PathBuf::from("/srv/wearables/data/db.sqlite"));

        let config = DatabaseConfig {
            sqlite_path: Some(PathBuf::from("/var/lib/db.sqlite")),
            ..DatabaseConfig::default()
        }
        .resolve_relative_to(Path::new("/srv/wearables"));
        assert_eq!(config.sqlite_path.unwrap(), PathBuf::from("/var/lib/db.sqlite"));
    }

    #[test]
    fn test_in_memory_pool_runs_migrations() {
        let pool = create_database_pool(&DatabaseConfig::in_memory()).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        let info = get_connection_info(&pool).unwrap();
        assert!(info.contains("in-memory"));
    }

    #[test]
    fn test_in_memory_pool_keeps_its_connection() {
        let pool = create_database_pool(&DatabaseConfig::in_memory()).unwrap();
        assert_eq!(pool.pool.max_lifetime(), None);
        assert_eq!(pool.pool.idle_timeout(), None);
        assert_eq!(pool.pool.max_size(), 1);
    }

    #[test]
    fn test_connections_fold_unicode_case() {
        let pool = create_database_pool(&DatabaseConfig::in_memory()).unwrap();
        let conn = pool.get().unwrap();
        let folded: String = conn
            .query_row("SELECT fold_case('ÉMILE Zoë')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "émile zoë");

        let folded: Option<String> = conn
            .query_row("SELECT fold_case(NULL)", [], |row| row.get(0))
            .unwrap();
        assert!(folded.is_none());
    }

    #[test]
    fn test_busy_timeout_follows_config() {
        let config = DatabaseConfig {
            timeout_seconds: 7,
            ..DatabaseConfig::in_memory()
        };
        let pool = create_database_pool(&config).unwrap();
        let timeout: i64 = pool
            .get()
            .unwrap()
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 7000);
    }

    #[test]
    fn test_file_pool_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("open_wearables_{}", uuid::Uuid::new_v4()));
        let config = DatabaseConfig {
            sqlite_path: Some(dir.join("nested").join("test.db")),
            ..DatabaseConfig::default()
        };

        let pool = create_database_pool(&config).unwrap();
        assert!(dir.join("nested").join("test.db").exists());
        assert!(get_connection_info(&pool).unwrap().contains("test.db"));

        drop(pool);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
