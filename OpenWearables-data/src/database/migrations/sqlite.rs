use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_workouts_table(conn)?;
    create_sleep_sessions_table(conn)?;
    create_timeseries_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), String> {
    info!("Creating users table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            first_name TEXT,
            last_name TEXT,
            external_user_id TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_created_at
        ON users (created_at DESC);",
    ).map_err(|e| format!("Failed to create users table: {}", e))?;

    Ok(())
}

/// Create the workouts table and its lookup index
fn create_workouts_table(conn: &Connection) -> Result<(), String> {
    info!("Creating workouts table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS workouts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            workout_type TEXT,
            name TEXT,
            start_time TEXT NOT NULL,
            end_time TEXT,
            duration_seconds INTEGER,
            source_provider TEXT,
            source_device TEXT,
            calories_kcal REAL,
            distance_meters REAL,
            avg_heart_rate_bpm INTEGER,
            max_heart_rate_bpm INTEGER,
            elevation_gain_meters REAL
        );
        CREATE INDEX IF NOT EXISTS idx_workouts_user_start
        ON workouts (user_id, start_time DESC);",
    ).map_err(|e| format!("Failed to create workouts table: {}", e))?;

    Ok(())
}

/// Create the sleep sessions table and its lookup index
fn create_sleep_sessions_table(conn: &Connection) -> Result<(), String> {
    info!("Creating sleep_sessions table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sleep_sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            duration_seconds INTEGER,
            efficiency_percent REAL,
            is_nap INTEGER NOT NULL DEFAULT 0,
            source_provider TEXT,
            source_device TEXT,
            deep_seconds INTEGER,
            light_seconds INTEGER,
            rem_seconds INTEGER,
            awake_seconds INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_sleep_sessions_user_start
        ON sleep_sessions (user_id, start_time DESC);",
    ).map_err(|e| format!("Failed to create sleep_sessions table: {}", e))?;

    Ok(())
}

/// Create the time-series samples table and its lookup index
fn create_timeseries_table(conn: &Connection) -> Result<(), String> {
    info!("Creating timeseries_samples table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS timeseries_samples (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            series_type TEXT NOT NULL,
            value REAL NOT NULL,
            unit TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_timeseries_user_type_time
        ON timeseries_samples (user_id, series_type, timestamp);",
    ).map_err(|e| format!("Failed to create timeseries_samples table: {}", e))?;

    Ok(())
}
