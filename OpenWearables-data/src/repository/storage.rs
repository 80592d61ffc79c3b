use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::event_record::{EventRecordFilter, SleepSession, Workout};
use crate::models::timeseries::{TimeSeriesFilter, TimeSeriesSample};
use crate::models::user::User;
use super::errors::RepositoryError;

const USER_COLUMNS: &str = "id, email, first_name, last_name, external_user_id, created_at";

const WORKOUT_COLUMNS: &str = "id, user_id, workout_type, name, start_time, end_time, duration_seconds,
     source_provider, source_device, calories_kcal, distance_meters,
     avg_heart_rate_bpm, max_heart_rate_bpm, elevation_gain_meters";

const SLEEP_COLUMNS: &str = "id, user_id, start_time, end_time, duration_seconds, efficiency_percent, is_nap,
     source_provider, source_device, deep_seconds, light_seconds, rem_seconds, awake_seconds";

const SAMPLE_COLUMNS: &str = "id, user_id, timestamp, series_type, value, unit";

/// Database storage operations for users and health records
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Page through users, optionally filtered by a search term
    pub fn get_users(
        pool: &DatabasePool,
        search: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<User>, usize), RepositoryError> {
        debug!("Querying users: search={:?}, limit={}, offset={}", search, limit, offset);

        let conn = pool.get()?;
        let pattern = search.map(str::to_lowercase);
        let filter = "WHERE ?1 IS NULL
                OR instr(fold_case(email), ?1) > 0
                OR instr(fold_case(first_name), ?1) > 0
                OR instr(fold_case(last_name), ?1) > 0";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM users {}", filter),
            params![pattern],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC, id LIMIT ?2 OFFSET ?3",
            USER_COLUMNS, filter
        ))?;
        let users = stmt
            .query_map(params![pattern, limit as i64, offset as i64], map_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, total as usize))
    }

    /// Get a single user by ID
    pub fn get_user_by_id(pool: &DatabasePool, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        debug!("Getting user by ID from database: id={}", id);

        let conn = pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id.to_string()],
                map_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Query workouts for a user
    pub fn get_workouts(
        pool: &DatabasePool,
        user_id: &Uuid,
        filter: &EventRecordFilter,
    ) -> Result<(Vec<Workout>, usize), RepositoryError> {
        debug!("Querying workouts: user_id={}, filter={:?}", user_id, filter);

        let conn = pool.get()?;
        let conditions = "WHERE user_id = ?1
                AND (?2 IS NULL OR start_time >= ?2)
                AND (?3 IS NULL OR start_time <= ?3)
                AND (?4 IS NULL OR fold_case(workout_type) = fold_case(?4))";
        let user_id = user_id.to_string();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM workouts {}", conditions),
            params![user_id, filter.start_time, filter.end_time, filter.workout_type],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM workouts {} ORDER BY start_time DESC, id LIMIT ?5 OFFSET ?6",
            WORKOUT_COLUMNS, conditions
        ))?;
        let workouts = stmt
            .query_map(
                params![
                    user_id,
                    filter.start_time,
                    filter.end_time,
                    filter.workout_type,
                    filter.limit as i64,
                    filter.offset as i64,
                ],
                map_workout,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((workouts, total as usize))
    }

    /// Query sleep sessions for a user
    pub fn get_sleep_sessions(
        pool: &DatabasePool,
        user_id: &Uuid,
        filter: &EventRecordFilter,
    ) -> Result<(Vec<SleepSession>, usize), RepositoryError> {
        debug!("Querying sleep sessions: user_id={}, filter={:?}", user_id, filter);

        let conn = pool.get()?;
        let conditions = "WHERE user_id = ?1
                AND (?2 IS NULL OR start_time >= ?2)
                AND (?3 IS NULL OR start_time <= ?3)";
        let user_id = user_id.to_string();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM sleep_sessions {}", conditions),
            params![user_id, filter.start_time, filter.end_time],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sleep_sessions {} ORDER BY start_time DESC, id LIMIT ?4 OFFSET ?5",
            SLEEP_COLUMNS, conditions
        ))?;
        let sessions = stmt
            .query_map(
                params![
                    user_id,
                    filter.start_time,
                    filter.end_time,
                    filter.limit as i64,
                    filter.offset as i64,
                ],
                map_sleep_session,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((sessions, total as usize))
    }

    /// Query time-series samples of the requested types for a user
    pub fn get_samples(
        pool: &DatabasePool,
        user_id: &Uuid,
        filter: &TimeSeriesFilter,
    ) -> Result<(Vec<TimeSeriesSample>, usize), RepositoryError> {
        debug!("Querying time-series samples: user_id={}, filter={:?}", user_id, filter);

        if filter.series_types.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let conn = pool.get()?;

        // ?1 user, ?2 start, ?3 end, then one placeholder per series type
        let placeholders = (0..filter.series_types.len())
            .map(|i| format!("?{}", i + 4))
            .collect::<Vec<_>>()
            .join(", ");
        let conditions = format!(
            "WHERE user_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3 AND series_type IN ({})",
            placeholders
        );

        let mut values: Vec<Value> = vec![
            Value::Text(user_id.to_string()),
            Value::Text(filter.start_time.clone()),
            Value::Text(filter.end_time.clone()),
        ];
        values.extend(filter.series_types.iter().cloned().map(Value::Text));

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM timeseries_samples {}", conditions),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let limit_index = values.len() + 1;
        values.push(Value::Integer(filter.limit as i64));

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM timeseries_samples {} ORDER BY timestamp ASC, id LIMIT ?{}",
            SAMPLE_COLUMNS, conditions, limit_index
        ))?;
        let samples = stmt
            .query_map(params_from_iter(values.iter()), map_sample)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((samples, total as usize))
    }
}

/// Insert helpers used to seed databases in tests
#[cfg(any(test, feature = "mock"))]
impl DatabaseStorage {
    pub fn insert_user(pool: &DatabasePool, user: &User) -> Result<(), RepositoryError> {
        let conn = pool.get()?;
        conn.execute(
            &format!("INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", USER_COLUMNS),
            params![
                user.id,
                user.email,
                user.first_name,
                user.last_name,
                user.external_user_id,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn insert_workout(pool: &DatabasePool, workout: &Workout) -> Result<(), RepositoryError> {
        let conn = pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO workouts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                WORKOUT_COLUMNS
            ),
            params![
                workout.id,
                workout.user_id,
                workout.workout_type,
                workout.name,
                workout.start_time,
                workout.end_time,
                workout.duration_seconds,
                workout.source_provider,
                workout.source_device,
                workout.calories_kcal,
                workout.distance_meters,
                workout.avg_heart_rate_bpm,
                workout.max_heart_rate_bpm,
                workout.elevation_gain_meters,
            ],
        )?;
        Ok(())
    }

    pub fn insert_sleep_session(pool: &DatabasePool, session: &SleepSession) -> Result<(), RepositoryError> {
        let conn = pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO sleep_sessions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                SLEEP_COLUMNS
            ),
            params![
                session.id,
                session.user_id,
                session.start_time,
                session.end_time,
                session.duration_seconds,
                session.efficiency_percent,
                session.is_nap,
                session.source_provider,
                session.source_device,
                session.deep_seconds,
                session.light_seconds,
                session.rem_seconds,
                session.awake_seconds,
            ],
        )?;
        Ok(())
    }

    pub fn insert_sample(pool: &DatabasePool, sample: &TimeSeriesSample) -> Result<(), RepositoryError> {
        let conn = pool.get()?;
        conn.execute(
            &format!("INSERT INTO timeseries_samples ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", SAMPLE_COLUMNS),
            params![
                sample.id,
                sample.user_id,
                sample.timestamp,
                sample.series_type,
                sample.value,
                sample.unit,
            ],
        )?;
        Ok(())
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        external_user_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_workout(row: &Row<'_>) -> rusqlite::Result<Workout> {
    Ok(Workout {
        id: row.get(0)?,
        user_id: row.get(1)?,
        workout_type: row.get(2)?,
        name: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        duration_seconds: row.get(6)?,
        source_provider: row.get(7)?,
        source_device: row.get(8)?,
        calories_kcal: row.get(9)?,
        distance_meters: row.get(10)?,
        avg_heart_rate_bpm: row.get(11)?,
        max_heart_rate_bpm: row.get(12)?,
        elevation_gain_meters: row.get(13)?,
    })
}

fn map_sleep_session(row: &Row<'_>) -> rusqlite::Result<SleepSession> {
    Ok(SleepSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        duration_seconds: row.get(4)?,
        efficiency_percent: row.get(5)?,
        is_nap: row.get(6)?,
        source_provider: row.get(7)?,
        source_device: row.get(8)?,
        deep_seconds: row.get(9)?,
        light_seconds: row.get(10)?,
        rem_seconds: row.get(11)?,
        awake_seconds: row.get(12)?,
    })
}

fn map_sample(row: &Row<'_>) -> rusqlite::Result<TimeSeriesSample> {
    Ok(TimeSeriesSample {
        id: row.get(0)?,
        user_id: row.get(1)?,
        timestamp: row.get(2)?,
        series_type: row.get(3)?,
        value: row.get(4)?,
        unit: row.get(5)?,
    })
}
