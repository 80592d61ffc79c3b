use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::models::event_record::{EventRecordFilter, SleepSession, Workout};
use crate::models::timeseries::{TimeSeriesFilter, TimeSeriesSample};
use crate::models::user::User;
use super::errors::RepositoryError;

/// In-memory storage with the same filtering rules as the SQLite queries
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<Vec<User>>>,
    workouts: Arc<RwLock<Vec<Workout>>>,
    sleep_sessions: Arc<RwLock<Vec<SleepSession>>>,
    samples: Arc<RwLock<Vec<TimeSeriesSample>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) -> Result<(), RepositoryError> {
        self.users.write()?.push(user);
        Ok(())
    }

    pub fn add_workout(&self, workout: Workout) -> Result<(), RepositoryError> {
        self.workouts.write()?.push(workout);
        Ok(())
    }

    pub fn add_sleep_session(&self, session: SleepSession) -> Result<(), RepositoryError> {
        self.sleep_sessions.write()?.push(session);
        Ok(())
    }

    pub fn add_sample(&self, sample: TimeSeriesSample) -> Result<(), RepositoryError> {
        self.samples.write()?.push(sample);
        Ok(())
    }

    pub fn get_users(
        &self,
        search: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<User>, usize), RepositoryError> {
        let store = self.users.read()?;
        let needle = search.map(str::to_lowercase);

        let mut users: Vec<User> = store
            .iter()
            .filter(|user| match &needle {
                Some(needle) => [Some(&user.email), user.first_name.as_ref(), user.last_name.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .cloned()
            .collect();

        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(users, limit, offset))
    }

    pub fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let store = self.users.read()?;
        let id = id.to_string();
        Ok(store.iter().find(|user| user.id == id).cloned())
    }

    pub fn get_workouts(
        &self,
        user_id: &Uuid,
        filter: &EventRecordFilter,
    ) -> Result<(Vec<Workout>, usize), RepositoryError> {
        let store = self.workouts.read()?;
        let user_id = user_id.to_string();

        let mut workouts: Vec<Workout> = store
            .iter()
            .filter(|w| w.user_id == user_id && in_range(&w.start_time, filter))
            .filter(|w| match &filter.workout_type {
                Some(wanted) => w
                    .workout_type
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase() == wanted.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();

        workouts.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(workouts, filter.limit, filter.offset))
    }

    pub fn get_sleep_sessions(
        &self,
        user_id: &Uuid,
        filter: &EventRecordFilter,
    ) -> Result<(Vec<SleepSession>, usize), RepositoryError> {
        let store = self.sleep_sessions.read()?;
        let user_id = user_id.to_string();

        let mut sessions: Vec<SleepSession> = store
            .iter()
            .filter(|s| s.user_id == user_id && in_range(&s.start_time, filter))
            .cloned()
            .collect();

        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(sessions, filter.limit, filter.offset))
    }

    pub fn get_samples(
        &self,
        user_id: &Uuid,
        filter: &TimeSeriesFilter,
    ) -> Result<(Vec<TimeSeriesSample>, usize), RepositoryError> {
        let store = self.samples.read()?;
        let user_id = user_id.to_string();

        let mut samples: Vec<TimeSeriesSample> = store
            .iter()
            .filter(|s| {
                s.user_id == user_id
                    && filter.series_types.contains(&s.series_type)
                    && s.timestamp.as_str() >= filter.start_time.as_str()
                    && s.timestamp.as_str() <= filter.end_time.as_str()
            })
            .cloned()
            .collect();

        samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(samples, filter.limit, 0))
    }
}

fn in_range(start_time: &str, filter: &EventRecordFilter) -> bool {
    if let Some(start) = &filter.start_time {
        if start_time < start.as_str() {
            return false;
        }
    }
    if let Some(end) = &filter.end_time {
        if start_time > end.as_str() {
            return false;
        }
    }
    true
}

fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let page = items.into_iter().skip(offset).take(limit).collect();
    (page, total)
}
