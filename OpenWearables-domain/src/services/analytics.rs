//! Aggregations behind the summary tools.
//!
//! All functions are pure: callers fetch the records and pass them in along
//! with the reporting period they were asked about.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::entities::{Period, SeriesType, SleepSession, TimeSeriesSample, Workout};

/// Round to the given number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutTypeStats {
    pub count: usize,
    pub total_duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutHeartRate {
    pub avg_across_workouts: f64,
    pub workouts_with_hr_data: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub total_workouts: usize,
    pub total_duration_seconds: i64,
    pub total_duration_hours: f64,
    pub avg_duration_minutes: f64,
    /// Ordered by count, most frequent first
    pub workout_types: IndexMap<String, WorkoutTypeStats>,
    pub heart_rate: Option<WorkoutHeartRate>,
    pub period: Period,
}

/// Totals, per-type breakdown and heart rate average over a set of workouts
pub fn workout_summary(workouts: &[Workout], period: Period) -> WorkoutSummary {
    let mut workout_types: IndexMap<String, (usize, i64)> = IndexMap::new();
    let mut total_duration: i64 = 0;
    let mut hr_values: Vec<f64> = Vec::new();

    for workout in workouts {
        let duration = workout.duration_seconds.unwrap_or(0);
        total_duration += duration;

        let workout_type = workout.workout_type.clone().unwrap_or_else(|| "unknown".to_string());
        let entry = workout_types.entry(workout_type).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += duration;

        if let Some(bpm) = workout.avg_heart_rate_bpm.filter(|bpm| *bpm > 0) {
            hr_values.push(bpm as f64);
        }
    }

    // Stable sort keeps first-seen order among equal counts
    workout_types.sort_by(|_, a, _, b| b.0.cmp(&a.0));

    let avg_duration_minutes = if workouts.is_empty() {
        0.0
    } else {
        round_to(total_duration as f64 / workouts.len() as f64 / 60.0, 1)
    };

    WorkoutSummary {
        total_workouts: workouts.len(),
        total_duration_seconds: total_duration,
        total_duration_hours: round_to(total_duration as f64 / 3600.0, 2),
        avg_duration_minutes,
        workout_types: workout_types
            .into_iter()
            .map(|(name, (count, seconds))| {
                (
                    name,
                    WorkoutTypeStats {
                        count,
                        total_duration_minutes: round_to(seconds as f64 / 60.0, 1),
                    },
                )
            })
            .collect(),
        heart_rate: average(&hr_values).map(|avg| WorkoutHeartRate {
            avg_across_workouts: round_to(avg, 1),
            workouts_with_hr_data: hr_values.len(),
        }),
        period,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepStageAverages {
    pub deep_minutes: f64,
    pub light_minutes: f64,
    pub rem_minutes: f64,
    pub awake_minutes: f64,
    /// Share of deep sleep in deep + light + REM
    pub deep_percent: Option<f64>,
    pub rem_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepAverages {
    pub avg_duration_hours: f64,
    pub avg_duration_minutes: f64,
    pub total_sleep_hours: f64,
    pub avg_efficiency_percent: Option<f64>,
    pub sleep_stages_avg: Option<SleepStageAverages>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepSummary {
    pub total_sessions: usize,
    pub main_sleep_sessions: usize,
    pub naps: usize,
    /// Absent when there were no sessions at all
    #[serde(flatten)]
    pub averages: Option<SleepAverages>,
    pub period: Period,
}

/// Averages over main sleep sessions; naps are only counted
pub fn sleep_summary(sessions: &[SleepSession], period: Period) -> SleepSummary {
    let (naps, main_sleeps): (Vec<&SleepSession>, Vec<&SleepSession>) =
        sessions.iter().partition(|session| session.is_nap);

    let averages = (!sessions.is_empty()).then(|| {
        let total_duration: i64 = main_sleeps
            .iter()
            .map(|session| session.duration_seconds.unwrap_or(0))
            .sum();
        let efficiencies: Vec<f64> = main_sleeps
            .iter()
            .filter_map(|session| session.efficiency_percent)
            .collect();

        let mut deep = 0i64;
        let mut light = 0i64;
        let mut rem = 0i64;
        let mut awake = 0i64;
        let mut sessions_with_stages = 0usize;
        for stages in main_sleeps.iter().filter_map(|session| session.stages.as_ref()) {
            sessions_with_stages += 1;
            deep += stages.deep_seconds.unwrap_or(0);
            light += stages.light_seconds.unwrap_or(0);
            rem += stages.rem_seconds.unwrap_or(0);
            awake += stages.awake_seconds.unwrap_or(0);
        }

        let sleep_stages_avg = (sessions_with_stages > 0).then(|| {
            let per_session_minutes =
                |seconds: i64| round_to(seconds as f64 / sessions_with_stages as f64 / 60.0, 1);
            let asleep = deep + light + rem;
            let share = |seconds: i64| (asleep > 0).then(|| round_to(seconds as f64 / asleep as f64 * 100.0, 1));

            SleepStageAverages {
                deep_minutes: per_session_minutes(deep),
                light_minutes: per_session_minutes(light),
                rem_minutes: per_session_minutes(rem),
                awake_minutes: per_session_minutes(awake),
                deep_percent: share(deep),
                rem_percent: share(rem),
            }
        });

        let avg_duration = if main_sleeps.is_empty() {
            0.0
        } else {
            total_duration as f64 / main_sleeps.len() as f64
        };

        SleepAverages {
            avg_duration_hours: round_to(avg_duration / 3600.0, 2),
            avg_duration_minutes: round_to(avg_duration / 60.0, 1),
            total_sleep_hours: round_to(total_duration as f64 / 3600.0, 2),
            avg_efficiency_percent: average(&efficiencies).map(|avg| round_to(avg, 1)),
            sleep_stages_avg,
        }
    });

    SleepSummary {
        total_sessions: sessions.len(),
        main_sleep_sessions: main_sleeps.len(),
        naps: naps.len(),
        averages,
        period,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BpmStats {
    pub min_bpm: f64,
    pub max_bpm: f64,
    pub avg_bpm: f64,
    pub data_points: usize,
}

impl BpmStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        let avg = average(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            min_bpm: round_to(min, 1),
            max_bpm: round_to(max, 1),
            avg_bpm: round_to(avg, 1),
            data_points: values.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRateStats {
    pub heart_rate: Option<BpmStats>,
    pub resting_heart_rate: Option<BpmStats>,
    pub total_data_points: usize,
    pub period: Period,
}

/// Min, max and mean of heart rate and resting heart rate samples
pub fn heart_rate_stats(samples: &[TimeSeriesSample], period: Period) -> HeartRateStats {
    let values_of = |series_type: SeriesType| -> Vec<f64> {
        samples
            .iter()
            .filter(|sample| sample.series_type == series_type)
            .map(|sample| sample.value)
            .collect()
    };
    let heart_rate = values_of(SeriesType::HeartRate);
    let resting = values_of(SeriesType::RestingHeartRate);

    HeartRateStats {
        heart_rate: BpmStats::from_values(&heart_rate),
        resting_heart_rate: BpmStats::from_values(&resting),
        total_data_points: heart_rate.len() + resting.len(),
        period,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepsSummary {
    pub total: i64,
    pub avg_per_day: i64,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySummary {
    pub total_kcal: f64,
    pub avg_kcal_per_day: f64,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSummary {
    pub total_minutes: f64,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub steps: Option<StepsSummary>,
    pub energy: Option<EnergySummary>,
    pub exercise_time: Option<ExerciseSummary>,
    pub period: Period,
}

/// Sum of the samples of one type and the number of distinct UTC days they fall on
fn total_and_days(samples: &[TimeSeriesSample], series_type: SeriesType) -> Option<(f64, usize, usize)> {
    let matching: Vec<&TimeSeriesSample> = samples
        .iter()
        .filter(|sample| sample.series_type == series_type)
        .collect();
    if matching.is_empty() {
        return None;
    }

    let total = matching.iter().map(|sample| sample.value).sum();
    let days: HashSet<_> = matching.iter().map(|sample| sample.timestamp.date_naive()).collect();
    Some((total, days.len().max(1), matching.len()))
}

/// Steps, active energy and exercise minutes with per-day averages
pub fn activity_summary(samples: &[TimeSeriesSample], period: Period) -> ActivitySummary {
    let steps = total_and_days(samples, SeriesType::Steps).map(|(total, days, data_points)| StepsSummary {
        total: total as i64,
        avg_per_day: (total / days as f64) as i64,
        data_points,
    });

    let energy = total_and_days(samples, SeriesType::Energy).map(|(total, days, data_points)| EnergySummary {
        total_kcal: round_to(total, 1),
        avg_kcal_per_day: round_to(total / days as f64, 1),
        data_points,
    });

    let exercise_time =
        total_and_days(samples, SeriesType::ExerciseTime).map(|(total, _, data_points)| ExerciseSummary {
            total_minutes: round_to(total, 1),
            data_points,
        });

    ActivitySummary {
        steps,
        energy,
        exercise_time,
        period,
    }
}
