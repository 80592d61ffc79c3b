use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of time-series measurements the platform stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesType {
    // Heart
    HeartRate,
    RestingHeartRate,
    HeartRateVariabilitySdnn,
    HeartRateRecoveryOneMinute,
    WalkingHeartRateAverage,

    // Blood and respiration
    OxygenSaturation,
    BloodGlucose,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    RespiratoryRate,
    SleepingBreathingDisturbances,

    // Body
    Height,
    Weight,
    BodyFatPercentage,
    BodyMassIndex,
    LeanBodyMass,
    BodyTemperature,

    // Activity
    Steps,
    Energy,
    BasalEnergy,
    StandTime,
    ExerciseTime,
    PhysicalEffort,
    FlightsClimbed,

    // Distance
    DistanceWalkingRunning,
    DistanceCycling,
    DistanceSwimming,

    // Running dynamics
    RunningPower,
    RunningSpeed,
    RunningStrideLength,
    RunningGroundContactTime,
    RunningVerticalOscillation,

    // Walking and stairs
    WalkingSpeed,
    WalkingStepLength,
    WalkingAsymmetryPercentage,
    WalkingDoubleSupportPercentage,
    StairAscentSpeed,
    StairDescentSpeed,
}

/// Stable numeric id, wire name and unit for every series type
const SERIES_TYPE_DEFINITIONS: &[(u32, SeriesType, &str, &str)] = &[
    (1, SeriesType::HeartRate, "heart_rate", "bpm"),
    (2, SeriesType::RestingHeartRate, "resting_heart_rate", "bpm"),
    (3, SeriesType::HeartRateVariabilitySdnn, "heart_rate_variability_sdnn", "ms"),
    (4, SeriesType::HeartRateRecoveryOneMinute, "heart_rate_recovery_one_minute", "bpm"),
    (5, SeriesType::WalkingHeartRateAverage, "walking_heart_rate_average", "bpm"),
    (20, SeriesType::OxygenSaturation, "oxygen_saturation", "percent"),
    (21, SeriesType::BloodGlucose, "blood_glucose", "mg_dl"),
    (22, SeriesType::BloodPressureSystolic, "blood_pressure_systolic", "mmHg"),
    (23, SeriesType::BloodPressureDiastolic, "blood_pressure_diastolic", "mmHg"),
    (24, SeriesType::RespiratoryRate, "respiratory_rate", "brpm"),
    (25, SeriesType::SleepingBreathingDisturbances, "sleeping_breathing_disturbances", "count"),
    (40, SeriesType::Height, "height", "cm"),
    (41, SeriesType::Weight, "weight", "kg"),
    (42, SeriesType::BodyFatPercentage, "body_fat_percentage", "percent"),
    (43, SeriesType::BodyMassIndex, "body_mass_index", "kg_m2"),
    (44, SeriesType::LeanBodyMass, "lean_body_mass", "kg"),
    (45, SeriesType::BodyTemperature, "body_temperature", "celsius"),
    (60, SeriesType::Steps, "steps", "count"),
    (61, SeriesType::Energy, "energy", "kcal"),
    (62, SeriesType::BasalEnergy, "basal_energy", "kcal"),
    (63, SeriesType::StandTime, "stand_time", "minutes"),
    (64, SeriesType::ExerciseTime, "exercise_time", "minutes"),
    (65, SeriesType::PhysicalEffort, "physical_effort", "kcal_hr_kg"),
    (66, SeriesType::FlightsClimbed, "flights_climbed", "count"),
    (80, SeriesType::DistanceWalkingRunning, "distance_walking_running", "meters"),
    (81, SeriesType::DistanceCycling, "distance_cycling", "meters"),
    (82, SeriesType::DistanceSwimming, "distance_swimming", "meters"),
    (100, SeriesType::RunningPower, "running_power", "watts"),
    (101, SeriesType::RunningSpeed, "running_speed", "m_s"),
    (102, SeriesType::RunningStrideLength, "running_stride_length", "meters"),
    (103, SeriesType::RunningGroundContactTime, "running_ground_contact_time", "ms"),
    (104, SeriesType::RunningVerticalOscillation, "running_vertical_oscillation", "cm"),
    (120, SeriesType::WalkingSpeed, "walking_speed", "m_s"),
    (121, SeriesType::WalkingStepLength, "walking_step_length", "cm"),
    (122, SeriesType::WalkingAsymmetryPercentage, "walking_asymmetry_percentage", "percent"),
    (123, SeriesType::WalkingDoubleSupportPercentage, "walking_double_support_percentage", "percent"),
    (124, SeriesType::StairAscentSpeed, "stair_ascent_speed", "m_s"),
    (125, SeriesType::StairDescentSpeed, "stair_descent_speed", "m_s"),
];

const BODY_TYPES: &[&str] = &[
    "height",
    "weight",
    "body_fat_percentage",
    "body_mass_index",
    "lean_body_mass",
    "body_temperature",
];

const ACTIVITY_BASIC_TYPES: &[&str] = &[
    "steps",
    "energy",
    "basal_energy",
    "stand_time",
    "exercise_time",
    "physical_effort",
    "flights_climbed",
];

impl SeriesType {
    /// Every series type in definition order
    pub fn all() -> impl Iterator<Item = SeriesType> {
        SERIES_TYPE_DEFINITIONS.iter().map(|(_, series_type, _, _)| *series_type)
    }

    fn definition(&self) -> &'static (u32, SeriesType, &'static str, &'static str) {
        SERIES_TYPE_DEFINITIONS
            .iter()
            .find(|(_, series_type, _, _)| series_type == self)
            .unwrap_or(&SERIES_TYPE_DEFINITIONS[0])
    }

    pub fn id(&self) -> u32 {
        self.definition().0
    }

    /// Wire name, e.g. `heart_rate`
    pub fn as_str(&self) -> &'static str {
        self.definition().2
    }

    /// Canonical unit
    pub fn unit(&self) -> &'static str {
        self.definition().3
    }

    /// Category groupings by name, in the order they are presented to clients
    pub fn categories() -> Vec<(&'static str, Vec<&'static str>)> {
        let names: Vec<&'static str> = Self::all().map(|series_type| series_type.as_str()).collect();
        let matching = |predicate: &dyn Fn(&str) -> bool| -> Vec<&'static str> {
            names.iter().copied().filter(|&name| predicate(name)).collect()
        };

        vec![
            (
                "biometrics_heart",
                matching(&|name| {
                    ["heart_", "resting_heart", "walking_heart"]
                        .iter()
                        .any(|prefix| name.starts_with(prefix))
                }),
            ),
            (
                "biometrics_blood",
                matching(&|name| {
                    ["oxygen_", "blood_", "respiratory_", "sleeping_"]
                        .iter()
                        .any(|prefix| name.starts_with(prefix))
                }),
            ),
            ("biometrics_body", matching(&|name| BODY_TYPES.contains(&name))),
            ("activity_basic", matching(&|name| ACTIVITY_BASIC_TYPES.contains(&name))),
            ("activity_distance", matching(&|name| name.starts_with("distance_"))),
            ("activity_running", matching(&|name| name.starts_with("running_"))),
            (
                "activity_walking",
                matching(&|name| name.starts_with("walking_") || name.starts_with("stair_")),
            ),
        ]
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SERIES_TYPE_DEFINITIONS
            .iter()
            .find(|(_, _, name, _)| *name == s)
            .map(|(_, series_type, _, _)| *series_type)
            .ok_or_else(|| format!("Unknown series type: {}", s))
    }
}
