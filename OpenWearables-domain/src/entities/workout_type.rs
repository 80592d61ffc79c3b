use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalized workout types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Running,
    TrailRunning,
    Treadmill,
    Walking,
    Hiking,
    Mountaineering,
    Cycling,
    MountainBiking,
    IndoorCycling,
    EBiking,
    Swimming,
    PoolSwimming,
    OpenWaterSwimming,
    StrengthTraining,
    CardioTraining,
    FitnessEquipment,
    Elliptical,
    RowingMachine,
    Yoga,
    Pilates,
    Stretching,
    CrossCountrySkiing,
    AlpineSkiing,
    Snowboarding,
    IceSkating,
    Rowing,
    Kayaking,
    Surfing,
    Sailing,
    Soccer,
    Basketball,
    Tennis,
    Volleyball,
    Other,
}

use WorkoutType::*;

const ALL_WORKOUT_TYPES: &[WorkoutType] = &[
    Running,
    TrailRunning,
    Treadmill,
    Walking,
    Hiking,
    Mountaineering,
    Cycling,
    MountainBiking,
    IndoorCycling,
    EBiking,
    Swimming,
    PoolSwimming,
    OpenWaterSwimming,
    StrengthTraining,
    CardioTraining,
    FitnessEquipment,
    Elliptical,
    RowingMachine,
    Yoga,
    Pilates,
    Stretching,
    CrossCountrySkiing,
    AlpineSkiing,
    Snowboarding,
    IceSkating,
    Rowing,
    Kayaking,
    Surfing,
    Sailing,
    Soccer,
    Basketball,
    Tennis,
    Volleyball,
    Other,
];

const WORKOUT_CATEGORIES: &[(&str, &[WorkoutType])] = &[
    ("running_walking", &[Running, TrailRunning, Treadmill, Walking, Hiking, Mountaineering]),
    ("cycling", &[Cycling, MountainBiking, IndoorCycling, EBiking]),
    ("swimming", &[Swimming, PoolSwimming, OpenWaterSwimming]),
    (
        "strength_gym",
        &[StrengthTraining, CardioTraining, FitnessEquipment, Elliptical, RowingMachine],
    ),
    ("flexibility", &[Yoga, Pilates, Stretching]),
    ("winter_sports", &[CrossCountrySkiing, AlpineSkiing, Snowboarding, IceSkating]),
    ("water_sports", &[Rowing, Kayaking, Surfing, Sailing]),
    ("team_sports", &[Soccer, Basketball, Tennis, Volleyball]),
];

impl WorkoutType {
    pub fn all() -> &'static [WorkoutType] {
        ALL_WORKOUT_TYPES
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Running => "running",
            TrailRunning => "trail_running",
            Treadmill => "treadmill",
            Walking => "walking",
            Hiking => "hiking",
            Mountaineering => "mountaineering",
            Cycling => "cycling",
            MountainBiking => "mountain_biking",
            IndoorCycling => "indoor_cycling",
            EBiking => "e_biking",
            Swimming => "swimming",
            PoolSwimming => "pool_swimming",
            OpenWaterSwimming => "open_water_swimming",
            StrengthTraining => "strength_training",
            CardioTraining => "cardio_training",
            FitnessEquipment => "fitness_equipment",
            Elliptical => "elliptical",
            RowingMachine => "rowing_machine",
            Yoga => "yoga",
            Pilates => "pilates",
            Stretching => "stretching",
            CrossCountrySkiing => "cross_country_skiing",
            AlpineSkiing => "alpine_skiing",
            Snowboarding => "snowboarding",
            IceSkating => "ice_skating",
            Rowing => "rowing",
            Kayaking => "kayaking",
            Surfing => "surfing",
            Sailing => "sailing",
            Soccer => "soccer",
            Basketball => "basketball",
            Tennis => "tennis",
            Volleyball => "volleyball",
            Other => "other",
        }
    }

    /// Category groupings presented to clients. `other` belongs to none.
    pub fn categories() -> &'static [(&'static str, &'static [WorkoutType])] {
        WORKOUT_CATEGORIES
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_WORKOUT_TYPES
            .iter()
            .copied()
            .find(|workout_type| workout_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown workout type: {}", s))
    }
}
