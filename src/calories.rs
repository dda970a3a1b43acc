use crate::metabolic::load_profile;
use crate::models::WorkoutEntry;
use crate::store::{KeyValueStore, WORKOUTS_KEY};
use std::collections::HashSet;

/// MET used for any exercise not in [`MET_TABLE`].
pub const DEFAULT_MET: f64 = 4.0;

pub const MET_TABLE: &[(&str, f64)] = &[
    ("Running (10 km/h)", 9.8),
    ("Cycling (moderate)", 7.5),
    ("Walking (5 km/h)", 3.5),
    ("Yoga", 3.0),
    ("HIIT", 8.0),
    ("Bodyweight", 6.0),
    ("Jump Rope", 12.0),
];

pub fn met_for(exercise: &str) -> f64 {
    MET_TABLE
        .iter()
        .find(|(name, _)| *name == exercise)
        .map(|(_, met)| *met)
        .unwrap_or(DEFAULT_MET)
}

/// `round(minutes * MET * 3.5 * weight / 200)`, clamped at zero.
pub fn estimate_calories(minutes: f64, exercise: &str, weight_kg: f64) -> u32 {
    let kcal = round_half_up(minutes * met_for(exercise) * 3.5 * weight_kg / 200.0);
    if kcal.is_finite() && kcal > 0.0 {
        kcal as u32
    } else {
        0
    }
}

/// Rounds to the nearest integer with halves going up, the rule every
/// derived figure in the dashboard uses.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Estimator bound to the body weight of the stored profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieEstimator {
    weight_kg: f64,
}

impl CalorieEstimator {
    pub fn new(weight_kg: f64) -> Self {
        Self { weight_kg }
    }

    pub fn from_store<S: KeyValueStore>(store: &S) -> Self {
        Self::new(load_profile(store).weight_kg())
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn estimate(&self, minutes: f64, exercise: &str) -> u32 {
        estimate_calories(minutes, exercise, self.weight_kg)
    }

    pub fn workout(&self, entry: &WorkoutEntry) -> u32 {
        self.estimate(f64::from(entry.duration), &entry.name)
    }
}

/// Known exercises first, then names from the workout log, without repeats.
pub fn exercise_options<S: KeyValueStore>(store: &S) -> Vec<String> {
    let workouts: Vec<WorkoutEntry> = store.get_records(WORKOUTS_KEY);
    let mut seen = HashSet::new();
    MET_TABLE
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(workouts.into_iter().map(|entry| entry.name))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
