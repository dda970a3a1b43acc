use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_AGE: f64 = 25.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_ACTIVITY: f64 = 1.375;

pub const DEFAULT_BURN_GOAL: f64 = 1500.0;
pub const DEFAULT_WORKOUT_GOAL: f64 = 4.0;
pub const DEFAULT_INTAKE_GOAL: f64 = 14_000.0;

pub const DEFAULT_WATER_GOAL_ML: u32 = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    #[serde(deserialize_with = "lenient_gender")]
    pub gender: Gender,
    #[serde(deserialize_with = "lenient_f64")]
    pub age: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub height: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub activity: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: Gender::Male,
            age: DEFAULT_AGE,
            weight: DEFAULT_WEIGHT_KG,
            height: DEFAULT_HEIGHT_CM,
            activity: DEFAULT_ACTIVITY,
        }
    }
}

impl Profile {
    pub fn age_years(&self) -> f64 {
        positive_or(self.age, DEFAULT_AGE)
    }

    pub fn weight_kg(&self) -> f64 {
        positive_or(self.weight, DEFAULT_WEIGHT_KG)
    }

    pub fn height_cm(&self) -> f64 {
        positive_or(self.height, DEFAULT_HEIGHT_CM)
    }

    pub fn activity_factor(&self) -> f64 {
        positive_or(self.activity, DEFAULT_ACTIVITY)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }
}

/// Weekly targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    #[serde(deserialize_with = "lenient_f64")]
    pub burn: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub workouts: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub cals: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            burn: DEFAULT_BURN_GOAL,
            workouts: DEFAULT_WORKOUT_GOAL,
            cals: DEFAULT_INTAKE_GOAL,
        }
    }
}

impl Goals {
    /// Replaces unset or non-positive targets with the defaults.
    pub fn normalized(self) -> Self {
        Self {
            burn: positive_or(self.burn, DEFAULT_BURN_GOAL),
            workouts: positive_or(self.workouts, DEFAULT_WORKOUT_GOAL),
            cals: positive_or(self.cals, DEFAULT_INTAKE_GOAL),
        }
    }
}

/// A workout is `done` exactly when it carries a completion `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub id: String,
    pub name: String,
    pub duration: u32,
    pub day: Weekday,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date: Option<DateTime<Utc>>,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: String,
    pub name: String,
    pub cals: u32,
    pub day: Weekday,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterLog {
    #[serde(deserialize_with = "lenient_ml")]
    pub today: u32,
    #[serde(deserialize_with = "lenient_ml")]
    pub goal: u32,
    #[serde(deserialize_with = "lenient_history")]
    pub history: BTreeMap<String, u32>,
}

impl Default for WaterLog {
    fn default() -> Self {
        Self {
            today: 0,
            goal: DEFAULT_WATER_GOAL_ML,
            history: BTreeMap::new(),
        }
    }
}

impl WaterLog {
    pub fn effective_goal(&self) -> u32 {
        if self.goal == 0 {
            DEFAULT_WATER_GOAL_ML
        } else {
            self.goal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metabolics {
    pub bmr: i64,
    pub tdee: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Cm,
    M,
    Ft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiReading {
    pub value: f64,
    pub category: BmiCategory,
}

#[derive(Debug, Deserialize)]
pub struct BmiRequest {
    #[serde(default)]
    pub weight: Option<f64>,
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub height: Option<f64>,
    pub height_unit: HeightUnit,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub metabolics: Metabolics,
}

/// Form input for a scheduled workout. Fields stay optional so that the
/// ledger, not the decoder, decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkoutDraft {
    pub name: String,
    #[serde(deserialize_with = "lenient_int")]
    pub duration: Option<i64>,
    #[serde(deserialize_with = "lenient_day")]
    pub day: Option<Weekday>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MealDraft {
    pub name: String,
    #[serde(deserialize_with = "lenient_int")]
    pub cals: Option<i64>,
    #[serde(deserialize_with = "lenient_day")]
    pub day: Option<Weekday>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutView {
    #[serde(flatten)]
    pub entry: WorkoutEntry,
    pub kcal: u32,
}

#[derive(Debug, Serialize)]
pub struct DayGroup<T> {
    pub day: Weekday,
    pub entries: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct WaterIntakeRequest {
    pub amount: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WaterGoalRequest {
    #[serde(deserialize_with = "lenient_int")]
    pub goal: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmRequest {
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterDay {
    pub date: String,
    pub ml: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterStatus {
    pub date: String,
    pub today: u32,
    pub goal: u32,
    pub percent: u32,
    /// Consumed and remaining volume for the two-segment gauge.
    pub segments: [u32; 2],
    pub history: Vec<WaterDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub labels: Vec<Weekday>,
    pub consumed: [u32; 7],
    pub burned: [u32; 7],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub burn_pct: u32,
    pub workout_pct: u32,
    pub calorie_pct: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tip {
    Moderation,
    LightActivity,
    Encouragement,
    CatchUp,
    Motivation,
}

impl Tip {
    pub fn message(self) -> &'static str {
        match self {
            Tip::Moderation => "You ate a bit high today. Try a lighter dinner and hydrate.",
            Tip::LightActivity => "Try a 10-minute brisk walk to boost your metabolism.",
            Tip::Encouragement => "Great consistency! Keep going!",
            Tip::CatchUp => "Do a short HIIT session today to reach your burn goal.",
            Tip::Motivation => "Small steps matter. Do one quick workout today!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub greeting: String,
    pub total_workouts: usize,
    pub completed_workouts: usize,
    pub streak_days: u32,
    pub weekly: WeeklySeries,
    pub total_consumed: u32,
    pub total_burned: u32,
    pub goals: Goals,
    pub progress: GoalProgress,
    pub tip: Tip,
    pub tip_message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountdownStartRequest {
    #[serde(deserialize_with = "lenient_int")]
    pub minutes: Option<i64>,
    pub exercise: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StopwatchStartRequest {
    pub exercise: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDisplay {
    pub running: bool,
    pub seconds: u64,
    pub clock: String,
    pub exercise: String,
    pub kcal: u32,
    /// Set only on the tick that brought a countdown to zero.
    pub completed: bool,
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => text.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_ml<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_int(deserializer)?
        .and_then(|ml| u32::try_from(ml).ok())
        .unwrap_or(0))
}

/// Drops days whose volume is unreadable instead of the whole log.
fn lenient_history<'de, D>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(days) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(days
        .into_iter()
        .filter_map(|(date, ml)| match ml.as_u64().and_then(|ml| u32::try_from(ml).ok()) {
            Some(ml) => Some((date, ml)),
            None => {
                warn!("skipping unreadable water entry for {date}");
                None
            }
        })
        .collect())
}

fn lenient_day<'de, D>(deserializer: D) -> Result<Option<Weekday>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_gender<'de, D>(deserializer: D) -> Result<Gender, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) if text.trim().eq_ignore_ascii_case("female") => Gender::Female,
        _ => Gender::Male,
    })
}
