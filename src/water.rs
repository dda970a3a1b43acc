use crate::calories::round_half_up;
use crate::errors::AppError;
use crate::models::{WaterDay, WaterLog, WaterStatus};
use crate::store::{KeyValueStore, WATER_KEY};
use chrono::NaiveDate;
use tracing::{debug, info};

const HISTORY_DAYS: usize = 7;

pub fn load<S: KeyValueStore>(store: &S) -> WaterLog {
    store.get(WATER_KEY, WaterLog::default())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Volume logged for `today`. A day without a history entry starts at zero,
/// which is how the counter rolls over without a midnight job.
pub fn today_volume(log: &WaterLog, today: NaiveDate) -> u32 {
    log.history.get(&date_key(today)).copied().unwrap_or(0)
}

pub fn add_intake<S: KeyValueStore>(store: &mut S, amount_ml: u32, today: NaiveDate) -> Result<WaterStatus, AppError> {
    let mut log = load(store);
    let total = today_volume(&log, today).saturating_add(amount_ml);
    write_today(store, &mut log, today, total)?;
    debug!(amount_ml, total, "water intake logged");
    Ok(status_of(&log, today))
}

pub fn set_goal<S: KeyValueStore>(store: &mut S, goal_ml: Option<i64>, today: NaiveDate) -> Result<WaterStatus, AppError> {
    let goal = goal_ml
        .filter(|goal| *goal > 0)
        .and_then(|goal| u32::try_from(goal).ok())
        .ok_or_else(|| AppError::bad_request("goal must be a positive number of ml"))?;

    let mut log = load(store);
    log.goal = goal;
    store.set(WATER_KEY, &log)?;
    info!(goal, "water goal updated");
    Ok(status_of(&log, today))
}

/// Zeroes today's volume. The history entry is kept at 0 so the reset stays
/// visible.
pub fn reset_today<S: KeyValueStore>(store: &mut S, today: NaiveDate) -> Result<WaterStatus, AppError> {
    let mut log = load(store);
    write_today(store, &mut log, today, 0)?;
    info!(date = %today, "water intake reset");
    Ok(status_of(&log, today))
}

pub fn status<S: KeyValueStore>(store: &S, today: NaiveDate) -> WaterStatus {
    status_of(&load(store), today)
}

/// `round(100 * min(today, goal) / goal)`.
pub fn progress_percent(today_ml: u32, goal_ml: u32) -> u32 {
    let goal = goal_ml.max(1);
    round_half_up(100.0 * f64::from(today_ml.min(goal)) / f64::from(goal)) as u32
}

fn write_today<S: KeyValueStore>(store: &mut S, log: &mut WaterLog, today: NaiveDate, total: u32) -> Result<(), AppError> {
    log.today = total;
    log.history.insert(date_key(today), total);
    store.set(WATER_KEY, &*log)
}

fn status_of(log: &WaterLog, today: NaiveDate) -> WaterStatus {
    let goal = log.effective_goal();
    let consumed = today_volume(log, today);
    let history = log
        .history
        .iter()
        .rev()
        .take(HISTORY_DAYS)
        .map(|(date, ml)| WaterDay {
            date: date.clone(),
            ml: *ml,
        })
        .collect();

    WaterStatus {
        date: date_key(today),
        today: consumed,
        goal,
        percent: progress_percent(consumed, goal),
        segments: [consumed.min(goal), goal.saturating_sub(consumed)],
        history,
    }
}
