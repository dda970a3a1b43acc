use crate::calories::CalorieEstimator;
use crate::errors::AppError;
use crate::ledger::{group_by_day, new_id};
use crate::models::{DayGroup, WorkoutDraft, WorkoutEntry, WorkoutView};
use crate::store::{KeyValueStore, WORKOUTS_KEY};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use tracing::debug;

pub fn list<S: KeyValueStore>(store: &S) -> Vec<WorkoutEntry> {
    store.get_records(WORKOUTS_KEY)
}

/// Workouts grouped Mon..Sun with their calorie estimate.
pub fn grouped<S: KeyValueStore>(store: &S) -> Vec<DayGroup<WorkoutView>> {
    let estimator = CalorieEstimator::from_store(store);
    let views = list(store)
        .into_iter()
        .map(|entry| WorkoutView {
            kcal: estimator.workout(&entry),
            entry,
        })
        .collect::<Vec<_>>();
    group_by_day(views)
}

pub fn add_scheduled<S: KeyValueStore>(store: &mut S, draft: WorkoutDraft) -> Result<WorkoutEntry, AppError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("workout name is required"));
    }
    let duration = positive_minutes(draft.duration)
        .ok_or_else(|| AppError::bad_request("duration must be a positive number of minutes"))?;
    let day = draft
        .day
        .ok_or_else(|| AppError::bad_request("day must be one of Mon..Sun"))?;

    let entry = WorkoutEntry {
        id: new_id(),
        name: name.to_string(),
        duration,
        day,
        date: None,
        done: false,
    };
    append(store, entry)
}

/// Records a finished timer session as a completed workout tagged with the
/// local weekday of `now`.
pub fn add_completed_from_session<S, Tz>(
    store: &mut S,
    name: &str,
    duration: u32,
    now: &DateTime<Tz>,
) -> Result<WorkoutEntry, AppError>
where
    S: KeyValueStore,
    Tz: TimeZone,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("workout name is required"));
    }
    if duration == 0 {
        return Err(AppError::bad_request("session has no recorded time"));
    }

    let entry = WorkoutEntry {
        id: new_id(),
        name: name.to_string(),
        duration,
        day: now.weekday(),
        date: Some(now.with_timezone(&Utc)),
        done: true,
    };
    append(store, entry)
}

/// Flips completion. Unknown ids leave the store untouched and yield `None`.
pub fn toggle_done<S, Tz>(store: &mut S, id: &str, now: &DateTime<Tz>) -> Result<Option<WorkoutEntry>, AppError>
where
    S: KeyValueStore,
    Tz: TimeZone,
{
    let mut workouts = list(store);
    let Some(entry) = workouts.iter_mut().find(|w| w.id == id) else {
        debug!("toggle ignored, no workout with id {id}");
        return Ok(None);
    };

    entry.done = !entry.done;
    entry.date = entry.done.then(|| now.with_timezone(&Utc));
    let updated = entry.clone();

    store.set(WORKOUTS_KEY, &workouts)?;
    debug!(id, done = updated.done, "workout toggled");
    Ok(Some(updated))
}

/// Returns whether a workout was removed.
pub fn delete<S: KeyValueStore>(store: &mut S, id: &str) -> Result<bool, AppError> {
    let mut workouts = list(store);
    let before = workouts.len();
    workouts.retain(|w| w.id != id);
    if workouts.len() == before {
        return Ok(false);
    }
    store.set(WORKOUTS_KEY, &workouts)?;
    debug!(id, "workout deleted");
    Ok(true)
}

fn append<S: KeyValueStore>(store: &mut S, entry: WorkoutEntry) -> Result<WorkoutEntry, AppError> {
    let mut workouts = list(store);
    workouts.push(entry.clone());
    store.set(WORKOUTS_KEY, &workouts)?;
    debug!(id = %entry.id, name = %entry.name, done = entry.done, "workout added");
    Ok(entry)
}

fn positive_minutes(value: Option<i64>) -> Option<u32> {
    value
        .filter(|minutes| *minutes > 0)
        .and_then(|minutes| u32::try_from(minutes).ok())
}
