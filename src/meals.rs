use crate::errors::AppError;
use crate::ledger::{group_by_day, new_id};
use crate::models::{DayGroup, MealDraft, MealEntry};
use crate::store::{KeyValueStore, MEALS_KEY};
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

pub fn list<S: KeyValueStore>(store: &S) -> Vec<MealEntry> {
    store.get_records(MEALS_KEY)
}

pub fn grouped<S: KeyValueStore>(store: &S) -> Vec<DayGroup<MealEntry>> {
    group_by_day(list(store))
}

/// Meals are never edited in place; a correction is a delete and a new add.
pub fn add<S, Tz>(store: &mut S, draft: MealDraft, now: &DateTime<Tz>) -> Result<MealEntry, AppError>
where
    S: KeyValueStore,
    Tz: TimeZone,
{
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("meal name is required"));
    }
    let cals = draft
        .cals
        .and_then(|cals| u32::try_from(cals).ok())
        .ok_or_else(|| AppError::bad_request("calories must be a non-negative whole number"))?;
    let day = draft
        .day
        .ok_or_else(|| AppError::bad_request("day must be one of Mon..Sun"))?;

    let entry = MealEntry {
        id: new_id(),
        name: name.to_string(),
        cals,
        day,
        date: now.with_timezone(&Utc),
    };

    let mut meals = list(store);
    meals.push(entry.clone());
    store.set(MEALS_KEY, &meals)?;
    debug!(id = %entry.id, cals, "meal added");
    Ok(entry)
}

pub fn delete<S: KeyValueStore>(store: &mut S, id: &str) -> Result<bool, AppError> {
    let mut meals = list(store);
    let before = meals.len();
    meals.retain(|m| m.id != id);
    if meals.len() == before {
        debug!("delete ignored, no meal with id {id}");
        return Ok(false);
    }
    store.set(MEALS_KEY, &meals)?;
    debug!(id, "meal deleted");
    Ok(true)
}
