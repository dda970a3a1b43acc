use crate::models::{DayGroup, MealEntry, WorkoutView};
use chrono::Weekday;
use uuid::Uuid;

/// Display order of the week. Entries are grouped by their tag, not by date.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub trait DayTagged {
    fn day(&self) -> Weekday;
}

impl DayTagged for WorkoutView {
    fn day(&self) -> Weekday {
        self.entry.day
    }
}

impl DayTagged for MealEntry {
    fn day(&self) -> Weekday {
        self.day
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Partitions entries Mon..Sun, skipping empty days and keeping insertion
/// order inside each day.
pub fn group_by_day<T: DayTagged>(entries: Vec<T>) -> Vec<DayGroup<T>> {
    let mut groups: Vec<DayGroup<T>> = WEEK
        .iter()
        .map(|&day| DayGroup {
            day,
            entries: Vec::new(),
        })
        .collect();
    for entry in entries {
        let slot = entry.day().num_days_from_monday() as usize;
        groups[slot].entries.push(entry);
    }
    groups.retain(|group| !group.entries.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn meal(id: &str, day: Weekday) -> MealEntry {
        MealEntry {
            id: id.into(),
            name: "Soup".into(),
            cals: 250,
            day,
            date: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn groups_follow_week_order() {
        let groups = group_by_day(vec![
            meal("a", Weekday::Sun),
            meal("b", Weekday::Mon),
            meal("c", Weekday::Sun),
            meal("d", Weekday::Wed),
        ]);

        let days: Vec<Weekday> = groups.iter().map(|g| g.day).collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]);
        let sunday: Vec<&str> = groups[2].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(sunday, vec!["a", "c"]);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
