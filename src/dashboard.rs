use crate::calories::{CalorieEstimator, round_half_up};
use crate::ledger::WEEK;
use crate::metabolic::{load_goals, load_profile};
use crate::models::{DashboardSummary, GoalProgress, Goals, MealEntry, Tip, WeeklySeries, WorkoutEntry};
use crate::store::KeyValueStore;
use crate::{meals, workouts};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;

const WINDOW_DAYS: i64 = 7;
const HIGH_INTAKE_KCAL: u32 = 2000;
const LOW_BURN_KCAL: u32 = 150;
const CONSISTENT_WORKOUTS: usize = 3;

pub fn build_dashboard<S: KeyValueStore>(store: &S) -> DashboardSummary {
    build_dashboard_at(&Local::now(), store)
}

/// Recomputes every figure from the store; nothing is cached between calls.
pub fn build_dashboard_at<S, Tz>(now: &DateTime<Tz>, store: &S) -> DashboardSummary
where
    S: KeyValueStore,
    Tz: TimeZone,
{
    let workouts = workouts::list(store);
    let meals = meals::list(store);
    let goals = load_goals(store);
    let profile = load_profile(store);
    let estimator = CalorieEstimator::new(profile.weight_kg());

    let weekly = weekly_series(now, &workouts, &meals, &estimator);
    let total_consumed = saturating_total(&weekly.consumed);
    let total_burned = saturating_total(&weekly.burned);
    let completed_workouts = workouts.iter().filter(|w| w.done).count();

    let today = now.date_naive();
    let streak_days = streak(
        today,
        workouts
            .iter()
            .filter(|w| w.done)
            .filter_map(|w| w.date)
            .map(|date| date.with_timezone(&now.timezone()).date_naive()),
    );

    let progress = goal_progress(&goals, total_burned, completed_workouts, total_consumed);
    let tip = pick_tip(total_consumed, total_burned, completed_workouts, &goals);
    let greeting = match profile.first_name() {
        Some(name) => format!("Hi {name}, here is your weekly summary"),
        None => "Weekly Summary".to_string(),
    };

    DashboardSummary {
        greeting,
        total_workouts: workouts.len(),
        completed_workouts,
        streak_days,
        weekly,
        total_consumed,
        total_burned,
        goals,
        progress,
        tip,
        tip_message: tip.message().to_string(),
    }
}

/// Per-weekday sums over the trailing seven days. Workouts count only once
/// completed.
pub fn weekly_series<Tz: TimeZone>(
    now: &DateTime<Tz>,
    workouts: &[WorkoutEntry],
    meals: &[MealEntry],
    estimator: &CalorieEstimator,
) -> WeeklySeries {
    let cutoff = now.with_timezone(&Utc) - Duration::days(WINDOW_DAYS);
    let mut consumed = [0u32; 7];
    let mut burned = [0u32; 7];

    for meal in meals.iter().filter(|m| m.date >= cutoff) {
        let slot = meal.day.num_days_from_monday() as usize;
        consumed[slot] = consumed[slot].saturating_add(meal.cals);
    }
    for workout in workouts.iter().filter(|w| w.done) {
        let Some(date) = workout.date else { continue };
        if date < cutoff {
            continue;
        }
        let slot = workout.day.num_days_from_monday() as usize;
        burned[slot] = burned[slot].saturating_add(estimator.workout(workout));
    }

    WeeklySeries {
        labels: WEEK.to_vec(),
        consumed,
        burned,
    }
}

/// Consecutive days with a completed workout, counting back from `today`.
/// A day without one ends the streak.
pub fn streak(today: NaiveDate, completed_on: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let days: BTreeSet<NaiveDate> = completed_on.into_iter().collect();
    let mut count = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        count += 1;
        cursor = day.pred_opt();
    }
    count
}

pub fn goal_progress(goals: &Goals, burned: u32, completed: usize, consumed: u32) -> GoalProgress {
    GoalProgress {
        burn_pct: percent(f64::from(burned), goals.burn),
        workout_pct: percent(completed as f64, goals.workouts),
        calorie_pct: percent(f64::from(consumed), goals.cals),
    }
}

/// First matching rule wins.
pub fn pick_tip(consumed: u32, burned: u32, completed: usize, goals: &Goals) -> Tip {
    if consumed > HIGH_INTAKE_KCAL {
        Tip::Moderation
    } else if burned < LOW_BURN_KCAL {
        Tip::LightActivity
    } else if completed >= CONSISTENT_WORKOUTS {
        Tip::Encouragement
    } else if f64::from(burned) < goals.burn / 7.0 {
        Tip::CatchUp
    } else {
        Tip::Motivation
    }
}

fn saturating_total(days: &[u32; 7]) -> u32 {
    days.iter().fold(0, |total, kcal| total.saturating_add(*kcal))
}

fn percent(value: f64, target: f64) -> u32 {
    let target = if target.is_finite() && target > 0.0 { target } else { 1.0 };
    round_half_up(100.0 * value / target) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GOALS_KEY, JsonStore, MEALS_KEY, WORKOUTS_KEY};
    use chrono::{FixedOffset, Weekday};

    fn now() -> DateTime<Utc> {
        // Thursday afternoon
        Utc.with_ymd_and_hms(2026, 4, 16, 15, 0, 0).unwrap()
    }

    fn done(id: &str, name: &str, minutes: u32, day: Weekday, date: DateTime<Utc>) -> WorkoutEntry {
        WorkoutEntry {
            id: id.into(),
            name: name.into(),
            duration: minutes,
            day,
            date: Some(date),
            done: true,
        }
    }

    fn meal(id: &str, cals: u32, day: Weekday, date: DateTime<Utc>) -> MealEntry {
        MealEntry {
            id: id.into(),
            name: "Meal".into(),
            cals,
            day,
            date,
        }
    }

    #[test]
    fn streak_breaks_at_first_gap() {
        let today = now().date_naive();
        let dates = [
            today,
            today - Duration::days(1),
            today - Duration::days(3),
            today,
        ];
        assert_eq!(streak(today, dates), 2);
    }

    #[test]
    fn streak_is_zero_without_workout_today() {
        let today = now().date_naive();
        assert_eq!(streak(today, [today - Duration::days(1)]), 0);
        assert_eq!(streak(today, std::iter::empty()), 0);
    }

    #[test]
    fn streak_uses_local_calendar_days() {
        // 23:30 UTC on the 15th is already the 16th at UTC+2.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = now().with_timezone(&offset);
        let mut store = JsonStore::new();
        let late = Utc.with_ymd_and_hms(2026, 4, 15, 23, 30, 0).unwrap();
        store
            .set(WORKOUTS_KEY, &vec![done("a", "Yoga", 20, Weekday::Thu, late)])
            .unwrap();

        assert_eq!(build_dashboard_at(&local_now, &store).streak_days, 1);
        assert_eq!(build_dashboard_at(&now(), &store).streak_days, 0);
    }

    #[test]
    fn weekly_series_skips_old_and_unfinished_entries() {
        let estimator = CalorieEstimator::new(70.0);
        let recent = now() - Duration::days(2);
        let stale = now() - Duration::days(8);
        let workouts = vec![
            done("a", "Running (10 km/h)", 30, Weekday::Tue, recent),
            done("b", "Running (10 km/h)", 30, Weekday::Tue, stale),
            WorkoutEntry {
                id: "c".into(),
                name: "HIIT".into(),
                duration: 40,
                day: Weekday::Wed,
                date: None,
                done: false,
            },
        ];
        let meals = vec![
            meal("m1", 600, Weekday::Mon, recent),
            meal("m2", 400, Weekday::Mon, recent),
            meal("m3", 900, Weekday::Sun, stale),
        ];

        let series = weekly_series(&now(), &workouts, &meals, &estimator);
        assert_eq!(series.labels.len(), 7);
        assert_eq!(series.consumed, [1000, 0, 0, 0, 0, 0, 0]);
        assert_eq!(series.burned, [0, 360, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn zero_goals_do_not_divide_by_zero() {
        let goals = Goals {
            burn: 0.0,
            workouts: 0.0,
            cals: f64::NAN,
        };
        let progress = goal_progress(&goals, 300, 2, 1500);
        assert_eq!(
            progress,
            GoalProgress {
                burn_pct: 30_000,
                workout_pct: 200,
                calorie_pct: 150_000,
            }
        );
    }

    #[test]
    fn progress_may_exceed_one_hundred() {
        let goals = Goals {
            burn: 1000.0,
            workouts: 4.0,
            cals: 14_000.0,
        };
        let progress = goal_progress(&goals, 1500, 5, 7000);
        assert_eq!(progress.burn_pct, 150);
        assert_eq!(progress.workout_pct, 125);
        assert_eq!(progress.calorie_pct, 50);
    }

    #[test]
    fn tips_follow_priority_order() {
        let goals = Goals::default();
        assert_eq!(pick_tip(2500, 0, 5, &goals), Tip::Moderation);
        assert_eq!(pick_tip(1000, 100, 5, &goals), Tip::LightActivity);
        assert_eq!(pick_tip(1000, 200, 3, &goals), Tip::Encouragement);
        // 1500 / 7 ~ 214
        assert_eq!(pick_tip(1000, 200, 1, &goals), Tip::CatchUp);
        assert_eq!(pick_tip(1000, 400, 1, &goals), Tip::Motivation);
    }

    #[test]
    fn huge_meal_totals_saturate() {
        let mut store = JsonStore::new();
        let recent = now() - Duration::hours(1);
        store
            .set(
                MEALS_KEY,
                &vec![
                    meal("m1", 3_000_000_000, Weekday::Mon, recent),
                    meal("m2", 3_000_000_000, Weekday::Tue, recent),
                ],
            )
            .unwrap();

        let summary = build_dashboard_at(&now(), &store);
        assert_eq!(summary.weekly.consumed[0], 3_000_000_000);
        assert_eq!(summary.total_consumed, u32::MAX);
        assert_eq!(summary.tip, Tip::Moderation);
    }

    #[test]
    fn dashboard_is_idempotent() {
        let mut store = JsonStore::new();
        let recent = now() - Duration::hours(3);
        store
            .set(WORKOUTS_KEY, &vec![done("a", "HIIT", 30, Weekday::Thu, recent)])
            .unwrap();
        store
            .set(MEALS_KEY, &vec![meal("m", 700, Weekday::Thu, recent)])
            .unwrap();
        store.set(GOALS_KEY, &Goals::default()).unwrap();

        let first = build_dashboard_at(&now(), &store);
        let second = build_dashboard_at(&now(), &store);
        assert_eq!(first, second);
        assert_eq!(first.streak_days, 1);
        assert_eq!(first.total_consumed, 700);
        // 30 * 8 * 3.5 * 70 / 200 = 294
        assert_eq!(first.total_burned, 294);
        assert_eq!(first.greeting, "Weekly Summary");
        assert_eq!(first.tip, Tip::Motivation);
    }
}
