//! Session timers. Callers advance them with the current instant.

use crate::calories::CalorieEstimator;
use crate::errors::AppError;
use crate::models::{TimerDisplay, WorkoutEntry};
use crate::store::KeyValueStore;
use crate::workouts;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::info;

pub const DEFAULT_COUNTDOWN_MINUTES: u64 = 20;
const COUNTDOWN_EXERCISE: &str = "Timer Session";
const STOPWATCH_EXERCISE: &str = "Stopwatch";

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    planned_secs: u64,
    /// Remaining time as of `resumed_at`, or as of the pause when stopped.
    remaining_secs: u64,
    resumed_at: Option<DateTime<Utc>>,
    exercise: String,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            planned_secs: 0,
            remaining_secs: 0,
            resumed_at: None,
            exercise: COUNTDOWN_EXERCISE.to_string(),
        }
    }
}

impl Countdown {
    /// Starts over from the full duration, even if a session was running.
    pub fn start<Tz: TimeZone>(&mut self, minutes: Option<i64>, exercise: Option<String>, now: &DateTime<Tz>) {
        let minutes = minutes
            .filter(|m| *m > 0)
            .map(|m| m as u64)
            .unwrap_or(DEFAULT_COUNTDOWN_MINUTES);
        self.planned_secs = minutes.saturating_mul(60);
        self.remaining_secs = self.planned_secs;
        self.resumed_at = Some(now.with_timezone(&Utc));
        self.exercise = pick_exercise(exercise, COUNTDOWN_EXERCISE);
        info!(minutes, exercise = %self.exercise, "countdown started");
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    pub fn remaining_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        match self.resumed_at {
            Some(resumed) => self
                .remaining_secs
                .saturating_sub(whole_seconds_between(resumed, now)),
            None => self.remaining_secs,
        }
    }

    pub fn elapsed_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        self.planned_secs.saturating_sub(self.remaining_at(now))
    }

    /// Advances to `now`. Reaching zero stops the countdown; only that tick
    /// reports `completed`.
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, estimator: &CalorieEstimator) -> TimerDisplay {
        let remaining = self.remaining_at(now);
        let completed = self.is_running() && remaining == 0;
        if completed {
            self.remaining_secs = 0;
            self.resumed_at = None;
            info!(exercise = %self.exercise, "countdown complete");
        }

        let elapsed_minutes = self.elapsed_at(now).div_ceil(60);
        TimerDisplay {
            running: self.is_running(),
            seconds: remaining,
            clock: clock(remaining),
            exercise: self.exercise.clone(),
            kcal: estimator.estimate(elapsed_minutes as f64, &self.exercise),
            completed,
        }
    }

    pub fn pause<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        self.remaining_secs = self.remaining_at(now);
        self.resumed_at = None;
    }

    pub fn resume<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        if !self.is_running() && self.remaining_secs > 0 {
            self.resumed_at = Some(now.with_timezone(&Utc));
        }
    }

    pub fn reset(&mut self) {
        self.planned_secs = 0;
        self.remaining_secs = 0;
        self.resumed_at = None;
    }

    /// Stores the elapsed part of the session as a completed workout. Saving
    /// before the countdown ran out needs `confirmed`.
    pub fn save<S, Tz>(&mut self, store: &mut S, now: &DateTime<Tz>, confirmed: bool) -> Result<WorkoutEntry, AppError>
    where
        S: KeyValueStore,
        Tz: TimeZone,
    {
        if self.remaining_at(now) > 0 && !confirmed {
            return Err(AppError::confirmation_required(
                "session not completed, confirm to save it anyway",
            ));
        }
        let minutes = whole_minutes(self.elapsed_at(now))?;
        let entry = workouts::add_completed_from_session(store, &self.exercise, minutes, now)?;
        self.reset();
        Ok(entry)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stopwatch {
    /// Elapsed time as of the last pause or tick.
    elapsed_secs: u64,
    /// Start instant shifted back by whatever had already elapsed.
    started_at: Option<DateTime<Utc>>,
    exercise: String,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self {
            elapsed_secs: 0,
            started_at: None,
            exercise: STOPWATCH_EXERCISE.to_string(),
        }
    }
}

impl Stopwatch {
    /// Starts or resumes counting. Does nothing while already running.
    pub fn start<Tz: TimeZone>(&mut self, exercise: Option<String>, now: &DateTime<Tz>) {
        if self.is_running() {
            return;
        }
        self.started_at = Some(now.with_timezone(&Utc) - Duration::seconds(self.elapsed_secs as i64));
        if exercise.is_some() {
            self.exercise = pick_exercise(exercise, STOPWATCH_EXERCISE);
        }
        info!(resumed_from = self.elapsed_secs, exercise = %self.exercise, "stopwatch started");
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        match self.started_at {
            Some(started) => whole_seconds_between(started, now),
            None => self.elapsed_secs,
        }
    }

    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>, estimator: &CalorieEstimator) -> TimerDisplay {
        self.elapsed_secs = self.elapsed_at(now);
        TimerDisplay {
            running: self.is_running(),
            seconds: self.elapsed_secs,
            clock: clock(self.elapsed_secs),
            exercise: self.exercise.clone(),
            kcal: estimator.estimate(self.elapsed_secs as f64 / 60.0, &self.exercise),
            completed: false,
        }
    }

    pub fn pause<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        self.elapsed_secs = self.elapsed_at(now);
        self.started_at = None;
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
        self.started_at = None;
    }

    pub fn save<S, Tz>(&mut self, store: &mut S, now: &DateTime<Tz>, confirmed: bool) -> Result<WorkoutEntry, AppError>
    where
        S: KeyValueStore,
        Tz: TimeZone,
    {
        let minutes = whole_minutes(self.elapsed_at(now))?;
        if !confirmed {
            return Err(AppError::confirmation_required("confirm to save this stopwatch session"));
        }
        let entry = workouts::add_completed_from_session(store, &self.exercise, minutes, now)?;
        self.reset();
        Ok(entry)
    }
}

/// Both controllers side by side; they never share state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTimers {
    pub countdown: Countdown,
    pub stopwatch: Stopwatch,
}

fn whole_seconds_between<Tz: TimeZone>(start: DateTime<Utc>, now: &DateTime<Tz>) -> u64 {
    now.with_timezone(&Utc)
        .signed_duration_since(start)
        .num_seconds()
        .max(0) as u64
}

fn whole_minutes(elapsed_secs: u64) -> Result<u32, AppError> {
    if elapsed_secs == 0 {
        return Err(AppError::bad_request("no time recorded"));
    }
    u32::try_from(elapsed_secs.div_ceil(60)).map_err(|_| AppError::bad_request("session is too long"))
}

fn pick_exercise(exercise: Option<String>, fallback: &str) -> String {
    exercise
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use axum::http::StatusCode;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 7, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    fn estimator() -> CalorieEstimator {
        CalorieEstimator::new(70.0)
    }

    #[test]
    fn countdown_counts_down_in_whole_seconds() {
        let mut countdown = Countdown::default();
        countdown.start(Some(1), Some("Jump Rope".into()), &t0());

        let display = countdown.tick(&at(15), &estimator());
        assert!(display.running);
        assert_eq!(display.seconds, 45);
        assert_eq!(display.clock, "00:45");
        // one started minute: 1 * 12 * 3.5 * 70 / 200 = 14.7
        assert_eq!(display.kcal, 15);
        assert!(!display.completed);
    }

    #[test]
    fn countdown_signals_completion_once() {
        let mut countdown = Countdown::default();
        countdown.start(Some(1), None, &t0());

        let display = countdown.tick(&at(75), &estimator());
        assert!(display.completed);
        assert!(!display.running);
        assert_eq!(display.clock, "00:00");

        let display = countdown.tick(&at(80), &estimator());
        assert!(!display.completed);
        assert_eq!(display.seconds, 0);
    }

    #[test]
    fn countdown_pause_preserves_remaining() {
        let mut countdown = Countdown::default();
        countdown.start(Some(2), None, &t0());
        countdown.pause(&at(30));

        assert_eq!(countdown.tick(&at(300), &estimator()).seconds, 90);

        countdown.resume(&at(300));
        assert_eq!(countdown.tick(&at(310), &estimator()).seconds, 80);
    }

    #[test]
    fn countdown_defaults_to_twenty_minutes() {
        let mut countdown = Countdown::default();
        countdown.start(None, None, &t0());
        assert_eq!(countdown.remaining_at(&t0()), 20 * 60);
        assert_eq!(countdown.exercise, "Timer Session");
    }

    #[test]
    fn countdown_reset_clears_display() {
        let mut countdown = Countdown::default();
        countdown.start(Some(5), None, &t0());
        countdown.reset();
        let display = countdown.tick(&at(10), &estimator());
        assert!(!display.running);
        assert_eq!(display.clock, "00:00");
        assert_eq!(display.kcal, 0);
    }

    #[test]
    fn early_countdown_save_needs_confirmation() {
        let mut store = JsonStore::new();
        let mut countdown = Countdown::default();
        countdown.start(Some(30), Some("HIIT".into()), &t0());

        let err = countdown.save(&mut store, &at(61), false).unwrap_err();
        assert_eq!(err.status, StatusCode::PRECONDITION_REQUIRED);
        assert!(workouts::list(&store).is_empty());

        let entry = countdown.save(&mut store, &at(61), true).unwrap();
        assert_eq!(entry.duration, 2);
        assert_eq!(entry.name, "HIIT");
        assert!(entry.done);
        assert_eq!(entry.date, Some(at(61)));
        assert!(!countdown.is_running());
        assert_eq!(countdown.remaining_at(&at(62)), 0);
    }

    #[test]
    fn finished_countdown_saves_without_confirmation() {
        let mut store = JsonStore::new();
        let mut countdown = Countdown::default();
        countdown.start(Some(3), Some("Yoga".into()), &t0());
        countdown.tick(&at(200), &estimator());

        let entry = countdown.save(&mut store, &at(200), false).unwrap();
        assert_eq!(entry.duration, 3);
        assert!(countdown.save(&mut store, &at(201), true).is_err());
    }

    #[test]
    fn stopwatch_resumes_without_drift() {
        let mut stopwatch = Stopwatch::default();
        stopwatch.start(Some("Running (10 km/h)".into()), &t0());
        stopwatch.pause(&at(90));
        stopwatch.start(None, &at(1000));

        let display = stopwatch.tick(&at(1030), &estimator());
        assert!(display.running);
        assert_eq!(display.seconds, 120);
        assert_eq!(display.clock, "02:00");
        // 2 * 9.8 * 3.5 * 70 / 200 = 24.01
        assert_eq!(display.kcal, 24);
        assert_eq!(display.exercise, "Running (10 km/h)");
    }

    #[test]
    fn stopwatch_start_while_running_is_ignored() {
        let mut stopwatch = Stopwatch::default();
        stopwatch.start(None, &t0());
        stopwatch.start(Some("Yoga".into()), &at(30));
        assert_eq!(stopwatch.elapsed_at(&at(40)), 40);
        assert_eq!(stopwatch.exercise, "Stopwatch");
    }

    #[test]
    fn stopwatch_uses_fractional_minutes_for_live_estimate() {
        let mut stopwatch = Stopwatch::default();
        stopwatch.start(Some("Jump Rope".into()), &t0());
        // 0.5 * 12 * 3.5 * 70 / 200 = 7.35
        assert_eq!(stopwatch.tick(&at(30), &estimator()).kcal, 7);
    }

    #[test]
    fn stopwatch_save_rounds_minutes_up() {
        let mut store = JsonStore::new();
        let mut stopwatch = Stopwatch::default();
        let err = stopwatch.save(&mut store, &t0(), true).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        stopwatch.start(Some("Bodyweight".into()), &t0());
        let err = stopwatch.save(&mut store, &at(301), false).unwrap_err();
        assert_eq!(err.status, StatusCode::PRECONDITION_REQUIRED);
        assert!(workouts::list(&store).is_empty());
        assert!(stopwatch.is_running());

        let entry = stopwatch.save(&mut store, &at(301), true).unwrap();
        assert_eq!(entry.duration, 6);
        assert!(entry.done);
        assert_eq!(stopwatch.elapsed_at(&at(400)), 0);
        assert_eq!(workouts::list(&store), vec![entry]);
    }
}
