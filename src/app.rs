use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/profile", get(handlers::get_profile).put(handlers::save_profile))
        .route("/api/goals", get(handlers::get_goals).put(handlers::save_goals))
        .route("/api/bmi", post(handlers::bmi))
        .route("/api/workouts", get(handlers::list_workouts).post(handlers::add_workout))
        .route("/api/workouts/:id/toggle", post(handlers::toggle_workout))
        .route("/api/workouts/:id", delete(handlers::delete_workout))
        .route("/api/meals", get(handlers::list_meals).post(handlers::add_meal))
        .route("/api/meals/:id", delete(handlers::delete_meal))
        .route("/api/water", get(handlers::get_water))
        .route("/api/water/intake", post(handlers::water_intake))
        .route("/api/water/goal", put(handlers::water_goal))
        .route("/api/water/reset", post(handlers::water_reset))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/exercises", get(handlers::get_exercises))
        .route("/api/timers/countdown", get(handlers::countdown_tick))
        .route("/api/timers/countdown/start", post(handlers::countdown_start))
        .route("/api/timers/countdown/pause", post(handlers::countdown_pause))
        .route("/api/timers/countdown/resume", post(handlers::countdown_resume))
        .route("/api/timers/countdown/reset", post(handlers::countdown_reset))
        .route("/api/timers/countdown/save", post(handlers::countdown_save))
        .route("/api/timers/stopwatch", get(handlers::stopwatch_tick))
        .route("/api/timers/stopwatch/start", post(handlers::stopwatch_start))
        .route("/api/timers/stopwatch/pause", post(handlers::stopwatch_pause))
        .route("/api/timers/stopwatch/reset", post(handlers::stopwatch_reset))
        .route("/api/timers/stopwatch/save", post(handlers::stopwatch_save))
        .with_state(state)
}
