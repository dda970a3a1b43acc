use crate::calories::{CalorieEstimator, exercise_options};
use crate::dashboard::build_dashboard;
use crate::errors::AppError;
use crate::metabolic::{self, compute_bmi, compute_metabolics, load_goals, load_profile};
use crate::models::{
    BmiReading, BmiRequest, ConfirmRequest, CountdownStartRequest, DashboardSummary, DayGroup, Goals,
    MealDraft, MealEntry, Profile, ProfileResponse, StopwatchStartRequest, TimerDisplay, WaterGoalRequest,
    WaterIntakeRequest, WaterStatus, WorkoutDraft, WorkoutEntry, WorkoutView,
};
use crate::state::AppState;
use crate::store::JsonStore;
use crate::storage::persist_store;
use crate::{meals, water, workouts};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Local, NaiveDate};

pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    let store = state.store.lock().await;
    let profile = load_profile(&*store);
    let metabolics = compute_metabolics(&profile);
    Json(ProfileResponse { profile, metabolics })
}

pub async fn save_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut store = state.store.lock().await;
    let metabolics = metabolic::save_profile(&mut *store, &profile)?;
    commit(&state, &store).await?;
    Ok(Json(ProfileResponse {
        profile: load_profile(&*store),
        metabolics,
    }))
}

pub async fn get_goals(State(state): State<AppState>) -> Json<Goals> {
    let store = state.store.lock().await;
    Json(load_goals(&*store))
}

pub async fn save_goals(State(state): State<AppState>, Json(goals): Json<Goals>) -> Result<Json<Goals>, AppError> {
    let mut store = state.store.lock().await;
    let saved = metabolic::save_goals(&mut *store, goals)?;
    commit(&state, &store).await?;
    Ok(Json(saved))
}

pub async fn bmi(Json(request): Json<BmiRequest>) -> Result<Json<BmiReading>, AppError> {
    compute_bmi(request.weight, request.weight_unit, request.height, request.height_unit)
        .map(Json)
        .ok_or_else(|| AppError::bad_request("enter a positive weight and height"))
}

pub async fn list_workouts(State(state): State<AppState>) -> Json<Vec<DayGroup<WorkoutView>>> {
    let store = state.store.lock().await;
    Json(workouts::grouped(&*store))
}

pub async fn add_workout(
    State(state): State<AppState>,
    Json(draft): Json<WorkoutDraft>,
) -> Result<Json<WorkoutEntry>, AppError> {
    let mut store = state.store.lock().await;
    let entry = workouts::add_scheduled(&mut *store, draft)?;
    commit(&state, &store).await?;
    Ok(Json(entry))
}

pub async fn toggle_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutEntry>, AppError> {
    let mut store = state.store.lock().await;
    let entry = workouts::toggle_done(&mut *store, &id, &Local::now())?
        .ok_or_else(|| AppError::not_found(format!("no workout with id {id}")))?;
    commit(&state, &store).await?;
    Ok(Json(entry))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(confirm): Query<ConfirmRequest>,
) -> Result<StatusCode, AppError> {
    require_confirmation(confirm, "deleting a workout")?;
    let mut store = state.store.lock().await;
    if !workouts::delete(&mut *store, &id)? {
        return Err(AppError::not_found(format!("no workout with id {id}")));
    }
    commit(&state, &store).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_meals(State(state): State<AppState>) -> Json<Vec<DayGroup<MealEntry>>> {
    let store = state.store.lock().await;
    Json(meals::grouped(&*store))
}

pub async fn add_meal(State(state): State<AppState>, Json(draft): Json<MealDraft>) -> Result<Json<MealEntry>, AppError> {
    let mut store = state.store.lock().await;
    let entry = meals::add(&mut *store, draft, &Local::now())?;
    commit(&state, &store).await?;
    Ok(Json(entry))
}

pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(confirm): Query<ConfirmRequest>,
) -> Result<StatusCode, AppError> {
    require_confirmation(confirm, "deleting a meal")?;
    let mut store = state.store.lock().await;
    if !meals::delete(&mut *store, &id)? {
        return Err(AppError::not_found(format!("no meal with id {id}")));
    }
    commit(&state, &store).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_water(State(state): State<AppState>) -> Json<WaterStatus> {
    let store = state.store.lock().await;
    Json(water::status(&*store, today()))
}

pub async fn water_intake(
    State(state): State<AppState>,
    Json(request): Json<WaterIntakeRequest>,
) -> Result<Json<WaterStatus>, AppError> {
    let mut store = state.store.lock().await;
    let status = water::add_intake(&mut *store, request.amount, today())?;
    commit(&state, &store).await?;
    Ok(Json(status))
}

pub async fn water_goal(
    State(state): State<AppState>,
    Json(request): Json<WaterGoalRequest>,
) -> Result<Json<WaterStatus>, AppError> {
    let mut store = state.store.lock().await;
    let status = water::set_goal(&mut *store, request.goal, today())?;
    commit(&state, &store).await?;
    Ok(Json(status))
}

pub async fn water_reset(
    State(state): State<AppState>,
    Json(confirm): Json<ConfirmRequest>,
) -> Result<Json<WaterStatus>, AppError> {
    require_confirmation(confirm, "resetting today's water intake")?;
    let mut store = state.store.lock().await;
    let status = water::reset_today(&mut *store, today())?;
    commit(&state, &store).await?;
    Ok(Json(status))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    let store = state.store.lock().await;
    Json(build_dashboard(&*store))
}

pub async fn get_exercises(State(state): State<AppState>) -> Json<Vec<String>> {
    let store = state.store.lock().await;
    Json(exercise_options(&*store))
}

pub async fn countdown_tick(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    Json(timers.countdown.tick(&Local::now(), &estimator))
}

pub async fn countdown_start(
    State(state): State<AppState>,
    Json(request): Json<CountdownStartRequest>,
) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    let now = Local::now();
    timers.countdown.start(request.minutes, request.exercise, &now);
    Json(timers.countdown.tick(&now, &estimator))
}

pub async fn countdown_pause(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    let now = Local::now();
    timers.countdown.pause(&now);
    Json(timers.countdown.tick(&now, &estimator))
}

pub async fn countdown_resume(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    let now = Local::now();
    timers.countdown.resume(&now);
    Json(timers.countdown.tick(&now, &estimator))
}

pub async fn countdown_reset(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    timers.countdown.reset();
    Json(timers.countdown.tick(&Local::now(), &estimator))
}

pub async fn countdown_save(
    State(state): State<AppState>,
    Json(confirm): Json<ConfirmRequest>,
) -> Result<Json<WorkoutEntry>, AppError> {
    let mut store = state.store.lock().await;
    let mut timers = state.timers.lock().await;
    let entry = timers.countdown.save(&mut *store, &Local::now(), confirm.confirm)?;
    commit(&state, &store).await?;
    Ok(Json(entry))
}

pub async fn stopwatch_tick(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    Json(timers.stopwatch.tick(&Local::now(), &estimator))
}

pub async fn stopwatch_start(
    State(state): State<AppState>,
    Json(request): Json<StopwatchStartRequest>,
) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    let now = Local::now();
    timers.stopwatch.start(request.exercise, &now);
    Json(timers.stopwatch.tick(&now, &estimator))
}

pub async fn stopwatch_pause(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    let now = Local::now();
    timers.stopwatch.pause(&now);
    Json(timers.stopwatch.tick(&now, &estimator))
}

pub async fn stopwatch_reset(State(state): State<AppState>) -> Json<TimerDisplay> {
    let estimator = current_estimator(&state).await;
    let mut timers = state.timers.lock().await;
    timers.stopwatch.reset();
    Json(timers.stopwatch.tick(&Local::now(), &estimator))
}

pub async fn stopwatch_save(
    State(state): State<AppState>,
    Json(confirm): Json<ConfirmRequest>,
) -> Result<Json<WorkoutEntry>, AppError> {
    let mut store = state.store.lock().await;
    let mut timers = state.timers.lock().await;
    let entry = timers.stopwatch.save(&mut *store, &Local::now(), confirm.confirm)?;
    commit(&state, &store).await?;
    Ok(Json(entry))
}

async fn commit(state: &AppState, store: &JsonStore) -> Result<(), AppError> {
    persist_store(&state.data_path, store).await
}

async fn current_estimator(state: &AppState) -> CalorieEstimator {
    let store = state.store.lock().await;
    CalorieEstimator::from_store(&*store)
}

fn require_confirmation(confirm: ConfirmRequest, action: &str) -> Result<(), AppError> {
    if confirm.confirm {
        Ok(())
    } else {
        Err(AppError::confirmation_required(format!("{action} requires confirm=true")))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
