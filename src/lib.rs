pub mod app;
pub mod calories;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod meals;
pub mod metabolic;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
pub mod timers;
pub mod water;
pub mod workouts;

pub use app::router;
pub use state::AppState;
pub use storage::{load_store, resolve_data_path, seed_defaults};
pub use store::{JsonStore, KeyValueStore};
