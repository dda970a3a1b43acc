use crate::store::JsonStore;
use crate::timers::SessionTimers;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub store: Arc<Mutex<JsonStore>>,
    pub timers: Arc<Mutex<SessionTimers>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, store: JsonStore) -> Self {
        Self {
            data_path,
            store: Arc::new(Mutex::new(store)),
            timers: Arc::new(Mutex::new(SessionTimers::default())),
        }
    }
}
