use crate::errors::AppError;
use crate::metabolic;
use crate::models::{Goals, Profile, WaterLog};
use crate::store::{GOALS_KEY, JsonStore, KeyValueStore, PROFILE_KEY, WATER_KEY};
use chrono::Local;
use std::ffi::OsString;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

const DEFAULT_DATA_PATH: &str = "data/state.json";

/// Where the in-memory store came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    File,
    /// First run, no data file yet.
    Missing,
    /// The file exists but could not be read or decoded.
    Unreadable,
}

pub fn resolve_data_path() -> PathBuf {
    env::var_os("APP_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

pub async fn load_store(path: &Path) -> (JsonStore, StoreSource) {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (JsonStore::default(), StoreSource::Missing);
        }
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            return (JsonStore::default(), StoreSource::Unreadable);
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(store) => (store, StoreSource::File),
        Err(err) => {
            error!("failed to parse {}: {err}", path.display());
            (JsonStore::default(), StoreSource::Unreadable)
        }
    }
}

/// Moves an unreadable data file aside so the next write does not destroy it.
pub async fn back_up_unreadable(path: &Path) -> Result<PathBuf, AppError> {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let backup = with_suffix(path, &format!(".{stamp}.bak"));
    fs::rename(path, &backup).await?;
    info!("moved unreadable data file to {}", backup.display());
    Ok(backup)
}

/// Writes through a temporary sibling and renames it into place, so a crash
/// mid-write leaves the previous file intact.
pub async fn persist_store(path: &Path, store: &JsonStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store)?;
    let staging = with_suffix(path, ".tmp");
    fs::write(&staging, payload).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Writes the first-run singletons. Returns whether anything was added.
pub fn seed_defaults<S: KeyValueStore>(store: &mut S) -> Result<bool, AppError> {
    let mut seeded = false;
    if !store.contains(PROFILE_KEY) {
        metabolic::save_profile(store, &Profile::default())?;
        seeded = true;
    }
    if !store.contains(GOALS_KEY) {
        store.set(GOALS_KEY, &Goals::default())?;
        seeded = true;
    }
    if !store.contains(WATER_KEY) {
        store.set(WATER_KEY, &WaterLog::default())?;
        seeded = true;
    }
    if seeded {
        info!("seeded default profile, goals and water log");
    }
    Ok(seeded)
}
