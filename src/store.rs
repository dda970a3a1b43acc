use crate::errors::AppError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const PROFILE_KEY: &str = "profile";
pub const GOALS_KEY: &str = "goals";
pub const WORKOUTS_KEY: &str = "workouts";
pub const MEALS_KEY: &str = "meals";
pub const WATER_KEY: &str = "waterLog";

/// String-keyed store of JSON values. Modules receive it explicitly and
/// never keep references into it.
pub trait KeyValueStore {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Returns `fallback` when the key is missing or its value does not
    /// decode as `T`.
    fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T
    where
        Self: Sized,
    {
        let Some(value) = self.get_value(key) else {
            return fallback;
        };
        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("stored value under '{key}' is malformed, using default: {err}");
                fallback
            }
        }
    }

    /// Decodes a stored list one record at a time. Records that fail to
    /// decode are skipped and logged; the rest are kept.
    fn get_records<T: DeserializeOwned>(&self, key: &str) -> Vec<T>
    where
        Self: Sized,
    {
        let records = match self.get_value(key) {
            Some(Value::Array(records)) => records,
            Some(_) => {
                warn!("stored value under '{key}' is not a list, using empty list");
                return Vec::new();
            }
            None => return Vec::new(),
        };
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!("skipping malformed record {index} under '{key}': {err}");
                    None
                }
            })
            .collect()
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AppError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value);
        Ok(())
    }
}

/// In-memory store, serialized as one JSON object per data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonStore {
    entries: BTreeMap<String, Value>,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

}

impl KeyValueStore for JsonStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
