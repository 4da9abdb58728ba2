use crate::StoreError;
use chrono::{DateTime, Local, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub mod keys;
pub mod memory;

/// A synchronous string key/value store scoped to one installation.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Store for contexts with no persistence at all; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Source of "today" for date keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    Local,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Fixed(d) => *d,
        }
    }

    pub fn today_key(&self) -> String {
        date_key(self.today())
    }
}

/// Zero-padded `YYYY-MM-DD`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date key from the local calendar fields of `reference`, no UTC normalization.
pub fn today_date_key(reference: DateTime<Local>) -> String {
    date_key(reference.date_naive())
}

/// Typed access to a [`KeyValueStore`] that never fails: reads fall back,
/// writes report success as a boolean.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            clock: Clock::Local,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(Arc::new(UnavailableStore))
    }

    /// Same backend, different clock.
    pub fn with_clock(&self, clock: Clock) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            clock,
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn today_key(&self) -> String {
        self.clock.today_key()
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(raw) = self.read_raw(key) else {
            return fallback;
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "stored value failed to parse; using fallback");
                fallback
            }
        }
    }

    /// Untyped read for values that go through normalization before use.
    pub fn read_document(&self, key: &str) -> Option<serde_json::Value> {
        self.read(key, None)
    }

    pub fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => Some(raw),
            Ok(_) => None,
            Err(e) => {
                debug!(key, error = %e, "read failed");
                None
            }
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.write_raw(key, &raw),
            Err(e) => {
                warn!(key, error = %e, "value failed to serialize");
                false
            }
        }
    }

    pub fn write_raw(&self, key: &str, raw: &str) -> bool {
        match self.backend.set(key, raw) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "write failed; keeping in-memory state only");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            debug!(key, error = %e, "remove failed");
        }
    }
}
