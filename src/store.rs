//! Persistence for the three journal collections.
//!
//! Each collection lives under a fixed identifier as one JSON document.
//! Loading never fails on bad data. Records that do not decode are skipped
//! one by one; a document that is not JSON at all yields the empty collection.

use std::{
    fs,
    io,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub const NEWS_KEY: &str = "trading-journal-news";
pub const TRADES_KEY: &str = "trading-journal-trades";
pub const PLANS_KEY: &str = "trading-journal-plans";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store encode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Store<T> {
    fn load(&self) -> T;
    fn save(&mut self, value: &T) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

fn decode<T: DeserializeOwned + Default>(key: &str, text: &str) -> T {
    let err = match serde_json::from_str(text) {
        Ok(v) => return v,
        Err(e) => e,
    };
    let Ok(doc) = serde_json::from_str::<Value>(text) else {
        warn!(key = %key, "discarding unreadable stored data: {err}");
        return T::default();
    };
    let (kept, dropped) = salvage(doc);
    warn!(key = %key, dropped = dropped, "skipped unreadable stored records: {err}");
    kept
}

/// Keep every record of an array or map document that decodes on its own.
fn salvage<T: DeserializeOwned + Default>(doc: Value) -> (T, usize) {
    let (kept, dropped) = match doc {
        Value::Array(items) => {
            let total = items.len();
            let good: Vec<Value> = items
                .into_iter()
                .filter(|item| serde_json::from_value::<T>(Value::Array(vec![item.clone()])).is_ok())
                .collect();
            let dropped = total - good.len();
            (Value::Array(good), dropped)
        }
        Value::Object(entries) => {
            let total = entries.len();
            let good: Map<String, Value> = entries
                .into_iter()
                .filter(|(k, v)| {
                    let single = Map::from_iter([(k.clone(), v.clone())]);
                    serde_json::from_value::<T>(Value::Object(single)).is_ok()
                })
                .collect();
            let dropped = total - good.len();
            (Value::Object(good), dropped)
        }
        _ => return (T::default(), 1),
    };
    (serde_json::from_value(kept).unwrap_or_default(), dropped)
}

/// `<dir>/<key>.json` on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    key: String,
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            key: key.to_string(),
            path: dir.as_ref().join(format!("{key}.json")),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T: Serialize + DeserializeOwned + Default> Store<T> for JsonFileStore<T> {
    fn load(&self) -> T {
        match fs::read_to_string(&self.path) {
            Ok(s) => decode(&self.key, &s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => T::default(),
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read store: {e}");
                T::default()
            }
        }
    }

    fn save(&mut self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let s = serde_json::to_string_pretty(value)?;
        fs::write(&self.path, s).map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// Keeps the encoded document in memory. Used by tests and throwaway sessions.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    key: String,
    text: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            text: None,
            _marker: PhantomData,
        }
    }

    /// Start from an already-encoded document.
    pub fn with_text(key: &str, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(key)
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl<T: Serialize + DeserializeOwned + Default> Store<T> for MemoryStore<T> {
    fn load(&self) -> T {
        self.text
            .as_deref()
            .map(|s| decode(&self.key, s))
            .unwrap_or_default()
    }

    fn save(&mut self, value: &T) -> Result<(), StoreError> {
        self.text = Some(serde_json::to_string(value)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.text = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::WeeklyPlans;
    use crate::types::{NewsEvent, Trade};

    fn event(name: &str) -> NewsEvent {
        NewsEvent {
            id: format!("id-{name}"),
            date: "2025-03-05".into(),
            event: name.into(),
            ..Default::default()
        }
    }

    // ---------- file store ----------

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store: JsonFileStore<Vec<NewsEvent>> =
            JsonFileStore::new(dir.path().join("nested"), NEWS_KEY);
        assert!(store.load().is_empty());

        let data = vec![event("CPI m/m"), event("PPI m/m")];
        store.save(&data).unwrap();
        assert!(store.path().ends_with("trading-journal-news.json"));
        assert_eq!(store.load(), data);

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn file_store_saves_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store: JsonFileStore<Vec<NewsEvent>> = JsonFileStore::new(dir.path(), NEWS_KEY);
        store.save(&vec![event("GDP")]).unwrap();
        store.save(&Vec::new()).unwrap();
        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Vec<NewsEvent>> = JsonFileStore::new(dir.path(), NEWS_KEY);
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn one_bad_record_does_not_drop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Vec<Trade>> = JsonFileStore::new(dir.path(), TRADES_KEY);
        fs::write(
            store.path(),
            r#"[
                {"id": "a", "symbol": "ES", "pnl": "", "pnl": "500"},
                {"id": "b", "symbol": {"nested": true}},
                {"id": "c", "symbol": "NQ"}
            ]"#,
        )
        .unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].pnl_value(), 500.0);
        assert_eq!(loaded[1].symbol, "NQ");
    }

    #[test]
    fn bad_plan_entry_is_skipped() {
        let store: MemoryStore<WeeklyPlans> = MemoryStore::with_text(
            PLANS_KEY,
            r#"{"2025-03-03-target": {"Monday": "Old Lows"}, "2025-03-03-notes": 7}"#,
        );
        let plans = store.load();
        assert_eq!(plans.get_plan("2025-03-03", "target").len(), 1);
        assert!(plans.get_plan("2025-03-03", "notes").is_empty());
    }

    // ---------- memory store ----------

    #[test]
    fn memory_store_accepts_legacy_records() {
        let store: MemoryStore<Vec<NewsEvent>> =
            MemoryStore::with_text(NEWS_KEY, r#"[{"id": 1700000000000, "event": "NFP"}]"#);
        let loaded = store.load();
        assert_eq!(loaded[0].id, "1700000000000");
        assert_eq!(loaded[0].event, "NFP");
    }

    #[test]
    fn memory_store_save_and_clear() {
        let mut store: MemoryStore<Vec<NewsEvent>> = MemoryStore::new(NEWS_KEY);
        store.save(&vec![event("GDP")]).unwrap();
        assert!(store.text().is_some());
        assert_eq!(store.load().len(), 1);
        store.clear().unwrap();
        assert!(store.text().is_none());
        assert!(store.load().is_empty());
    }
}
