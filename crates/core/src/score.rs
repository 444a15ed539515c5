//! Best-score record and its persistence policy.
//!
//! The record is ordered lexicographically: fewer moves wins, and on equal
//! moves the shorter time wins. Stores only ever keep the best record they
//! have been offered.
//!
//! Storage itself is an injected key-value backend. The record is kept as a
//! JSON object under [`BEST_SCORE_KEY`]:
//!
//! ```text
//! {"moves":12,"timeMs":48210}
//! ```
//!
//! Missing or unreadable values are treated as "no best score yet".

use std::cell::Cell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::types::{format_elapsed, BEST_SCORE_KEY};

/// Best game result seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BestScore {
    pub moves: u32,
    #[serde(rename = "timeMs")]
    pub time_ms: u64,
}

impl BestScore {
    pub fn new(moves: u32, time_ms: u64) -> Self {
        Self { moves, time_ms }
    }

    /// Strictly better: fewer moves, or equal moves in less time.
    pub fn is_better_than(&self, other: &BestScore) -> bool {
        (self.moves, self.time_ms) < (other.moves, other.time_ms)
    }

    /// Human-readable form, e.g. `"12 moves • 00:48"`.
    pub fn display(&self) -> String {
        format!("{} moves • {}", self.moves, format_elapsed(self.time_ms))
    }
}

/// Failure of a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode best score: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal string key-value backend (browser-style local storage).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Best-score persistence as seen by the game.
pub trait ScoreStore {
    /// Stored record, or `None` when absent or unreadable.
    fn load(&self) -> Option<BestScore>;

    /// Offer a finished game's result.
    ///
    /// Returns `true` if the candidate became the stored record.
    fn save(&mut self, candidate: BestScore) -> bool;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    fn load(&self) -> Option<BestScore> {
        (**self).load()
    }

    fn save(&mut self, candidate: BestScore) -> bool {
        (**self).save(candidate)
    }
}

/// In-memory key-value backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// [`ScoreStore`] that keeps the record as JSON text in a [`KeyValueStore`].
///
/// The decoded record is cached after the first read, so a malformed value is
/// parsed and reported once. Going through [`KvScoreStore::backend_mut`]
/// drops the cache.
#[derive(Debug, Clone)]
pub struct KvScoreStore<S> {
    backend: S,
    key: String,
    cached: Cell<Option<Option<BestScore>>>,
}

impl<S: KeyValueStore> KvScoreStore<S> {
    /// Store under the default [`BEST_SCORE_KEY`].
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, BEST_SCORE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            cached: Cell::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        self.cached.set(None);
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}

impl<S: KeyValueStore> ScoreStore for KvScoreStore<S> {
    fn load(&self) -> Option<BestScore> {
        if let Some(best) = self.cached.get() {
            return best;
        }
        let best = self.backend.get(&self.key).and_then(|raw| {
            match serde_json::from_str::<BestScore>(&raw) {
                Ok(best) => Some(best),
                Err(err) => {
                    warn!(key = %self.key, error = %err, "ignoring malformed best score");
                    None
                }
            }
        });
        self.cached.set(Some(best));
        best
    }

    fn save(&mut self, candidate: BestScore) -> bool {
        if let Some(current) = self.load() {
            if !candidate.is_better_than(&current) {
                return false;
            }
        }

        let encoded = match serde_json::to_string(&candidate) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %StoreError::from(err), "best score not saved");
                return false;
            }
        };

        match self.backend.set(&self.key, encoded) {
            Ok(()) => {
                self.cached.set(Some(Some(candidate)));
                true
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "best score not saved");
                false
            }
        }
    }
}

/// [`ScoreStore`] holding the record directly, with no encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryScoreStore {
    best: Option<BestScore>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: BestScore) -> Self {
        Self { best: Some(best) }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> Option<BestScore> {
        self.best
    }

    fn save(&mut self, candidate: BestScore) -> bool {
        match self.best {
            Some(current) if !candidate.is_better_than(&current) => false,
            _ => {
                self.best = Some(candidate);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingKv;

    impl KeyValueStore for FailingKv {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    /// Backend that counts reads.
    #[derive(Default)]
    struct CountingKv {
        inner: MemoryKv,
        reads: Cell<usize>,
    }

    impl KeyValueStore for CountingKv {
        fn get(&self, key: &str) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }
    }

    fn kv_with(raw: &str) -> KvScoreStore<MemoryKv> {
        let mut kv = MemoryKv::new();
        kv.set(BEST_SCORE_KEY, raw.to_string()).unwrap();
        KvScoreStore::new(kv)
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let stored = BestScore::new(5, 2_000);
        assert!(BestScore::new(4, 9_000).is_better_than(&stored));
        assert!(BestScore::new(5, 1_500).is_better_than(&stored));
        assert!(!BestScore::new(5, 2_000).is_better_than(&stored));
        assert!(!BestScore::new(6, 500).is_better_than(&stored));
    }

    #[test]
    fn test_display() {
        assert_eq!(BestScore::new(12, 48_210).display(), "12 moves • 00:48");
    }

    #[test]
    fn test_json_layout() {
        let json = serde_json::to_string(&BestScore::new(7, 1234)).unwrap();
        assert_eq!(json, r#"{"moves":7,"timeMs":1234}"#);
    }

    #[test]
    fn test_load_absent() {
        let store = KvScoreStore::new(MemoryKv::new());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_load_malformed_is_absent() {
        for raw in [
            "",
            "not json",
            "null",
            "{}",
            r#"{"moves":"five","timeMs":10}"#,
            r#"{"moves":-1,"timeMs":10}"#,
            "[1,2]",
        ] {
            assert_eq!(kv_with(raw).load(), None, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_save_into_empty_store() {
        let mut store = KvScoreStore::new(MemoryKv::new());
        assert!(store.save(BestScore::new(9, 30_000)));
        assert_eq!(store.load(), Some(BestScore::new(9, 30_000)));
        assert_eq!(
            store.backend().get(BEST_SCORE_KEY).as_deref(),
            Some(r#"{"moves":9,"timeMs":30000}"#)
        );
    }

    #[test]
    fn test_save_applies_policy() {
        let mut store = kv_with(r#"{"moves":5,"timeMs":2000}"#);

        assert!(store.save(BestScore::new(5, 1_500)));
        assert_eq!(store.load(), Some(BestScore::new(5, 1_500)));

        assert!(!store.save(BestScore::new(6, 500)));
        assert!(!store.save(BestScore::new(5, 1_500)));
        assert_eq!(store.load(), Some(BestScore::new(5, 1_500)));
    }

    #[test]
    fn test_save_overwrites_malformed_record() {
        let mut store = kv_with("{garbage");
        assert!(store.save(BestScore::new(20, 99_000)));
        assert_eq!(store.load(), Some(BestScore::new(20, 99_000)));
    }

    #[test]
    fn test_backend_failure_is_absorbed() {
        let mut store = KvScoreStore::new(FailingKv);
        assert!(!store.save(BestScore::new(1, 1)));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_custom_key() {
        let mut store = KvScoreStore::with_key(MemoryKv::new(), "pairs4_best");
        assert!(store.save(BestScore::new(4, 100)));
        assert!(store.backend().get(BEST_SCORE_KEY).is_none());
        assert!(store.backend().get("pairs4_best").is_some());
    }

    #[test]
    fn test_memory_score_store_policy() {
        let mut store = MemoryScoreStore::with_best(BestScore::new(5, 2_000));
        assert!(!store.save(BestScore::new(6, 500)));
        assert!(store.save(BestScore::new(5, 1_500)));
        assert_eq!(store.load(), Some(BestScore::new(5, 1_500)));
    }

    #[test]
    fn test_malformed_record_is_read_once() {
        let mut backend = CountingKv::default();
        backend
            .set(BEST_SCORE_KEY, "not json".to_string())
            .unwrap();
        let mut store = KvScoreStore::new(backend);

        for _ in 0..5 {
            assert_eq!(store.load(), None);
        }
        assert_eq!(store.backend().reads.get(), 1);

        // A save replaces the malformed record and updates the cache.
        assert!(store.save(BestScore::new(3, 900)));
        assert_eq!(store.load(), Some(BestScore::new(3, 900)));
        assert_eq!(store.backend().reads.get(), 1);

        // Writing behind the store's back forces a fresh read.
        store
            .backend_mut()
            .set(BEST_SCORE_KEY, r#"{"moves":2,"timeMs":100}"#.to_string())
            .unwrap();
        assert_eq!(store.load(), Some(BestScore::new(2, 100)));
        assert_eq!(store.backend().reads.get(), 2);
    }
}
