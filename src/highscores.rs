//! Best-score persistence
//!
//! One integer per game, keyed by game name. Persisted to LocalStorage on the
//! web; an in-memory store is used natively and in tests. Every failure is
//! reported as a `StoreError` so the caller can log it and keep playing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a score store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No storage backend (private mode, sandboxed iframe, native build)
    #[error("score storage unavailable")]
    Unavailable,

    /// The backend rejected the read or write
    #[error("score storage access failed: {0}")]
    Access(String),

    /// Stored data could not be parsed
    #[error("corrupt score data: {0}")]
    Corrupt(String),
}

/// Persisted best score per game
pub trait ScoreStore {
    /// Best score for `game`, `None` if never recorded
    fn best(&self, game: &str) -> Result<Option<u64>, StoreError>;

    fn set_best(&mut self, game: &str, score: u64) -> Result<(), StoreError>;
}

/// Whether `score` beats `previous_best` and should be stored.
///
/// Zero never counts as a best.
pub fn qualifies(previous_best: Option<u64>, score: u64) -> bool {
    score > 0 && previous_best.is_none_or(|best| score > best)
}

/// Best scores for all games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestScores {
    pub entries: BTreeMap<String, u64>,
}

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, game: &str) -> Option<u64> {
        self.entries.get(game).copied()
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    scores: BestScores,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn best(&self, game: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.scores.get(game))
    }

    fn set_best(&mut self, game: &str, score: u64) -> Result<(), StoreError> {
        self.scores.entries.insert(game.to_string(), score);
        Ok(())
    }
}

/// Store that always fails, for exercising degraded paths
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableScoreStore;

impl ScoreStore for UnavailableScoreStore {
    fn best(&self, _game: &str) -> Result<Option<u64>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set_best(&mut self, _game: &str, _score: u64) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalScoreStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{BestScores, ScoreStore, StoreError};

    /// LocalStorage-backed store (one JSON map under a single key)
    #[derive(Debug, Default)]
    pub struct LocalScoreStore;

    impl LocalScoreStore {
        const STORAGE_KEY: &'static str = "arcade_minis_best_scores";

        pub fn new() -> Self {
            Self
        }

        fn storage() -> Result<web_sys::Storage, StoreError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StoreError::Unavailable)
        }

        fn load() -> Result<BestScores, StoreError> {
            let storage = Self::storage()?;
            match storage.get_item(Self::STORAGE_KEY) {
                Ok(Some(json)) => BestScores::from_json(&json),
                Ok(None) => Ok(BestScores::new()),
                Err(e) => Err(StoreError::Access(format!("{:?}", e))),
            }
        }
    }

    impl ScoreStore for LocalScoreStore {
        fn best(&self, game: &str) -> Result<Option<u64>, StoreError> {
            Ok(Self::load()?.get(game))
        }

        fn set_best(&mut self, game: &str, score: u64) -> Result<(), StoreError> {
            // A corrupt map is replaced rather than blocking new records
            let mut scores = Self::load().unwrap_or_else(|e| {
                log::warn!("Resetting best scores: {}", e);
                BestScores::new()
            });
            scores.entries.insert(game.to_string(), score);
            let json = scores.to_json()?;
            Self::storage()?
                .set_item(Self::STORAGE_KEY, &json)
                .map_err(|e| StoreError::Access(format!("{:?}", e)))?;
            log::info!("Best score saved for {}: {}", game, score);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifies() {
        assert!(!qualifies(None, 0));
        assert!(qualifies(None, 1));
        assert!(!qualifies(Some(12), 12));
        assert!(!qualifies(Some(12), 5));
        assert!(qualifies(Some(12), 13));
        assert!(!qualifies(Some(0), 0));
    }

    #[test]
    fn test_json_roundtrip_and_corrupt() {
        let mut scores = BestScores::new();
        scores.entries.insert("rhythm".to_string(), 42);
        let json = scores.to_json().unwrap();
        assert_eq!(BestScores::from_json(&json).unwrap(), scores);
        assert!(matches!(
            BestScores::from_json("{not json"),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryScoreStore::new();
        assert_eq!(store.best("shooter").unwrap(), None);
        store.set_best("shooter", 300).unwrap();
        assert_eq!(store.best("shooter").unwrap(), Some(300));
    }

    #[test]
    fn test_unavailable_store() {
        let mut store = UnavailableScoreStore;
        assert!(store.best("x").is_err());
        let err = store.set_best("x", 1).unwrap_err();
        assert_eq!(err.to_string(), "score storage unavailable");
    }
}
