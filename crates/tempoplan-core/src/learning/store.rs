//! Persistence contract for learning records.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StorageError;
use crate::task::MoodType;

use super::LearningRecord;

/// Key-value storage of one [`LearningRecord`] per mood.
///
/// `put` must replace the stored record as a unit so that a concurrent
/// `get_or_default` observes either the old or the new record.
pub trait LearningStore: Send + Sync {
    /// Stored record for `mood`, or an empty one if none exists yet.
    fn get_or_default(&self, mood: MoodType) -> Result<LearningRecord, StorageError>;

    /// Replace the record for `record.mood`.
    fn put(&self, record: &LearningRecord) -> Result<(), StorageError>;

    /// All stored records, ordered by mood.
    fn all(&self) -> Result<Vec<LearningRecord>, StorageError>;

    /// Drop every record.
    fn clear(&self) -> Result<(), StorageError>;

    /// Read the record for `mood`, replace it with `apply(record)` and return
    /// the stored result.
    ///
    /// The default is a plain read followed by `put`. Stores shared between
    /// processes must override it so the read and the write are one atomic step.
    fn update(
        &self,
        mood: MoodType,
        apply: &dyn Fn(LearningRecord) -> LearningRecord,
    ) -> Result<LearningRecord, StorageError> {
        let updated = apply(self.get_or_default(mood)?);
        self.put(&updated)?;
        Ok(updated)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryLearningStore {
    records: RwLock<HashMap<MoodType, LearningRecord>>,
}

impl MemoryLearningStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("learning store lock poisoned".to_string())
}

impl LearningStore for MemoryLearningStore {
    fn get_or_default(&self, mood: MoodType) -> Result<LearningRecord, StorageError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .get(&mood)
            .cloned()
            .unwrap_or_else(|| LearningRecord::empty(mood)))
    }

    fn put(&self, record: &LearningRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(record.mood, record.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<LearningRecord>, StorageError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        let mut all: Vec<LearningRecord> = records.values().cloned().collect();
        all.sort_by_key(|r| r.mood);
        Ok(all)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.records.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    fn update(
        &self,
        mood: MoodType,
        apply: &dyn Fn(LearningRecord) -> LearningRecord,
    ) -> Result<LearningRecord, StorageError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let current = records
            .get(&mood)
            .cloned()
            .unwrap_or_else(|| LearningRecord::empty(mood));
        let updated = apply(current);
        records.insert(mood, updated.clone());
        Ok(updated)
    }
}

/// Store that fails every call with [`StorageError::Unavailable`].
///
/// Stands in for a backend that could not be opened, so callers still run
/// with neutral learning.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StorageError {
        StorageError::Unavailable(self.reason.clone())
    }
}

impl LearningStore for UnavailableStore {
    fn get_or_default(&self, _mood: MoodType) -> Result<LearningRecord, StorageError> {
        Err(self.error())
    }

    fn put(&self, _record: &LearningRecord) -> Result<(), StorageError> {
        Err(self.error())
    }

    fn all(&self) -> Result<Vec<LearningRecord>, StorageError> {
        Err(self.error())
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(self.error())
    }

    fn update(
        &self,
        _mood: MoodType,
        _apply: &dyn Fn(LearningRecord) -> LearningRecord,
    ) -> Result<LearningRecord, StorageError> {
        Err(self.error())
    }
}

impl<S: LearningStore + ?Sized> LearningStore for std::sync::Arc<S> {
    fn get_or_default(&self, mood: MoodType) -> Result<LearningRecord, StorageError> {
        (**self).get_or_default(mood)
    }

    fn put(&self, record: &LearningRecord) -> Result<(), StorageError> {
        (**self).put(record)
    }

    fn all(&self) -> Result<Vec<LearningRecord>, StorageError> {
        (**self).all()
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }

    fn update(
        &self,
        mood: MoodType,
        apply: &dyn Fn(LearningRecord) -> LearningRecord,
    ) -> Result<LearningRecord, StorageError> {
        (**self).update(mood, apply)
    }
}
