use async_trait::async_trait;
use peyv_core::model::{LessonId, LessonProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by progress store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value persistence contract for lesson progress.
///
/// One record per lesson, keyed by `LessonId`. Adapters never assume
/// transactional multi-key writes; each lesson's record is independent.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the record for a lesson, `None` if the lesson was never visited.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_progress(
        &self,
        lesson_id: &LessonId,
    ) -> Result<Option<LessonProgress>, StorageError>;

    /// Persist or replace the record for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn put_progress(&self, progress: &LessonProgress) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    records: Arc<Mutex<HashMap<LessonId, LessonProgress>>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressStore {
    async fn get_progress(
        &self,
        lesson_id: &LessonId,
    ) -> Result<Option<LessonProgress>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(lesson_id).cloned())
    }

    async fn put_progress(&self, progress: &LessonProgress) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(progress.lesson_id().clone(), progress.clone());
        Ok(())
    }
}

/// Aggregates the progress repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryProgressStore::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peyv_core::model::{ItemKey, LessonStatus};
    use std::collections::BTreeSet;

    fn build_progress(lesson: &str, percent: u8) -> LessonProgress {
        let mut keys = BTreeSet::new();
        keys.insert(ItemKey::from_canonical("sêv"));
        LessonProgress::from_persisted(
            LessonId::new(lesson),
            percent,
            LessonStatus::InProgress,
            None,
            3,
            Some(keys),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_lesson_reads_as_none() {
        let store = InMemoryProgressStore::new();
        let fetched = store.get_progress(&LessonId::new("lesson-1")).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn round_trips_progress_record() {
        let store = InMemoryProgressStore::new();
        let progress = build_progress("lesson-1", 25);
        store.put_progress(&progress).await.unwrap();

        let fetched = store
            .get_progress(&LessonId::new("lesson-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, progress);
    }

    #[tokio::test]
    async fn put_replaces_existing_record() {
        let store = InMemoryProgressStore::new();
        store.put_progress(&build_progress("lesson-1", 25)).await.unwrap();
        store.put_progress(&build_progress("lesson-1", 50)).await.unwrap();

        let fetched = store
            .get_progress(&LessonId::new("lesson-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.percent(), 50);
    }
}
