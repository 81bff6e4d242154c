use chrono::Utc;
use peyv_core::model::{LessonId, LessonProgress};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    keys_from_json, keys_to_json, minutes_from_i64, percent_from_i64, score_from_i64, ser,
    status_from_str,
};
use crate::repository::{ProgressRepository, StorageError};

fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<LessonProgress, StorageError> {
    let lesson_id: String = row.try_get("lesson_id").map_err(ser)?;
    let percent = percent_from_i64(row.try_get::<i64, _>("percent").map_err(ser)?)?;
    let status = status_from_str(row.try_get::<&str, _>("status").map_err(ser)?)?;
    let score = score_from_i64(row.try_get::<Option<i64>, _>("score").map_err(ser)?)?;
    let minutes = minutes_from_i64(row.try_get::<i64, _>("time_spent_minutes").map_err(ser)?)?;
    let keys = keys_from_json(
        row.try_get::<Option<&str>, _>("played_audio_keys")
            .map_err(ser)?,
    )?;

    LessonProgress::from_persisted(LessonId::new(lesson_id), percent, status, score, minutes, keys)
        .map_err(ser)
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        lesson_id: &LessonId,
    ) -> Result<Option<LessonProgress>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    lesson_id, percent, status, score,
                    time_spent_minutes, played_audio_keys
                FROM lesson_progress
                WHERE lesson_id = ?1
            ",
        )
        .bind(lesson_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn put_progress(&self, progress: &LessonProgress) -> Result<(), StorageError> {
        let keys_json = keys_to_json(progress.played_audio_keys())?;

        sqlx::query(
            r"
                INSERT INTO lesson_progress (
                    lesson_id, percent, status, score,
                    time_spent_minutes, played_audio_keys, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(lesson_id) DO UPDATE SET
                    percent = excluded.percent,
                    status = excluded.status,
                    score = excluded.score,
                    time_spent_minutes = excluded.time_spent_minutes,
                    played_audio_keys = excluded.played_audio_keys,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(progress.lesson_id().as_str())
        .bind(i64::from(progress.percent()))
        .bind(progress.status().as_str())
        .bind(progress.score().map(i64::from))
        .bind(i64::from(progress.time_spent_minutes()))
        .bind(keys_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
