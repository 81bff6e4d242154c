use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::ids::{ItemKey, LessonId};

/// Ceiling on accumulated minutes, guarding against clock skew or a stuck
/// session timer inflating the counter unboundedly.
pub const MAX_TIME_SPENT_MINUTES: u32 = 1000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress percent {0} is out of range")]
    PercentOutOfRange(u8),

    #[error("practice score {0} is out of range")]
    ScoreOutOfRange(u8),

    #[error("status is completed but progress is {0}, not 100")]
    CompletedBelowFull(u8),
}

/// Lesson lifecycle. `InProgress → Completed` is one-way; the only path back
/// to `NotStarted` is an explicit external reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    /// Stable string form used by the progress store.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::NotStarted => "not_started",
            LessonStatus::InProgress => "in_progress",
            LessonStatus::Completed => "completed",
        }
    }

    /// Parse the stable string form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "not_started" => Some(LessonStatus::NotStarted),
            "in_progress" => Some(LessonStatus::InProgress),
            "completed" => Some(LessonStatus::Completed),
            _ => None,
        }
    }
}

/// The one durable entity of the learning core: a lesson's aggregate progress.
///
/// `percent` is non-decreasing across writes for a given lesson (the write
/// path enforces it); `Completed` implies `percent == 100`. The played-key set
/// is `None` only on legacy records that predate exact play tracking; every
/// new write persists the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    lesson_id: LessonId,
    percent: u8,
    status: LessonStatus,
    score: Option<u8>,
    time_spent_minutes: u32,
    played_audio_keys: Option<BTreeSet<ItemKey>>,
}

impl LessonProgress {
    /// Record created on first visit to a lesson.
    #[must_use]
    pub fn fresh(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            percent: 0,
            status: LessonStatus::NotStarted,
            score: None,
            time_spent_minutes: 0,
            played_audio_keys: Some(BTreeSet::new()),
        }
    }

    /// Rehydrate a record from the progress store.
    ///
    /// Accumulated time beyond [`MAX_TIME_SPENT_MINUTES`] is clamped rather
    /// than rejected, since old records may have been written before the
    /// ceiling existed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if percent or score exceed 100, or if a
    /// completed record carries less than full progress.
    pub fn from_persisted(
        lesson_id: LessonId,
        percent: u8,
        status: LessonStatus,
        score: Option<u8>,
        time_spent_minutes: u32,
        played_audio_keys: Option<BTreeSet<ItemKey>>,
    ) -> Result<Self, ProgressError> {
        if percent > 100 {
            return Err(ProgressError::PercentOutOfRange(percent));
        }
        if let Some(s) = score {
            if s > 100 {
                return Err(ProgressError::ScoreOutOfRange(s));
            }
        }
        if status == LessonStatus::Completed && percent != 100 {
            return Err(ProgressError::CompletedBelowFull(percent));
        }

        Ok(Self {
            lesson_id,
            percent,
            status,
            score,
            time_spent_minutes: time_spent_minutes.min(MAX_TIME_SPENT_MINUTES),
            played_audio_keys,
        })
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn status(&self) -> LessonStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> Option<u8> {
        self.score
    }

    /// Cumulative minutes on task, clamped to [`MAX_TIME_SPENT_MINUTES`].
    #[must_use]
    pub fn time_spent_minutes(&self) -> u32 {
        self.time_spent_minutes
    }

    /// Exact play history, absent on legacy records.
    #[must_use]
    pub fn played_audio_keys(&self) -> Option<&BTreeSet<ItemKey>> {
        self.played_audio_keys.as_ref()
    }

    /// True when this record predates exact play tracking and progress must be
    /// reconstructed from the aggregate percentage alone.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.played_audio_keys.is_none()
    }
}
