use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use tracing::warn;

use peyv_core::Clock;
use peyv_core::model::{
    ItemKey, LessonId, LessonProgress, LessonStatus, MAX_TIME_SPENT_MINUTES, PRACTICE_PASS_SCORE,
    ProgressConfig, estimate_prior_state,
};
use storage::repository::ProgressRepository;

/// Maintains a lesson's aggregate progress from raw activity events.
///
/// Progress is a weighted sum of three independently-capped contributions:
/// unique audio plays, minutes on task, and an optional practice score.
/// Because only the aggregate survives a restart on legacy records, opening
/// a lesson runs in one of two modes:
///
/// - **exact**, when the played-key set was persisted: the set is restored
///   verbatim and the session timer starts now;
/// - **reconstructive**, for legacy percentage-only records: a conservative
///   prior play count is back-solved from the stored percentage and the
///   session start is backdated by the stored minutes, so time credit
///   resumes instead of restarting.
///
/// Recording methods never fail: a persistence error marks the estimator
/// dirty, and the write is re-attempted on the next qualifying event. When
/// the opening read itself fails, the stored state is unknown; the estimator
/// then runs in memory only and holds back every write until a re-read
/// succeeds and the stored record has been folded in, so an unknown higher
/// value can never be overwritten by a lower one.
pub struct ProgressEstimator {
    lesson_id: LessonId,
    config: ProgressConfig,
    store: Arc<dyn ProgressRepository>,
    clock: Clock,
    played_keys: BTreeSet<ItemKey>,
    estimated_prior_plays: u32,
    session_start: DateTime<Utc>,
    banked_minutes: u32,
    best_percent: u8,
    score: Option<u8>,
    practice_passed: bool,
    dirty: bool,
    store_unknown: bool,
    last: LessonProgress,
}

impl ProgressEstimator {
    /// Open a lesson, restoring or creating its progress record.
    ///
    /// A store failure here degrades to in-memory-only operation rather
    /// than surfacing an error: the UI stays usable, but every write is
    /// held back until a later event re-reads the stored record and folds
    /// it in.
    pub async fn open(
        lesson_id: LessonId,
        config: ProgressConfig,
        store: Arc<dyn ProgressRepository>,
        clock: Clock,
    ) -> Self {
        let now = clock.now();
        let (stored, store_unknown) = match store.get_progress(&lesson_id).await {
            Ok(record) => (record, false),
            Err(e) => {
                warn!(
                    lesson = %lesson_id,
                    error = %e,
                    "progress store unreadable, continuing in memory"
                );
                (None, true)
            }
        };
        // Only a successful read proves the lesson was never visited.
        let first_visit = stored.is_none() && !store_unknown;

        let mut estimator = match stored {
            Some(record) if !record.is_legacy() => {
                // Exact mode: the played set is authoritative, the session
                // timer starts fresh.
                let played_keys = record.played_audio_keys().cloned().unwrap_or_default();
                Self {
                    played_keys,
                    estimated_prior_plays: 0,
                    session_start: now,
                    banked_minutes: record.time_spent_minutes(),
                    best_percent: record.percent(),
                    score: record.score(),
                    practice_passed: record.score().is_some_and(|s| s >= PRACTICE_PASS_SCORE),
                    dirty: false,
                    store_unknown: false,
                    last: record,
                    lesson_id,
                    config,
                    store,
                    clock,
                }
            }
            Some(record) => {
                // Reconstructive mode: back-solve counters from the lossy
                // aggregate. The estimate is conservative; the monotonic
                // write guard covers any underestimate.
                let estimated = estimate_prior_state(
                    record.percent(),
                    record.time_spent_minutes(),
                    &config,
                    now,
                );
                Self {
                    played_keys: BTreeSet::new(),
                    estimated_prior_plays: estimated.audio_plays,
                    session_start: estimated.session_start,
                    banked_minutes: 0,
                    best_percent: record.percent(),
                    score: record.score(),
                    practice_passed: record.score().is_some_and(|s| s >= PRACTICE_PASS_SCORE),
                    dirty: false,
                    store_unknown: false,
                    last: record,
                    lesson_id,
                    config,
                    store,
                    clock,
                }
            }
            None => {
                let fresh = LessonProgress::fresh(lesson_id.clone());
                Self {
                    played_keys: BTreeSet::new(),
                    estimated_prior_plays: 0,
                    session_start: now,
                    banked_minutes: 0,
                    best_percent: 0,
                    score: None,
                    practice_passed: false,
                    dirty: store_unknown,
                    store_unknown,
                    last: fresh,
                    lesson_id,
                    config,
                    store,
                    clock,
                }
            }
        };

        if first_visit {
            let record = estimator.last.clone();
            estimator.persist(record).await;
        }

        estimator
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// The most recently computed (and, when the store cooperated,
    /// persisted) record.
    #[must_use]
    pub fn snapshot(&self) -> &LessonProgress {
        &self.last
    }

    /// True while the latest record is not known to be persisted.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mutable clock access, for advancing fixed clocks in tests.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Record the first successful playback of an audio item.
    ///
    /// Keys already counted this or any prior session are no-ops; the
    /// estimator only ever credits unique plays.
    pub async fn record_audio_play(&mut self, key: ItemKey) -> LessonProgress {
        if !self.played_keys.insert(key) {
            return self.last.clone();
        }
        self.commit().await
    }

    /// Periodic time tick; re-derives the elapsed-minutes contribution.
    pub async fn record_time_tick(&mut self) -> LessonProgress {
        self.commit().await
    }

    /// Record a practice submission.
    ///
    /// A retake with a lower score still replaces the stored score, but the
    /// monotonic write guard keeps it from lowering overall progress.
    pub async fn record_practice_score(&mut self, score: u8) -> LessonProgress {
        let score = score.min(100);
        self.practice_passed = self.practice_passed || score >= PRACTICE_PASS_SCORE;
        self.score = Some(score);
        self.commit().await
    }

    fn unique_plays(&self) -> u32 {
        let session_plays = u32::try_from(self.played_keys.len()).unwrap_or(u32::MAX);
        self.estimated_prior_plays.saturating_add(session_plays)
    }

    fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        u32::try_from((now - self.session_start).num_minutes()).unwrap_or(0)
    }

    /// Retry the opening read after it failed, folding whatever the store
    /// holds into the in-memory state before writes are allowed again.
    async fn try_recover(&mut self) {
        match self.store.get_progress(&self.lesson_id).await {
            Ok(stored) => {
                if let Some(record) = stored {
                    self.absorb_stored(&record);
                }
                self.store_unknown = false;
            }
            Err(e) => {
                warn!(
                    lesson = %self.lesson_id,
                    error = %e,
                    "progress store still unreadable, holding back writes"
                );
            }
        }
    }

    /// Fold a stored record into state accumulated while the store was
    /// unreadable. Everything merges upward, so the combined view can only
    /// credit what either side already recorded.
    fn absorb_stored(&mut self, record: &LessonProgress) {
        self.best_percent = self.best_percent.max(record.percent());
        self.banked_minutes = self.banked_minutes.max(record.time_spent_minutes());
        if let Some(keys) = record.played_audio_keys() {
            self.played_keys.extend(keys.iter().cloned());
        }
        if self.score.is_none() {
            self.score = record.score();
        }
        self.practice_passed = self.practice_passed
            || record.score().is_some_and(|s| s >= PRACTICE_PASS_SCORE);
    }

    /// Recompute the aggregate and push it through the monotonic write path.
    async fn commit(&mut self) -> LessonProgress {
        if self.store_unknown {
            self.try_recover().await;
        }

        let now = self.clock.now();
        let elapsed = self.elapsed_minutes(now);

        let audio = self.config.audio_contribution(self.unique_plays());
        let time = self.config.time_contribution(elapsed);
        let practice = self
            .config
            .practice_contribution(self.score, self.practice_passed);
        let computed = self.config.combine(audio, time, practice);

        // Never write less than what is already on record; a reconstructive
        // underestimate must not clobber a better prior value.
        let percent = computed.max(self.best_percent);
        let status = if percent == 100 {
            LessonStatus::Completed
        } else {
            LessonStatus::InProgress
        };
        let time_spent = self
            .banked_minutes
            .saturating_add(elapsed)
            .min(MAX_TIME_SPENT_MINUTES);

        match LessonProgress::from_persisted(
            self.lesson_id.clone(),
            percent,
            status,
            self.score,
            time_spent,
            Some(self.played_keys.clone()),
        ) {
            Ok(record) => {
                self.best_percent = record.percent();
                if self.store_unknown {
                    // The stored value is still unknown; writing now could
                    // overwrite a higher one. Keep the record in memory only.
                    self.dirty = true;
                    self.last = record.clone();
                } else {
                    self.persist(record.clone()).await;
                }
                record
            }
            Err(e) => {
                warn!(
                    lesson = %self.lesson_id,
                    error = %e,
                    "computed progress update was invalid, keeping previous record"
                );
                self.last.clone()
            }
        }
    }

    /// Best-effort write. Failure marks the estimator dirty and is retried
    /// on the next qualifying event instead of blocking the caller.
    async fn persist(&mut self, record: LessonProgress) {
        match self.store.put_progress(&record).await {
            Ok(()) => {
                self.dirty = false;
            }
            Err(e) => {
                self.dirty = true;
                warn!(
                    lesson = %self.lesson_id,
                    error = %e,
                    "failed to persist lesson progress, will retry on next event"
                );
            }
        }
        self.last = record;
    }
}
