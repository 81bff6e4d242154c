use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Practice submissions at or above this score count as a pass and earn the
/// full practice weight.
pub const PRACTICE_PASS_SCORE: u8 = 70;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("lesson must contain at least one audio item")]
    NoAudios,

    #[error("weights must sum to 100, got {sum}")]
    WeightSumMismatch { sum: u16 },

    #[error("multiplier must be positive")]
    NonPositiveMultiplier,
}

/// Per-lesson, compile-time-fixed progress weighting.
///
/// `audio_weight + time_weight + practice_weight` always equals 100. The
/// multipliers translate raw counters (unique plays, minutes on task) into
/// percentage points; each contribution is capped at its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressConfig {
    total_audios: u32,
    has_practice: bool,
    audio_weight: u8,
    time_weight: u8,
    practice_weight: u8,
    audio_multiplier: f64,
    time_multiplier: f64,
}

impl ProgressConfig {
    /// Config for a lesson without a practice section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `total_audios` is zero or the weights do not
    /// sum to 100.
    pub fn new(total_audios: u32, audio_weight: u8, time_weight: u8) -> Result<Self, ConfigError> {
        Self::build(total_audios, audio_weight, time_weight, None)
    }

    /// Config for a lesson with a graded practice section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `total_audios` is zero or the weights do not
    /// sum to 100.
    pub fn with_practice(
        total_audios: u32,
        audio_weight: u8,
        time_weight: u8,
        practice_weight: u8,
    ) -> Result<Self, ConfigError> {
        Self::build(total_audios, audio_weight, time_weight, Some(practice_weight))
    }

    fn build(
        total_audios: u32,
        audio_weight: u8,
        time_weight: u8,
        practice_weight: Option<u8>,
    ) -> Result<Self, ConfigError> {
        if total_audios == 0 {
            return Err(ConfigError::NoAudios);
        }
        let practice = practice_weight.unwrap_or(0);
        let sum = u16::from(audio_weight) + u16::from(time_weight) + u16::from(practice);
        if sum != 100 {
            return Err(ConfigError::WeightSumMismatch { sum });
        }

        Ok(Self {
            total_audios,
            has_practice: practice_weight.is_some(),
            audio_weight,
            time_weight,
            practice_weight: practice,
            audio_multiplier: f64::from(audio_weight) / f64::from(total_audios),
            // Full time credit after ten minutes on task unless overridden.
            time_multiplier: f64::from(time_weight) / 10.0,
        })
    }

    /// Override the per-play multiplier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NonPositiveMultiplier` for zero or negative values.
    pub fn with_audio_multiplier(mut self, multiplier: f64) -> Result<Self, ConfigError> {
        if multiplier <= 0.0 {
            return Err(ConfigError::NonPositiveMultiplier);
        }
        self.audio_multiplier = multiplier;
        Ok(self)
    }

    /// Override the per-minute multiplier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NonPositiveMultiplier` for zero or negative values.
    pub fn with_time_multiplier(mut self, multiplier: f64) -> Result<Self, ConfigError> {
        if multiplier <= 0.0 {
            return Err(ConfigError::NonPositiveMultiplier);
        }
        self.time_multiplier = multiplier;
        Ok(self)
    }

    #[must_use]
    pub fn total_audios(&self) -> u32 {
        self.total_audios
    }

    #[must_use]
    pub fn has_practice(&self) -> bool {
        self.has_practice
    }

    #[must_use]
    pub fn audio_weight(&self) -> u8 {
        self.audio_weight
    }

    #[must_use]
    pub fn time_weight(&self) -> u8 {
        self.time_weight
    }

    #[must_use]
    pub fn practice_weight(&self) -> u8 {
        self.practice_weight
    }

    #[must_use]
    pub fn audio_multiplier(&self) -> f64 {
        self.audio_multiplier
    }

    #[must_use]
    pub fn time_multiplier(&self) -> f64 {
        self.time_multiplier
    }

    // ─── Contribution arithmetic ───────────────────────────────────────────────

    /// Percentage points earned by unique audio plays, capped at the audio
    /// weight.
    #[must_use]
    pub fn audio_contribution(&self, unique_plays: u32) -> f64 {
        (f64::from(unique_plays) * self.audio_multiplier).min(f64::from(self.audio_weight))
    }

    /// Percentage points earned by minutes on task, capped at the time weight.
    #[must_use]
    pub fn time_contribution(&self, minutes_elapsed: u32) -> f64 {
        (f64::from(minutes_elapsed) * self.time_multiplier).min(f64::from(self.time_weight))
    }

    /// Percentage points earned from practice.
    ///
    /// A score at or above [`PRACTICE_PASS_SCORE`] earns the full weight; a
    /// lower score earns its proportional share. With no score on record, a
    /// previously recorded pass keeps the full weight.
    #[must_use]
    pub fn practice_contribution(&self, score: Option<u8>, passed_previously: bool) -> f64 {
        let weight = f64::from(self.practice_weight);
        match score {
            Some(s) if s >= PRACTICE_PASS_SCORE => weight,
            Some(s) => (f64::from(s.min(100)) * weight / 100.0).min(weight),
            None if passed_previously => weight,
            None => 0.0,
        }
    }

    /// Combine the three contributions into a whole percentage, clamped to
    /// `[0, 100]` and floored (never rounded up).
    #[must_use]
    pub fn combine(&self, audio: f64, time: f64, practice: f64) -> u8 {
        let total = (audio + time + practice).clamp(0.0, 100.0);
        // total is in [0, 100], so the cast cannot truncate out of range.
        total.floor() as u8
    }
}

//
// ─── RECONSTRUCTION ────────────────────────────────────────────────────────────
//

/// Counters back-solved from a lossy persisted percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatedPriorState {
    /// Estimated unique plays in prior sessions, never more than the lesson's
    /// audio count.
    pub audio_plays: u32,
    /// Session start backdated by the stored minutes so time credit resumes
    /// where it left off instead of restarting from zero.
    pub session_start: DateTime<Utc>,
}

/// Back-solve plausible prior counters from a stored aggregate percentage.
///
/// Legacy records persist only the percentage, not which audios were played.
/// The estimate is deliberately conservative: plays are floored, never
/// ceilinged, and capped at the number of audios that physically exist, so
/// restored progress can never exceed what the learner actually did.
#[must_use]
pub fn estimate_prior_state(
    stored_percent: u8,
    stored_minutes: u32,
    config: &ProgressConfig,
    now: DateTime<Utc>,
) -> EstimatedPriorState {
    let multiplier = config.audio_multiplier();
    let audio_plays = if multiplier > 0.0 {
        let estimate = (f64::from(stored_percent) / multiplier).floor();
        // estimate is non-negative and bounded by 100 / multiplier.
        (estimate as u32).min(config.total_audios())
    } else {
        0
    };

    EstimatedPriorState {
        audio_plays,
        session_start: now - Duration::minutes(i64::from(stored_minutes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn audio_time_config() -> ProgressConfig {
        ProgressConfig::new(10, 50, 50).unwrap()
    }

    #[test]
    fn rejects_weights_not_summing_to_100() {
        let err = ProgressConfig::new(10, 50, 40).unwrap_err();
        assert_eq!(err, ConfigError::WeightSumMismatch { sum: 90 });

        let err = ProgressConfig::with_practice(10, 40, 40, 30).unwrap_err();
        assert_eq!(err, ConfigError::WeightSumMismatch { sum: 110 });
    }

    #[test]
    fn rejects_empty_lessons() {
        assert_eq!(
            ProgressConfig::new(0, 50, 50).unwrap_err(),
            ConfigError::NoAudios
        );
    }

    #[test]
    fn default_audio_multiplier_divides_weight_evenly() {
        let config = audio_time_config();
        assert!((config.audio_multiplier() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn audio_contribution_caps_at_weight() {
        let config = audio_time_config();
        assert!((config.audio_contribution(5) - 25.0).abs() < f64::EPSILON);
        assert!((config.audio_contribution(10) - 50.0).abs() < f64::EPSILON);
        // Replayed or over-counted plays cannot exceed the weight.
        assert!((config.audio_contribution(40) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn time_contribution_caps_at_weight() {
        let config = audio_time_config();
        assert!((config.time_contribution(0)).abs() < f64::EPSILON);
        assert!((config.time_contribution(4) - 20.0).abs() < f64::EPSILON);
        assert!((config.time_contribution(600) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn passing_practice_score_earns_full_weight() {
        let config = ProgressConfig::with_practice(10, 25, 25, 50).unwrap();
        assert!((config.practice_contribution(Some(80), false) - 50.0).abs() < f64::EPSILON);
        assert!((config.practice_contribution(Some(70), false) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn failing_practice_score_earns_proportional_share() {
        let config = ProgressConfig::with_practice(10, 25, 25, 50).unwrap();
        assert!((config.practice_contribution(Some(50), false) - 25.0).abs() < f64::EPSILON);
        assert!((config.practice_contribution(Some(0), false)).abs() < f64::EPSILON);
    }

    #[test]
    fn prior_pass_without_fresh_score_keeps_full_weight() {
        let config = ProgressConfig::with_practice(10, 25, 25, 50).unwrap();
        assert!((config.practice_contribution(None, true) - 50.0).abs() < f64::EPSILON);
        assert!((config.practice_contribution(None, false)).abs() < f64::EPSILON);
    }

    #[test]
    fn combine_clamps_and_floors() {
        let config = audio_time_config();
        assert_eq!(config.combine(25.0, 0.0, 0.0), 25);
        assert_eq!(config.combine(50.0, 50.0, 50.0), 100);
        assert_eq!(config.combine(10.4, 10.4, 0.0), 20);
    }

    #[test]
    fn reconstruction_floors_and_caps_at_total_audios() {
        // multiplier = 30 / 20 = 1.5; floor(40 / 1.5) = 26, capped at 20.
        let config = ProgressConfig::new(20, 30, 70).unwrap();
        let estimated = estimate_prior_state(40, 0, &config, fixed_now());
        assert_eq!(estimated.audio_plays, 20);

        // Below the cap the floor applies untouched: floor(10 / 1.5) = 6.
        let estimated = estimate_prior_state(10, 0, &config, fixed_now());
        assert_eq!(estimated.audio_plays, 6);
    }

    #[test]
    fn reconstruction_backdates_session_start() {
        let config = audio_time_config();
        let now = fixed_now();
        let estimated = estimate_prior_state(25, 7, &config, now);
        assert_eq!(estimated.session_start, now - Duration::minutes(7));
    }
}
