//! Levels, timed-challenge scoring, and end-of-session grading.
//!
//! # Levels
//!
//! Every [`XP_PER_LEVEL`] experience points is one level; a fresh learner is
//! level 1.
//!
//! # Timed Challenge
//!
//! A 60-second sprint with its own combo counter, separate from the
//! progression streak. Each correct answer scores `10 + min(combo, 5) * 2`
//! using the combo *before* the answer, so scores run 10, 12, … 20 and then
//! stay at 20.

use crate::mastery::{tier_of, MasteryTier};
use serde::{Deserialize, Serialize};

/// Experience points per level.
pub const XP_PER_LEVEL: u64 = 100;

/// Default timed-challenge length in seconds.
pub const TIMED_CHALLENGE_SECONDS: u32 = 60;

const TIMED_BASE_POINTS: u32 = 10;
const TIMED_COMBO_STEP: u32 = 2;
const TIMED_COMBO_CAP: u32 = 5;

/// 1-based level for an xp total.
pub fn level_of(xp: u64, xp_per_level: u64) -> u64 {
    xp / xp_per_level.max(1) + 1
}

/// Progress into the current level.
pub fn xp_in_level(xp: u64, xp_per_level: u64) -> u64 {
    xp % xp_per_level.max(1)
}

/// Phase of a timed challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePhase {
    Ready,
    Playing,
    Done,
}

/// Running state of one timed challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedChallenge {
    pub phase: ChallengePhase,
    pub duration: u32,
    pub time_left: u32,
    pub score: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub answered: u32,
    pub correct: u32,
}

impl TimedChallenge {
    pub fn new(duration: u32) -> Self {
        Self {
            phase: ChallengePhase::Ready,
            duration,
            time_left: duration,
            score: 0,
            combo: 0,
            best_combo: 0,
            answered: 0,
            correct: 0,
        }
    }

    /// Start (or restart) the clock and clear the scoreboard.
    pub fn start(&mut self) {
        *self = Self::new(self.duration);
        self.phase = ChallengePhase::Playing;
    }

    pub fn is_playing(&self) -> bool {
        self.phase == ChallengePhase::Playing
    }

    /// Advance the clock. Returns `true` when this tick ended the challenge.
    pub fn tick(&mut self, seconds: u32) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.time_left = self.time_left.saturating_sub(seconds);
        if self.time_left == 0 {
            self.phase = ChallengePhase::Done;
            return true;
        }
        false
    }

    /// Score an answer; returns the points awarded. Ignored unless playing.
    pub fn answer(&mut self, is_correct: bool) -> u32 {
        if !self.is_playing() {
            return 0;
        }
        self.answered += 1;
        if !is_correct {
            self.combo = 0;
            return 0;
        }
        let points = TIMED_BASE_POINTS + self.combo.min(TIMED_COMBO_CAP) * TIMED_COMBO_STEP;
        self.score += points;
        self.correct += 1;
        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
        points
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(self.correct, self.answered)
    }
}

impl Default for TimedChallenge {
    fn default() -> Self {
        Self::new(TIMED_CHALLENGE_SECONDS)
    }
}

/// Headline shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Amazing,
    Great,
    GoodStart,
    KeepPracticing,
}

/// Correct/total counts for one finished game session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub correct: u32,
    pub total: u32,
}

impl SessionSummary {
    pub fn new(correct: u32, total: u32) -> Self {
        Self {
            correct: correct.min(total),
            total,
        }
    }

    /// Rounded percentage; 0 for an empty session.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }

    /// The session's own tier, using the same thresholds as family mastery.
    pub fn tier(&self) -> MasteryTier {
        tier_of(self.correct, self.total)
    }

    pub fn grade(&self) -> Grade {
        let pct = self.percent();
        if pct >= 90 {
            Grade::Amazing
        } else if pct >= 70 {
            Grade::Great
        } else if pct >= 40 {
            Grade::GoodStart
        } else {
            Grade::KeepPracticing
        }
    }

    /// Whether the results screen plays the level-up fanfare.
    pub fn celebrates(&self) -> bool {
        self.percent() >= 70
    }
}
