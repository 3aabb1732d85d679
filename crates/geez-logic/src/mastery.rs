//! Per-family accuracy records and mastery tiers.
//!
//! A tier is never stored; it is derived from a [`MasteryRecord`] whenever
//! it is needed. Families need at least [`MIN_SAMPLE`] attempts before they
//! can rank above [`MasteryTier::None`].

use serde::{Deserialize, Serialize};

/// Attempts required before a family can earn any tier.
pub const MIN_SAMPLE: u32 = 3;

/// Accuracy at or above which a family is gold.
pub const GOLD_THRESHOLD: f64 = 0.9;
/// Accuracy at or above which a family is silver.
pub const SILVER_THRESHOLD: f64 = 0.7;
/// Accuracy at or above which a family is bronze.
pub const BRONZE_THRESHOLD: f64 = 0.4;

/// Coarse accuracy rank for a consonant family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTier {
    None,
    Bronze,
    Silver,
    Gold,
}

impl MasteryTier {
    /// All tiers, lowest first.
    pub const ALL: [MasteryTier; 4] = [
        MasteryTier::None,
        MasteryTier::Bronze,
        MasteryTier::Silver,
        MasteryTier::Gold,
    ];

    /// Any tier above `None` counts as mastered for unlocking purposes.
    pub fn is_mastered(self) -> bool {
        self != MasteryTier::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MasteryTier::None => "none",
            MasteryTier::Bronze => "bronze",
            MasteryTier::Silver => "silver",
            MasteryTier::Gold => "gold",
        }
    }
}

impl std::fmt::Display for MasteryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify accuracy counts into a tier.
///
/// * `total < 3` → none
/// * accuracy ≥ 0.9 → gold
/// * accuracy ≥ 0.7 → silver
/// * accuracy ≥ 0.4 → bronze
/// * else → none
pub fn tier_of(correct: u32, total: u32) -> MasteryTier {
    if total < MIN_SAMPLE {
        return MasteryTier::None;
    }
    let pct = correct as f64 / total as f64;
    if pct >= GOLD_THRESHOLD {
        MasteryTier::Gold
    } else if pct >= SILVER_THRESHOLD {
        MasteryTier::Silver
    } else if pct >= BRONZE_THRESHOLD {
        MasteryTier::Bronze
    } else {
        MasteryTier::None
    }
}

/// Answer counts for one consonant family. `correct <= total` always.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryRecord {
    pub correct: u32,
    pub total: u32,
}

impl MasteryRecord {
    /// Build a record, clamping `correct` so the invariant holds.
    pub fn new(correct: u32, total: u32) -> Self {
        Self {
            correct: correct.min(total),
            total,
        }
    }

    pub fn record_correct(&mut self) {
        self.correct = self.correct.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    pub fn record_wrong(&mut self) {
        self.total = self.total.saturating_add(1);
    }

    pub fn tier(&self) -> MasteryTier {
        tier_of(self.correct, self.total)
    }

    /// Accuracy as a rounded percentage, 0 when there are no attempts.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_sample_is_none() {
        assert_eq!(tier_of(0, 0), MasteryTier::None);
        assert_eq!(tier_of(2, 2), MasteryTier::None);
    }

    #[test]
    fn thresholds_inclusive_at_lower_bound() {
        assert_eq!(tier_of(9, 10), MasteryTier::Gold);
        assert_eq!(tier_of(7, 10), MasteryTier::Silver);
        assert_eq!(tier_of(4, 10), MasteryTier::Bronze);
        assert_eq!(tier_of(3, 10), MasteryTier::None);
    }

    #[test]
    fn small_samples() {
        assert_eq!(tier_of(3, 3), MasteryTier::Gold);
        assert_eq!(tier_of(2, 3), MasteryTier::Bronze); // 0.667
        assert_eq!(tier_of(3, 4), MasteryTier::Silver); // 0.75
        assert_eq!(tier_of(1, 3), MasteryTier::None); // 0.333
    }

    #[test]
    fn tiers_ordered() {
        assert!(MasteryTier::None < MasteryTier::Bronze);
        assert!(MasteryTier::Bronze < MasteryTier::Silver);
        assert!(MasteryTier::Silver < MasteryTier::Gold);
        assert!(!MasteryTier::None.is_mastered());
        assert!(MasteryTier::Bronze.is_mastered());
    }

    #[test]
    fn record_counts() {
        let mut r = MasteryRecord::default();
        r.record_correct();
        r.record_correct();
        r.record_wrong();
        assert_eq!(r, MasteryRecord { correct: 2, total: 3 });
        assert_eq!(r.tier(), MasteryTier::Bronze);
        assert_eq!(r.accuracy_percent(), 67);
    }

    #[test]
    fn new_clamps_correct() {
        let r = MasteryRecord::new(5, 3);
        assert_eq!(r.correct, 3);
        assert_eq!(r.total, 3);
    }

    #[test]
    fn empty_record_percent_zero() {
        assert_eq!(MasteryRecord::default().accuracy_percent(), 0);
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&MasteryTier::Silver).unwrap();
        assert_eq!(json, "\"silver\"");
    }
}
