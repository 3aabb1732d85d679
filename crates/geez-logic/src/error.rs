//! Invalid-argument errors.
//!
//! These are raised only by the pure alphabet lookups and always point at a
//! caller bug (an out-of-range vowel order or an id outside the alphabet).
//! Learner input never produces them.

use thiserror::Error;

/// A lookup was given an argument outside the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    /// Vowel order index outside `0..=6`.
    #[error("vowel order {0} out of range (expected 0..=6)")]
    InvalidVowelOrder(usize),

    /// Consonant id not present in the alphabet table.
    #[error("unknown consonant id: {0:?}")]
    UnknownConsonant(String),
}

pub type Result<T> = std::result::Result<T, AlphabetError>;
