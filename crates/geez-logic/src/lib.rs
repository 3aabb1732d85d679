//! Pure learning logic for Geʽez Learn.
//!
//! This crate contains all game logic that is independent of storage,
//! rendering, or audio. Functions take plain data and return results, making
//! them unit-testable and portable across the native engine, the headless
//! simtest harness, and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`alphabet`] | 26 consonants × 7 vowel orders, glyph/transliteration/audio lookups |
//! | [`distractors`] | Mixed-strategy wrong-answer generation for quiz rounds |
//! | [`error`] | Invalid-argument errors raised by alphabet lookups |
//! | [`mastery`] | Accuracy records and bronze/silver/gold tiers |
//! | [`progression`] | Event reducer: xp, streaks, mastery table, unlocks |
//! | [`rounds`] | Quiz round construction for the four game modes |
//! | [`scoring`] | Levels, timed-challenge combos, session grading |
//! | [`settings`] | Learner preferences and romanization visibility |

pub mod alphabet;
pub mod distractors;
pub mod error;
pub mod mastery;
pub mod progression;
pub mod rounds;
pub mod scoring;
pub mod settings;

pub use error::{AlphabetError, Result};
