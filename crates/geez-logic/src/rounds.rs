//! Quiz round construction for the four game modes.
//!
//! | Mode | Prompt | Choices |
//! |------|--------|---------|
//! | Family Recognition | transliteration of one member of a chosen family | glyphs |
//! | Vowel Modifier | base glyph + target transliteration | the 7 vowel orders |
//! | Timed Challenge | transliteration of a random unlocked character | glyphs |
//! | Hear & Tap | pronunciation audio of a random unlocked character | glyphs |
//!
//! Rounds are pre-generated per session from the learner's unlocked pool.
//! Randomness comes from the caller's RNG; rounds never touch progression
//! state.

use crate::alphabet::{Consonant, Syllable, VOWEL_ORDER_COUNT};
use crate::distractors::generate_distractors;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Session shape shared by the round-based game modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rounds in a Family Recognition, Vowel Modifier, or Hear & Tap session.
    pub rounds_per_session: usize,
    /// Choices shown per multiple-choice question, including the answer.
    pub options_per_question: usize,
    /// Timed Challenge length in seconds.
    pub timed_seconds: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds_per_session: 10,
            options_per_question: 4,
            timed_seconds: crate::scoring::TIMED_CHALLENGE_SECONDS,
        }
    }
}

/// Game mode a round belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    FamilyRecognition,
    VowelModifier,
    TimedChallenge,
    HearTap,
}

/// A multiple-choice question: pick the glyph for `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRound {
    pub target: Syllable,
    /// Shuffled choices; always contains `target` exactly once.
    pub options: Vec<Syllable>,
}

impl QuizRound {
    pub fn is_correct(&self, choice: &Syllable) -> bool {
        *choice == self.target
    }

    /// The consonant family credited or debited for this round.
    pub fn family(&self) -> &'static Consonant {
        self.target.consonant()
    }

    /// Position of the answer within `options`.
    pub fn answer_index(&self) -> usize {
        self.options
            .iter()
            .position(|o| *o == self.target)
            .unwrap_or(0)
    }

    /// Audio references to warm before the round is shown (target first).
    pub fn audio_refs(&self) -> Vec<String> {
        std::iter::once(self.target.audio_ref())
            .chain(
                self.options
                    .iter()
                    .filter(|o| **o != self.target)
                    .map(Syllable::audio_ref),
            )
            .collect()
    }
}

/// Build a question about one of `consonant`'s seven forms.
pub fn family_round<R: Rng + ?Sized>(
    consonant: &'static Consonant,
    pool: &[&'static Consonant],
    options: usize,
    rng: &mut R,
) -> QuizRound {
    let target = Syllable::from_parts(consonant, rng.gen_range(0..VOWEL_ORDER_COUNT));
    build_round(target, pool, options, rng)
}

/// Build a question about a random character from the pool.
///
/// Returns `None` for an empty pool.
pub fn pool_round<R: Rng + ?Sized>(
    pool: &[&'static Consonant],
    options: usize,
    rng: &mut R,
) -> Option<QuizRound> {
    let consonant = *pool.choose(rng)?;
    Some(family_round(consonant, pool, options, rng))
}

fn build_round<R: Rng + ?Sized>(
    target: Syllable,
    pool: &[&'static Consonant],
    options: usize,
    rng: &mut R,
) -> QuizRound {
    let wanted = options.saturating_sub(1);
    let mut choices = Vec::with_capacity(options.max(1));
    choices.push(target);
    choices.extend(generate_distractors(
        target.consonant(),
        target.order(),
        pool,
        wanted,
        rng,
    ));
    choices.shuffle(rng);
    QuizRound {
        target,
        options: choices,
    }
}

/// Family Recognition session: every round drills `consonant`.
pub fn family_session<R: Rng + ?Sized>(
    consonant: &'static Consonant,
    pool: &[&'static Consonant],
    config: &SessionConfig,
    rng: &mut R,
) -> Vec<QuizRound> {
    (0..config.rounds_per_session)
        .map(|_| family_round(consonant, pool, config.options_per_question, rng))
        .collect()
}

/// Hear & Tap session: random unlocked characters, answered by ear.
pub fn hear_tap_session<R: Rng + ?Sized>(
    pool: &[&'static Consonant],
    config: &SessionConfig,
    rng: &mut R,
) -> Vec<QuizRound> {
    (0..config.rounds_per_session)
        .filter_map(|_| pool_round(pool, config.options_per_question, rng))
        .collect()
}

/// A Vowel Modifier question: turn the base glyph into `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VowelRound {
    pub target: Syllable,
}

impl VowelRound {
    /// The first-order form shown as the starting glyph.
    pub fn base(&self) -> Syllable {
        Syllable::from_parts(self.target.consonant(), 0)
    }

    pub fn is_correct(&self, order: usize) -> bool {
        order == self.target.order()
    }

    /// What the learner's choice turns the base into, for the reveal.
    pub fn result_of(&self, order: usize) -> Option<Syllable> {
        Syllable::new(self.target.consonant(), order).ok()
    }

    pub fn family(&self) -> &'static Consonant {
        self.target.consonant()
    }
}

pub fn vowel_round<R: Rng + ?Sized>(
    pool: &[&'static Consonant],
    rng: &mut R,
) -> Option<VowelRound> {
    let consonant = *pool.choose(rng)?;
    let order = rng.gen_range(0..VOWEL_ORDER_COUNT);
    Some(VowelRound {
        target: Syllable::from_parts(consonant, order),
    })
}

pub fn vowel_session<R: Rng + ?Sized>(
    pool: &[&'static Consonant],
    config: &SessionConfig,
    rng: &mut R,
) -> Vec<VowelRound> {
    (0..config.rounds_per_session)
        .filter_map(|_| vowel_round(pool, rng))
        .collect()
}
