//! Distractor generation for quiz rounds.
//!
//! Uniformly random wrong answers are too easy to reject, so each attempt
//! picks one of three strategies at random:
//!
//! * [`Strategy::SameConsonant`]: same consonant, different vowel order
//!   (tests vowel discrimination)
//! * [`Strategy::SameVowel`]: different pool consonant, same vowel order
//!   (tests consonant discrimination)
//! * [`Strategy::Random`]: any pool consonant in any order
//!
//! Candidates that repeat an earlier pick or equal the correct answer are
//! thrown away. Generation stops after [`MAX_ATTEMPTS`] attempts and returns
//! whatever it found, so callers must accept a short list when the pool is
//! too small.
//!
//! ```
//! use geez_logic::alphabet::CONSONANTS;
//! use geez_logic::distractors::generate_distractors;
//! use rand::SeedableRng;
//!
//! let pool: Vec<_> = CONSONANTS[..4].iter().collect();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let wrong = generate_distractors(&CONSONANTS[0], 2, &pool, 3, &mut rng);
//! assert_eq!(wrong.len(), 3);
//! ```

use crate::alphabet::{Consonant, Syllable, VOWEL_ORDER_COUNT};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Attempt ceiling for a single call.
pub const MAX_ATTEMPTS: usize = 50;

/// How a single candidate is proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SameConsonant,
    SameVowel,
    Random,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::SameConsonant, Strategy::SameVowel, Strategy::Random];

    /// Propose one candidate. `None` when the strategy needs a pool
    /// consonant and the pool is empty.
    fn propose<R: Rng + ?Sized>(
        self,
        correct: &'static Consonant,
        correct_order: usize,
        pool: &[&'static Consonant],
        rng: &mut R,
    ) -> Option<Syllable> {
        match self {
            Strategy::SameConsonant => {
                let order = rng.gen_range(0..VOWEL_ORDER_COUNT);
                Some(Syllable::from_parts(correct, order))
            }
            Strategy::SameVowel => {
                let consonant = *pool.choose(rng)?;
                Some(Syllable::from_parts(consonant, correct_order))
            }
            Strategy::Random => {
                let consonant = *pool.choose(rng)?;
                let order = rng.gen_range(0..VOWEL_ORDER_COUNT);
                Some(Syllable::from_parts(consonant, order))
            }
        }
    }
}

/// Produce up to `count` distinct wrong answers for `(correct, correct_order)`.
///
/// Every result is drawn from `pool` × the seven vowel orders (or from the
/// correct consonant's own family), never equals the correct syllable, and
/// never repeats within one call. `correct_order` must be a valid vowel
/// order; an out-of-range value yields an empty list.
pub fn generate_distractors<R: Rng + ?Sized>(
    correct: &'static Consonant,
    correct_order: usize,
    pool: &[&'static Consonant],
    count: usize,
    rng: &mut R,
) -> Vec<Syllable> {
    let Ok(answer) = Syllable::new(correct, correct_order) else {
        log::warn!("distractors requested for invalid vowel order {correct_order}");
        return Vec::new();
    };

    let mut distractors = Vec::with_capacity(count);
    let mut used: HashSet<(&'static str, usize)> = HashSet::new();
    used.insert(answer.key());

    let mut attempts = 0;
    while distractors.len() < count && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let strategy = Strategy::ALL[rng.gen_range(0..Strategy::ALL.len())];
        let Some(candidate) = strategy.propose(correct, correct_order, pool, rng) else {
            continue;
        };
        if used.insert(candidate.key()) {
            distractors.push(candidate);
        }
    }

    if distractors.len() < count {
        log::debug!(
            "short distractor list for {}: {} of {} after {} attempts (pool {})",
            answer.translit(),
            distractors.len(),
            count,
            attempts,
            pool.len()
        );
    }

    distractors
}
