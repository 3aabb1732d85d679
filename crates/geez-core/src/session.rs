//! Game session drivers.
//!
//! A session pre-generates its rounds from the unlocked pool, reports every
//! answer to the [`GameStore`], and drives audio through the presentation's
//! [`AudioSession`]. Audio calls are skipped entirely while the learner has
//! audio turned off.
//!
//! | Session | Audio |
//! |---------|-------|
//! | [`QuizSession`] (Family Recognition) | preloads the family, plays each target |
//! | [`QuizSession`] (Hear & Tap) | preloads each round, plays each target |
//! | [`VowelSession`] | cues only |
//! | [`TimedSession`] | cues only |

use crate::audio::{AudioAssets, AudioSession, SoundCue};
use crate::engine::GameStore;
use geez_logic::alphabet::{consonant_by_id, Consonant, Syllable};
use geez_logic::progression::{Event, Transition};
use geez_logic::rounds::{
    family_session, hear_tap_session, pool_round, vowel_session, GameMode, QuizRound, VowelRound,
};
use geez_logic::scoring::{SessionSummary, TimedChallenge};
use geez_logic::Result;
use rand::Rng;

/// Result of answering one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// The right answer, for the reveal.
    pub expected: Syllable,
    pub transition: Transition,
    /// Timed-challenge points; always 0 elsewhere.
    pub points: u32,
    /// Whether this answer ended the session.
    pub finished: bool,
}

// ── Audio gating ───────────────────────────────────────────────────────

fn audio_on(game: &GameStore) -> bool {
    game.settings().audio_enabled
}

fn cue(game: &GameStore, audio: &mut dyn AudioSession, sound: SoundCue) {
    if audio_on(game) {
        audio.cue(sound);
    }
}

/// Report an answer to the store and play the matching cue.
fn record_answer(
    game: &GameStore,
    audio: &mut dyn AudioSession,
    family: &Consonant,
    correct: bool,
) -> Transition {
    let transition = game.dispatch(Event::answer(family.id, correct));
    cue(
        game,
        audio,
        if correct {
            SoundCue::Correct
        } else {
            SoundCue::Wrong
        },
    );
    transition
}

fn finish(game: &GameStore, audio: &mut dyn AudioSession, summary: SessionSummary) {
    log::info!(
        "session finished: {}/{} ({}%)",
        summary.correct,
        summary.total,
        summary.percent()
    );
    if summary.celebrates() {
        cue(game, audio, SoundCue::LevelUp);
    }
}

// ── Multiple choice ────────────────────────────────────────────────────

/// Family Recognition and Hear & Tap: pick the glyph for the prompt.
#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: GameMode,
    rounds: Vec<QuizRound>,
    index: usize,
    summary: SessionSummary,
    assets: AudioAssets,
}

impl QuizSession {
    /// Ten rounds drilling one family, with distractors from the unlocked pool.
    pub fn family<R: Rng + ?Sized>(
        game: &GameStore,
        consonant_id: &str,
        rng: &mut R,
    ) -> Result<Self> {
        let consonant = consonant_by_id(consonant_id)?;
        let pool = game.get_state().unlocked_pool();
        let rounds = family_session(consonant, &pool, &game.config().session, rng);
        Ok(Self::from_rounds(game, GameMode::FamilyRecognition, rounds))
    }

    /// Rounds over random unlocked characters, answered by ear.
    pub fn hear_tap<R: Rng + ?Sized>(game: &GameStore, rng: &mut R) -> Self {
        let pool = game.get_state().unlocked_pool();
        let rounds = hear_tap_session(&pool, &game.config().session, rng);
        Self::from_rounds(game, GameMode::HearTap, rounds)
    }

    fn from_rounds(game: &GameStore, mode: GameMode, rounds: Vec<QuizRound>) -> Self {
        Self {
            mode,
            rounds,
            index: 0,
            summary: SessionSummary::default(),
            assets: game.config().audio_assets(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn rounds(&self) -> &[QuizRound] {
        &self.rounds
    }

    pub fn current(&self) -> Option<&QuizRound> {
        self.rounds.get(self.index)
    }

    /// Zero-based index of the current round.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.rounds.len()
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Warm the clips the first round needs and play its prompt.
    pub fn begin(&self, game: &GameStore, audio: &mut dyn AudioSession) {
        if !audio_on(game) {
            return;
        }
        let paths = match (self.mode, self.current()) {
            (GameMode::FamilyRecognition, Some(round)) => self.assets.family_paths(round.family()),
            (_, Some(round)) => self.round_paths(round),
            (_, None) => return,
        };
        audio.preload(&paths);
        self.replay(game, audio);
    }

    /// Play the current round's pronunciation again.
    pub fn replay(&self, game: &GameStore, audio: &mut dyn AudioSession) {
        if let Some(round) = self.current() {
            if audio_on(game) {
                audio.play(&self.assets.syllable_path(&round.target));
            }
        }
    }

    fn round_paths(&self, round: &QuizRound) -> Vec<String> {
        round
            .audio_refs()
            .iter()
            .map(|r| self.assets.path_for(r))
            .collect()
    }

    /// Answer the current round. `None` once the session is over.
    pub fn answer(
        &mut self,
        game: &GameStore,
        choice: &Syllable,
        audio: &mut dyn AudioSession,
    ) -> Option<AnswerOutcome> {
        let round = self.current()?.clone();
        let correct = round.is_correct(choice);
        let transition = record_answer(game, audio, round.family(), correct);
        self.summary = SessionSummary::new(
            self.summary.correct + u32::from(correct),
            self.summary.total + 1,
        );
        self.index += 1;

        let finished = self.is_finished();
        if finished {
            finish(game, audio, self.summary);
        } else if audio_on(game) {
            if let Some(next) = self.current() {
                if self.mode == GameMode::HearTap {
                    audio.preload(&self.round_paths(next));
                }
                audio.play(&self.assets.syllable_path(&next.target));
            }
        }

        Some(AnswerOutcome {
            correct,
            expected: round.target,
            transition,
            points: 0,
            finished,
        })
    }
}

// ── Vowel Modifier ─────────────────────────────────────────────────────

/// Pick the vowel order that turns the base glyph into the target.
#[derive(Debug, Clone)]
pub struct VowelSession {
    rounds: Vec<VowelRound>,
    index: usize,
    summary: SessionSummary,
}

impl VowelSession {
    pub fn new<R: Rng + ?Sized>(game: &GameStore, rng: &mut R) -> Self {
        let pool = game.get_state().unlocked_pool();
        Self {
            rounds: vowel_session(&pool, &game.config().session, rng),
            index: 0,
            summary: SessionSummary::default(),
        }
    }

    pub fn current(&self) -> Option<&VowelRound> {
        self.rounds.get(self.index)
    }

    pub fn rounds(&self) -> &[VowelRound] {
        &self.rounds
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.rounds.len()
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn answer(
        &mut self,
        game: &GameStore,
        order: usize,
        audio: &mut dyn AudioSession,
    ) -> Option<AnswerOutcome> {
        let round = *self.current()?;
        let correct = round.is_correct(order);
        let transition = record_answer(game, audio, round.family(), correct);
        self.summary = SessionSummary::new(
            self.summary.correct + u32::from(correct),
            self.summary.total + 1,
        );
        self.index += 1;
        let finished = self.is_finished();
        if finished {
            finish(game, audio, self.summary);
        }
        Some(AnswerOutcome {
            correct,
            expected: round.target,
            transition,
            points: 0,
            finished,
        })
    }
}

// ── Timed Challenge ────────────────────────────────────────────────────

/// As many questions as possible before the clock runs out.
///
/// Questions are generated one at a time; the clock is advanced by the
/// caller through [`TimedSession::tick`].
#[derive(Debug, Clone)]
pub struct TimedSession {
    challenge: TimedChallenge,
    pool: Vec<&'static Consonant>,
    options: usize,
    question: Option<QuizRound>,
}

impl TimedSession {
    pub fn new(game: &GameStore) -> Self {
        let config = &game.config().session;
        Self {
            challenge: TimedChallenge::new(config.timed_seconds),
            pool: game.get_state().unlocked_pool(),
            options: config.options_per_question,
            question: None,
        }
    }

    /// Start the clock and draw the first question.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.challenge.start();
        self.question = pool_round(&self.pool, self.options, rng);
    }

    pub fn challenge(&self) -> &TimedChallenge {
        &self.challenge
    }

    pub fn question(&self) -> Option<&QuizRound> {
        if self.challenge.is_playing() {
            self.question.as_ref()
        } else {
            None
        }
    }

    /// Advance the clock; plays the results cue when time runs out.
    pub fn tick(&mut self, game: &GameStore, seconds: u32, audio: &mut dyn AudioSession) -> bool {
        let ended = self.challenge.tick(seconds);
        if ended {
            self.question = None;
            finish(game, audio, self.challenge.summary());
        }
        ended
    }

    pub fn answer<R: Rng + ?Sized>(
        &mut self,
        game: &GameStore,
        choice: &Syllable,
        audio: &mut dyn AudioSession,
        rng: &mut R,
    ) -> Option<AnswerOutcome> {
        let round = self.question()?.clone();
        let correct = round.is_correct(choice);
        let points = self.challenge.answer(correct);
        let transition = record_answer(game, audio, round.family(), correct);
        self.question = pool_round(&self.pool, self.options, rng);
        Some(AnswerOutcome {
            correct,
            expected: round.target,
            transition,
            points,
            finished: false,
        })
    }

    pub fn summary(&self) -> SessionSummary {
        self.challenge.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCall, RecordingAudio};
    use geez_logic::settings::SettingChange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wrong_choice(round: &QuizRound) -> Syllable {
        *round
            .options
            .iter()
            .find(|o| !round.is_correct(o))
            .unwrap()
    }

    fn session_target_after_expiry() -> Syllable {
        Syllable::new(&geez_logic::alphabet::CONSONANTS[0], 0).unwrap()
    }

    #[test]
    fn perfect_family_session() {
        let game = GameStore::in_memory();
        let mut audio = RecordingAudio::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = QuizSession::family(&game, "h", &mut rng).unwrap();
        session.begin(&game, &mut audio);
        assert!(matches!(&audio.calls[0], AudioCall::Preload(p) if p.len() == 7));

        while let Some(round) = session.current().cloned() {
            let outcome = session.answer(&game, &round.target, &mut audio).unwrap();
            assert!(outcome.correct);
        }
        let first = session.rounds()[0].target;
        assert!(session.answer(&game, &first, &mut audio).is_none());
        assert_eq!(session.summary(), SessionSummary::new(10, 10));
        assert_eq!(game.get_state().record("h").unwrap().correct, 10);
        assert_eq!(audio.cues().last(), Some(&SoundCue::LevelUp));
        assert_eq!(audio.plays().len(), 10);
    }

    #[test]
    fn unknown_family_is_rejected() {
        let game = GameStore::in_memory();
        let mut rng = StdRng::seed_from_u64(2);
        assert!(QuizSession::family(&game, "xx", &mut rng).is_err());
    }

    #[test]
    fn wrong_answers_cue_wrong_and_no_fanfare() {
        let game = GameStore::in_memory();
        let mut audio = RecordingAudio::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = QuizSession::hear_tap(&game, &mut rng);
        while let Some(round) = session.current().cloned() {
            let outcome = session.answer(&game, &wrong_choice(&round), &mut audio).unwrap();
            assert!(!outcome.correct);
            assert_eq!(outcome.expected, round.target);
        }
        assert_eq!(session.summary().percent(), 0);
        assert!(audio.cues().iter().all(|c| *c == SoundCue::Wrong));
        assert_eq!(game.get_state().streak, 0);
    }

    #[test]
    fn muted_learner_hears_nothing() {
        let game = GameStore::in_memory();
        game.dispatch(Event::SetSetting(SettingChange::AudioEnabled(false)));
        let mut audio = RecordingAudio::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = QuizSession::family(&game, "l", &mut rng).unwrap();
        session.begin(&game, &mut audio);
        while let Some(round) = session.current().cloned() {
            session.answer(&game, &round.target, &mut audio);
        }
        assert!(audio.calls.is_empty());
    }

    #[test]
    fn vowel_session_scores_orders() {
        let game = GameStore::in_memory();
        let mut audio = RecordingAudio::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = VowelSession::new(&game, &mut rng);
        let mut correct = 0;
        for i in 0.. {
            let Some(round) = session.current().copied() else { break };
            let order = if i % 2 == 0 {
                round.target.order()
            } else {
                (round.target.order() + 1) % 7
            };
            let outcome = session.answer(&game, order, &mut audio).unwrap();
            correct += u32::from(outcome.correct);
        }
        assert_eq!(correct, 5);
        assert_eq!(session.summary(), SessionSummary::new(5, 10));
        assert!(!audio.cues().contains(&SoundCue::LevelUp));
    }

    #[test]
    fn timed_session_runs_until_clock_expires() {
        let game = GameStore::in_memory();
        let mut audio = RecordingAudio::new();
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = TimedSession::new(&game);
        assert!(session.question().is_none());
        session.start(&mut rng);

        let mut points = Vec::new();
        for _ in 0..7 {
            let round = session.question().unwrap().clone();
            let outcome = session.answer(&game, &round.target, &mut audio, &mut rng);
            points.push(outcome.unwrap().points);
            assert!(!session.tick(&game, 1, &mut audio));
        }
        assert_eq!(points, vec![10, 12, 14, 16, 18, 20, 20]);
        assert!(session.tick(&game, 60, &mut audio));
        assert!(session.question().is_none());
        let stale = session_target_after_expiry();
        assert!(session.answer(&game, &stale, &mut audio, &mut rng).is_none());
        assert_eq!(session.summary(), SessionSummary::new(7, 7));
        assert_eq!(audio.cues().last(), Some(&SoundCue::LevelUp));
        assert_eq!(game.get_state().best_streak, 7);
    }
}
