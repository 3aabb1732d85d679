//! Integration tests for the store against real and failing backends.
//!
//! Exercises: GameStore → KeyValueStore → snapshot JSON → GameStore

use geez_core::persistence::{read_snapshot, KeyValueStore};
use geez_core::prelude::*;
use geez_core::PersistError;
use geez_logic::settings::{RomanizationMode, SettingChange};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ── Helpers ────────────────────────────────────────────────────────────

/// A backend whose writes always fail.
struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Err(PersistError::Store("quota exceeded".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::Store("quota exceeded".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), PersistError> {
        Err(PersistError::Store("quota exceeded".into()))
    }
}

/// A backend whose writes park until the test lets them through.
struct GatedStore {
    inner: MemoryStore,
    entered: Sender<()>,
    release: Receiver<()>,
}

impl KeyValueStore for GatedStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let _ = self.entered.send(());
        let _ = self.release.recv_timeout(Duration::from_secs(5));
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.inner.remove(key)
    }
}

fn file_game(dir: &std::path::Path) -> GameStore {
    let store = FileStore::open(dir).unwrap();
    GameStore::new(Box::new(store), EngineConfig::default())
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn store_keeps_working_when_saves_fail() {
    let game = GameStore::new(Box::new(FailingStore), EngineConfig::default());
    assert_eq!(game.get_state(), ProgressionState::default());

    for _ in 0..3 {
        game.dispatch(Event::answer_correct("h"));
    }
    game.dispatch(Event::answer_wrong("h"));

    let state = game.get_state();
    assert_eq!(state.xp, 36);
    assert_eq!(state.streak, 0);
    assert_eq!(state.tier_for("h"), MasteryTier::Silver);
    assert_eq!(game.save_failures(), 4);
}

#[test]
fn progress_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let game = file_game(dir.path());
        for _ in 0..3 {
            game.dispatch(Event::answer_correct("m"));
        }
        game.dispatch(Event::SetSetting(SettingChange::ShowRomanization(
            RomanizationMode::Early,
        )));
        game.dispatch(Event::navigate_to_family(Screen::Family, "m"));
    }

    let game = file_game(dir.path());
    let state = game.get_state();
    assert_eq!(state.xp, 36);
    assert_eq!(state.best_streak, 3);
    assert_eq!(state.unlocked_ids, vec!["h", "l", "hh", "m", "sz"]);
    assert_eq!(state.settings.show_romanization, RomanizationMode::Early);
    assert!(!state.should_show_romanization("m"));
    assert_eq!(state.screen, Screen::Home);
    assert_eq!(state.active_consonant_id, None);
}

#[test]
fn corrupt_save_starts_fresh_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let mut raw = FileStore::open(dir.path()).unwrap();
    raw.set(STORAGE_KEY, "\u{0}\u{1}garbage").unwrap();

    let game = file_game(dir.path());
    assert_eq!(game.get_state(), ProgressionState::default());

    game.dispatch(Event::answer_correct("l"));
    let saved = read_snapshot(&raw, STORAGE_KEY).unwrap().unwrap();
    assert_eq!(saved.xp, 10);
}

#[test]
fn tampered_save_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let mut raw = FileStore::open(dir.path()).unwrap();
    raw.set(
        STORAGE_KEY,
        r#"{"xp":50,"streak":4,"bestStreak":1,
            "mastery":{"h":{"correct":9,"total":5},"qq":{"correct":1,"total":1}},
            "unlockedIds":["h","p"]}"#,
    )
    .unwrap();

    let state = file_game(dir.path()).get_state();
    assert_eq!(state.best_streak, 4);
    assert_eq!(state.unlocked_ids, vec!["h", "l", "hh", "m"]);
    assert_eq!(state.record("h").unwrap().correct, 5);
    assert!(state.record("qq").is_none());
}

#[test]
fn slow_save_does_not_hold_up_other_dispatches() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let backend = GatedStore {
        inner: MemoryStore::new(),
        entered: entered_tx,
        release: release_rx,
    };
    let game = Arc::new(GameStore::new(Box::new(backend), EngineConfig::default()));

    let writer = {
        let game = Arc::clone(&game);
        thread::spawn(move || game.dispatch(Event::answer_correct("h")))
    };
    // The first save is now parked inside the backend.
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let started = Instant::now();
    let t = game.dispatch(Event::answer_correct("l"));
    assert_eq!(t.xp_gained, 12);
    assert_eq!(game.get_state().xp, 22);
    assert!(game.settings().audio_enabled);
    assert!(started.elapsed() < Duration::from_secs(2));

    // The parked writer picks up the newer snapshot before it returns.
    release_tx.send(()).unwrap();
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    release_tx.send(()).unwrap();
    writer.join().unwrap();

    let saved = game
        .with_store(|s| read_snapshot(s, STORAGE_KEY).unwrap())
        .unwrap();
    assert_eq!(saved.xp, 22);
    assert_eq!(saved, game.get_state().snapshot());
    assert_eq!(game.save_failures(), 0);
}

#[test]
fn save_with_one_bad_field_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let mut raw = FileStore::open(dir.path()).unwrap();
    raw.set(
        STORAGE_KEY,
        r#"{"xp":500,"settings":null,"mastery":{"m":{"correct":3,"total":3},"h":7}}"#,
    )
    .unwrap();

    let state = file_game(dir.path()).get_state();
    assert_eq!(state.xp, 500);
    assert_eq!(state.level(), 6);
    assert!(state.settings.audio_enabled);
    assert!(state.record("h").is_none());
    assert_eq!(state.unlocked_ids.last().map(String::as_str), Some("sz"));
}

#[test]
fn custom_storage_key_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        storage_key: "geez-dev".into(),
        ..EngineConfig::default()
    };
    let game = GameStore::new(Box::new(FileStore::open(dir.path()).unwrap()), config);
    game.dispatch(Event::answer_correct("h"));
    assert!(dir.path().join("geez-dev.json").exists());
    assert!(!dir.path().join("geez-learn-progress.json").exists());
}

#[test]
fn sessions_share_one_store_across_threads() {
    let game = Arc::new(GameStore::in_memory());
    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let game = Arc::clone(&game);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut audio = NullAudio;
                let mut session = QuizSession::hear_tap(&game, &mut rng);
                while let Some(round) = session.current().cloned() {
                    session.answer(&game, &round.target, &mut audio);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let state = game.get_state();
    let answered: u32 = state.mastery.values().map(|r| r.total).sum();
    assert_eq!(answered, 40);
    assert_eq!(state.mastery.values().map(|r| r.correct).sum::<u32>(), 40);
    let saved = game
        .with_store(|s| read_snapshot(s, STORAGE_KEY).unwrap())
        .unwrap();
    assert_eq!(saved, state.snapshot());
}
