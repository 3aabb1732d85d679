//! Geʽez Learn Headless Learner Harness
//!
//! Validates the alphabet tables, the pure rules, and the store end to end
//! by simulating learners of different skill through every game mode.
//! Runs entirely in-process: no front end, no audio device.
//!
//! Usage:
//!   cargo run -p geez-simtest
//!   cargo run -p geez-simtest -- --verbose --seed 7

use clap::Parser;
use geez_core::audio::RecordingAudio;
use geez_core::persistence::{read_snapshot, KeyValueStore};
use geez_core::prelude::*;
use geez_logic::alphabet::{
    audio_ref_of, family_of, translit_of, Syllable, CONSONANTS, TOTAL_CHARACTERS,
    VOWEL_ORDER_COUNT,
};
use geez_logic::distractors::generate_distractors;
use geez_logic::mastery::tier_of;
use geez_logic::progression::{reduce, ProgressionConfig};
use geez_logic::rounds::QuizRound;
use geez_logic::scoring::TimedChallenge;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Headless learner simulation for Geʽez Learn.
#[derive(Parser)]
#[command(name = "geez-simtest", version, about)]
struct Args {
    /// Print every check and a sample of the alphabet
    #[arg(long)]
    verbose: bool,

    /// Seed for distractors, sessions, and simulated learners
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== Geʽez Learn Simulation Harness (seed {}) ===\n", args.seed);

    let mut results = Vec::new();

    // 1. Alphabet tables
    results.extend(validate_alphabet(args.verbose));

    // 2. Mastery thresholds
    results.extend(validate_mastery());

    // 3. Distractor sweep
    results.extend(validate_distractors(args.seed));

    // 4. Reducer scenarios
    results.extend(validate_reducer());

    // 5. Timed challenge scoring
    results.extend(validate_timed_scoring());

    // 6. Simulated learners through every game mode
    results.extend(simulate_learners(args.seed, args.verbose));

    // 7. Persistence on disk
    results.extend(validate_persistence(args.seed));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Alphabet ─────────────────────────────────────────────────────────

fn validate_alphabet(verbose: bool) -> Vec<TestResult> {
    println!("--- Alphabet ---");
    let mut results = Vec::new();

    let ids: HashSet<_> = CONSONANTS.iter().map(|c| c.id).collect();
    results.push(TestResult::new(
        "alphabet_unique_ids",
        ids.len() == CONSONANTS.len(),
        format!("{} consonants, {} distinct ids", CONSONANTS.len(), ids.len()),
    ));

    let mut glyphs = HashSet::new();
    let mut translits = HashSet::new();
    let mut bad_refs = Vec::new();
    for c in CONSONANTS.iter() {
        for member in family_of(c) {
            glyphs.insert(member.glyph);
            translits.insert(member.translit.clone());
            let expected = format!("geez_{}_{}", c.id, member.order + 1);
            if audio_ref_of(c.id, member.order).ok().as_deref() != Some(expected.as_str()) {
                bad_refs.push(expected);
            }
        }
    }
    results.push(TestResult::new(
        "alphabet_distinct_glyphs",
        glyphs.len() == TOTAL_CHARACTERS,
        format!("{}/{} distinct glyphs", glyphs.len(), TOTAL_CHARACTERS),
    ));
    results.push(TestResult::new(
        "alphabet_distinct_translits",
        translits.len() == TOTAL_CHARACTERS,
        format!("{}/{} distinct transliterations", translits.len(), TOTAL_CHARACTERS),
    ));
    results.push(TestResult::new(
        "alphabet_audio_refs",
        bad_refs.is_empty(),
        if bad_refs.is_empty() {
            "all references follow geez_<id>_<n>".to_string()
        } else {
            format!("{} malformed, first {}", bad_refs.len(), bad_refs[0])
        },
    ));

    let out_of_range = translit_of(&CONSONANTS[0], VOWEL_ORDER_COUNT).is_err();
    results.push(TestResult::new(
        "alphabet_rejects_order_7",
        out_of_range,
        "order 7 is an invalid argument",
    ));

    if verbose {
        for c in CONSONANTS.iter().take(4) {
            let row: String = family_of(c).iter().map(|m| m.glyph).collect();
            println!("  {:>3} {}", c.id, row);
        }
    }
    results
}

// ── 2. Mastery ──────────────────────────────────────────────────────────

fn validate_mastery() -> Vec<TestResult> {
    println!("--- Mastery ---");
    let mut results = Vec::new();

    let mut violations = 0;
    for total in 0..60 {
        for correct in 1..=total {
            if tier_of(correct - 1, total) > tier_of(correct, total) {
                violations += 1;
            }
        }
    }
    results.push(TestResult::new(
        "mastery_monotone",
        violations == 0,
        format!("{violations} monotonicity violations over totals 0..60"),
    ));

    let boundaries = [
        (tier_of(2, 2), MasteryTier::None),
        (tier_of(9, 10), MasteryTier::Gold),
        (tier_of(7, 10), MasteryTier::Silver),
        (tier_of(4, 10), MasteryTier::Bronze),
        (tier_of(3, 10), MasteryTier::None),
    ];
    let wrong = boundaries.iter().filter(|(got, want)| got != want).count();
    results.push(TestResult::new(
        "mastery_boundaries",
        wrong == 0,
        format!("{}/{} boundary cases correct", boundaries.len() - wrong, boundaries.len()),
    ));
    results
}

// ── 3. Distractors ──────────────────────────────────────────────────────

fn validate_distractors(seed: u64) -> Vec<TestResult> {
    println!("--- Distractors ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut bad = 0;
    let mut short_on_small_pool = 0;
    let trials = 2000;
    for _ in 0..trials {
        let pool_len = rng.gen_range(4..=CONSONANTS.len());
        let pool: Vec<_> = CONSONANTS[..pool_len].iter().collect();
        let correct = pool[rng.gen_range(0..pool.len())];
        let order = rng.gen_range(0..VOWEL_ORDER_COUNT);
        let wrong = generate_distractors(correct, order, &pool, 3, &mut rng);

        let answer = Syllable::new(correct, order).ok();
        let keys: HashSet<_> = wrong.iter().map(Syllable::key).collect();
        if keys.len() != wrong.len() || wrong.iter().any(|s| Some(*s) == answer) {
            bad += 1;
        }
        if wrong.len() != 3 {
            short_on_small_pool += 1;
        }
    }
    results.push(TestResult::new(
        "distractors_valid",
        bad == 0,
        format!("{bad}/{trials} results contained the answer or a repeat"),
    ));
    results.push(TestResult::new(
        "distractors_full_count",
        short_on_small_pool == 0,
        format!("{short_on_small_pool}/{trials} results came back short"),
    ));

    let tiny = generate_distractors(&CONSONANTS[0], 0, &[], 10, &mut rng);
    let same_family = tiny
        .iter()
        .all(|s| s.consonant().id == CONSONANTS[0].id && s.order() != 0);
    results.push(TestResult::new(
        "distractors_empty_pool",
        same_family && tiny.len() <= VOWEL_ORDER_COUNT - 1,
        format!("empty pool yields {} same-family options", tiny.len()),
    ));
    results
}

// ── 4. Reducer ──────────────────────────────────────────────────────────

fn validate_reducer() -> Vec<TestResult> {
    println!("--- Reducer ---");
    let mut results = Vec::new();
    let config = ProgressionConfig::default();
    let run = |events: &[Event]| {
        events
            .iter()
            .fold(ProgressionState::default(), |s, e| reduce(&s, e, &config))
    };

    let s = run(&[
        Event::answer_correct("h"),
        Event::answer_correct("h"),
        Event::answer_correct("h"),
        Event::answer_wrong("h"),
    ]);
    let record = s.record("h").copied().unwrap_or_default();
    results.push(TestResult::new(
        "reducer_answer_scenario",
        s.xp == 36
            && s.streak == 0
            && (record.correct, record.total) == (3, 4)
            && s.tier_for("h") == MasteryTier::Silver,
        format!(
            "xp {} streak {} record {}/{} tier {}",
            s.xp,
            s.streak,
            record.correct,
            record.total,
            s.tier_for("h")
        ),
    ));

    let s = run(&vec![Event::answer_correct("m"); 3]);
    results.push(TestResult::new(
        "reducer_unlock_scenario",
        s.unlocked_ids == ["h", "l", "hh", "m", "sz"],
        format!("unlocked {:?}", s.unlocked_ids),
    ));

    let base = run(&[Event::answer_correct("l")]);
    let after = reduce(&base, &Event::answer_correct("zz"), &config);
    results.push(TestResult::new(
        "reducer_unknown_id_identity",
        after == base,
        "answer for unknown family leaves state untouched",
    ));

    let decoded: Result<Event, _> =
        serde_json::from_str(r#"{"payload":{"goal":5},"type":"FROM_THE_FUTURE"}"#);
    results.push(TestResult::new(
        "reducer_unknown_event",
        matches!(decoded, Ok(Event::Unknown)),
        format!("decoded as {decoded:?}"),
    ));
    results
}

// ── 5. Timed challenge ──────────────────────────────────────────────────

fn validate_timed_scoring() -> Vec<TestResult> {
    println!("--- Timed Challenge ---");
    let mut challenge = TimedChallenge::default();
    challenge.start();
    let points: Vec<u32> = (0..8).map(|_| challenge.answer(true)).collect();
    let expected = vec![10, 12, 14, 16, 18, 20, 20, 20];
    vec![TestResult::new(
        "timed_points_sequence",
        points == expected,
        format!("{points:?}"),
    )]
}

// ── 6. Learners ─────────────────────────────────────────────────────────

struct Learner {
    name: &'static str,
    accuracy: f64,
}

const LEARNERS: [Learner; 3] = [
    Learner {
        name: "steady",
        accuracy: 0.95,
    },
    Learner {
        name: "average",
        accuracy: 0.7,
    },
    Learner {
        name: "struggling",
        accuracy: 0.2,
    },
];

const SESSIONS_PER_MODE: usize = 20;

fn pick(round: &QuizRound, correct: bool) -> Syllable {
    if correct {
        return round.target;
    }
    round
        .options
        .iter()
        .copied()
        .find(|o| !round.is_correct(o))
        .unwrap_or(round.target)
}

/// Invariants that must hold after every dispatch.
fn invariant_violations(before: &ProgressionState, after: &ProgressionState) -> Vec<String> {
    let mut v = Vec::new();
    if !after.unlocked_ids.starts_with(&before.unlocked_ids) {
        v.push("unlocked families shrank or reordered".to_string());
    }
    let canonical: Vec<_> = CONSONANTS[..after.unlocked_ids.len()]
        .iter()
        .map(|c| c.id)
        .collect();
    if after.unlocked_ids != canonical {
        v.push("unlocked families are not a canonical prefix".to_string());
    }
    if after.best_streak < after.streak {
        v.push("best streak below streak".to_string());
    }
    if after.mastery.values().any(|r| r.correct > r.total) {
        v.push("mastery record with correct > total".to_string());
    }
    if after.xp < before.xp {
        v.push("xp decreased".to_string());
    }
    v
}

fn play_learner(
    learner: &Learner,
    seed: u64,
    verbose: bool,
) -> (ProgressionState, Vec<String>, bool) {
    let game = GameStore::in_memory();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut audio = RecordingAudio::new();
    let mut violations = Vec::new();
    let mut check = |before: &ProgressionState, game: &GameStore| {
        violations.extend(invariant_violations(before, &game.get_state()));
    };

    for _ in 0..SESSIONS_PER_MODE {
        // Family Recognition on the newest family.
        let newest = game.get_state().unlocked_ids.last().cloned().unwrap_or_default();
        if let Ok(mut session) = QuizSession::family(&game, &newest, &mut rng) {
            session.begin(&game, &mut audio);
            while let Some(round) = session.current().cloned() {
                let before = game.get_state();
                let choice = pick(&round, rng.gen_bool(learner.accuracy));
                session.answer(&game, &choice, &mut audio);
                check(&before, &game);
            }
        }

        // Hear & Tap.
        let mut session = QuizSession::hear_tap(&game, &mut rng);
        session.begin(&game, &mut audio);
        while let Some(round) = session.current().cloned() {
            let before = game.get_state();
            let choice = pick(&round, rng.gen_bool(learner.accuracy));
            session.answer(&game, &choice, &mut audio);
            check(&before, &game);
        }

        // Vowel Modifier.
        let mut session = VowelSession::new(&game, &mut rng);
        while let Some(round) = session.current().copied() {
            let before = game.get_state();
            let order = if rng.gen_bool(learner.accuracy) {
                round.target.order()
            } else {
                (round.target.order() + 1) % VOWEL_ORDER_COUNT
            };
            session.answer(&game, order, &mut audio);
            check(&before, &game);
        }

        // Timed Challenge: one answer every two seconds.
        let mut session = TimedSession::new(&game);
        session.start(&mut rng);
        while let Some(round) = session.question().cloned() {
            let before = game.get_state();
            let choice = pick(&round, rng.gen_bool(learner.accuracy));
            session.answer(&game, &choice, &mut audio, &mut rng);
            check(&before, &game);
            session.tick(&game, 2, &mut audio);
        }
    }

    let state = game.get_state();
    let saved = game.with_store(|s| read_snapshot(s, STORAGE_KEY).ok().flatten());
    let persisted = saved.as_ref() == Some(&state.snapshot());

    if verbose {
        println!(
            "  {:<10} level {:>3} xp {:>6} best streak {:>3} unlocked {:>2}/26 mastered {:>2} cues {}",
            learner.name,
            state.level(),
            state.xp,
            state.best_streak,
            state.unlocked_ids.len(),
            state.mastered_count(),
            audio.cues().len(),
        );
    }
    (state, violations, persisted)
}

fn simulate_learners(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Learners ---");
    let mut results = Vec::new();
    let mut unlocked = Vec::new();

    for (i, learner) in LEARNERS.iter().enumerate() {
        let (state, violations, persisted) =
            play_learner(learner, seed.wrapping_add(i as u64), verbose);
        results.push(TestResult::new(
            &format!("learner_{}_invariants", learner.name),
            violations.is_empty(),
            match violations.first() {
                None => format!("{} families unlocked, no violations", state.unlocked_ids.len()),
                Some(first) => format!("{} violations, first: {first}", violations.len()),
            },
        ));
        results.push(TestResult::new(
            &format!("learner_{}_persisted", learner.name),
            persisted,
            "saved snapshot matches live state",
        ));
        unlocked.push(state.unlocked_ids.len());
    }

    let (steady, struggling) = (unlocked[0], unlocked[2]);
    results.push(TestResult::new(
        "learners_skill_ordering",
        steady >= struggling && steady >= 10,
        format!("steady unlocked {steady}, struggling unlocked {struggling}"),
    ));
    results
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(seed: u64) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            results.push(TestResult::new(
                "persistence_tempdir",
                false,
                format!("cannot create temp dir: {e}"),
            ));
            return results;
        }
    };
    let open = || {
        FileStore::open(dir.path())
            .map(|store| GameStore::new(Box::new(store), EngineConfig::default()))
    };

    let before = match open() {
        Ok(game) => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut audio = RecordingAudio::new();
            let mut session = QuizSession::hear_tap(&game, &mut rng);
            while let Some(round) = session.current().cloned() {
                let choice = pick(&round, rng.gen_bool(0.8));
                session.answer(&game, &choice, &mut audio);
            }
            game.dispatch(Event::navigate(Screen::Mastery));
            game.get_state()
        }
        Err(e) => {
            results.push(TestResult::new("persistence_open", false, e.to_string()));
            return results;
        }
    };

    match open() {
        Ok(game) => {
            let after = game.get_state();
            results.push(TestResult::new(
                "persistence_reload",
                after.snapshot() == before.snapshot() && after.screen == Screen::Home,
                format!("reloaded {} xp, screen {}", after.xp, after.screen.as_str()),
            ));
        }
        Err(e) => results.push(TestResult::new("persistence_reload", false, e.to_string())),
    }

    let corrupted = FileStore::open(dir.path())
        .and_then(|mut raw| raw.set(STORAGE_KEY, "not json at all"))
        .and_then(|_| open());
    results.push(TestResult::new(
        "persistence_corrupt_cold_start",
        matches!(&corrupted, Ok(game) if game.get_state() == ProgressionState::default()),
        "unparseable snapshot falls back to a fresh start",
    ));
    results
}
