//! The progression reducer: xp, streaks, per-family mastery, and unlocks.
//!
//! All mutation goes through [`reduce`] (or its in-place twin
//! [`ProgressionState::apply`]). There is no hidden state and no randomness,
//! so replaying the same events over the same start state always lands on
//! the same result.
//!
//! # Experience
//!
//! A correct answer is worth `base_xp + min((streak - 1) * step, cap)`, where
//! `streak` is the value *after* the answer. With the defaults (10, 2, 10)
//! a streak earns 10, 12, 14, 16, 18, 20, 20, … xp.
//!
//! # Unlocking
//!
//! After any transition that touches the mastery table or the unlock list,
//! the most recently unlocked family is classified; once it leaves [`MasteryTier::None`] the
//! next family in canonical order is unlocked. Only the last-unlocked family
//! is ever inspected.
//!
//! ```
//! use geez_logic::progression::{reduce, Event, ProgressionConfig, ProgressionState};
//!
//! let config = ProgressionConfig::default();
//! let mut state = ProgressionState::default();
//! for _ in 0..3 {
//!     state = reduce(&state, &Event::answer_correct("m"), &config);
//! }
//! assert_eq!(state.unlocked_ids.last().map(String::as_str), Some("sz"));
//! ```

use crate::alphabet::{
    consonant_by_id, consonant_index, Consonant, CONSONANTS, INITIAL_UNLOCK_COUNT,
};
use crate::mastery::{MasteryRecord, MasteryTier};
use crate::scoring::{level_of, xp_in_level, XP_PER_LEVEL};
use crate::settings::{SettingChange, Settings};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Experience rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// XP for any correct answer.
    pub base_xp: u64,
    /// Extra XP per consecutive correct answer beyond the first.
    pub streak_bonus_step: u64,
    /// Maximum streak bonus.
    pub streak_bonus_cap: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_xp: 10,
            streak_bonus_step: 2,
            streak_bonus_cap: 10,
        }
    }
}

impl ProgressionConfig {
    /// XP awarded for a correct answer that brings the streak to `streak`.
    pub fn xp_for_streak(&self, streak: u32) -> u64 {
        let bonus = (u64::from(streak.saturating_sub(1)) * self.streak_bonus_step)
            .min(self.streak_bonus_cap);
        self.base_xp + bonus
    }
}

/// UI screens. Carried by navigation events but never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Screen {
    #[default]
    Home,
    Family,
    Vowel,
    Timed,
    Hear,
    Mastery,
    Settings,
    PickerFamily,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Family => "family",
            Screen::Vowel => "vowel",
            Screen::Timed => "timed",
            Screen::Hear => "hear",
            Screen::Mastery => "mastery",
            Screen::Settings => "settings",
            Screen::PickerFamily => "picker_family",
        }
    }
}

impl From<String> for Screen {
    /// Unrecognized screen names fall back to home.
    fn from(name: String) -> Self {
        match name.as_str() {
            "family" => Screen::Family,
            "vowel" => Screen::Vowel,
            "timed" => Screen::Timed,
            "hear" => Screen::Hear,
            "mastery" => Screen::Mastery,
            "settings" => Screen::Settings,
            "picker_family" => Screen::PickerFamily,
            _ => Screen::Home,
        }
    }
}

impl From<Screen> for String {
    fn from(screen: Screen) -> Self {
        screen.as_str().to_string()
    }
}

/// The persisted subset of [`ProgressionState`].
///
/// Decoding merges field by field over the default state: a missing, null,
/// or wrong-typed field keeps its default and the rest of the blob still
/// loads. Mastery records are merged one family at a time. UI fields are
/// deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub xp: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub mastery: BTreeMap<String, MasteryRecord>,
    pub unlocked_ids: Vec<String>,
    pub settings: Settings,
}

impl Default for Snapshot {
    fn default() -> Self {
        ProgressionState::default().snapshot()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let mut snapshot = Snapshot::default();
        merge_field(&fields, "xp", &mut snapshot.xp);
        merge_field(&fields, "streak", &mut snapshot.streak);
        merge_field(&fields, "bestStreak", &mut snapshot.best_streak);
        merge_field(&fields, "unlockedIds", &mut snapshot.unlocked_ids);
        merge_field(&fields, "settings", &mut snapshot.settings);

        let mut records = Map::new();
        merge_field(&fields, "mastery", &mut records);
        for (id, value) in &records {
            match MasteryRecord::deserialize(value) {
                Ok(record) => {
                    snapshot.mastery.insert(id.clone(), record);
                }
                Err(e) => log::warn!("saved mastery for {id:?} unreadable, dropped: {e}"),
            }
        }
        Ok(snapshot)
    }
}

/// Overwrite `slot` with `fields[key]` when present and well-typed.
fn merge_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = fields.get(key) else {
        return;
    };
    match T::deserialize(value) {
        Ok(decoded) => *slot = decoded,
        Err(e) => log::warn!("saved field {key:?} unreadable, kept default: {e}"),
    }
}

/// Everything that can happen to the progression state.
///
/// JSON shape is `{"type": "ANSWER_CORRECT", "payload": {"consonantId": "h"}}`.
/// Any unrecognized `type` decodes to [`Event::Unknown`] whatever its payload,
/// and is applied as a no-op so that newer and older front ends can share a
/// store. Payloads of payload-free events are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    AnswerCorrect {
        #[serde(rename = "consonantId")]
        consonant_id: String,
    },
    AnswerWrong {
        #[serde(rename = "consonantId")]
        consonant_id: String,
    },
    UnlockNext,
    Navigate {
        screen: Screen,
        #[serde(default, rename = "consonantId")]
        consonant_id: Option<String>,
    },
    Hydrate(Snapshot),
    SetSetting(SettingChange),
    ResetAll,
    Unknown,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerPayload {
    consonant_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigatePayload {
    screen: Screen,
    #[serde(default)]
    consonant_id: Option<String>,
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let RawEvent { kind, payload } = RawEvent::deserialize(deserializer)?;
        decode_event(&kind, payload).map_err(de::Error::custom)
    }
}

fn decode_event(kind: &str, payload: Value) -> serde_json::Result<Event> {
    Ok(match kind {
        "ANSWER_CORRECT" => {
            let AnswerPayload { consonant_id } = serde_json::from_value(payload)?;
            Event::AnswerCorrect { consonant_id }
        }
        "ANSWER_WRONG" => {
            let AnswerPayload { consonant_id } = serde_json::from_value(payload)?;
            Event::AnswerWrong { consonant_id }
        }
        "UNLOCK_NEXT" => Event::UnlockNext,
        "NAVIGATE" => {
            let NavigatePayload {
                screen,
                consonant_id,
            } = serde_json::from_value(payload)?;
            Event::Navigate {
                screen,
                consonant_id,
            }
        }
        "HYDRATE" => Event::Hydrate(serde_json::from_value(payload)?),
        "SET_SETTING" => Event::SetSetting(serde_json::from_value(payload)?),
        "RESET_ALL" => Event::ResetAll,
        other => {
            log::debug!("decoded unrecognized event type {other:?} as unknown");
            Event::Unknown
        }
    })
}

impl Event {
    pub fn answer_correct(consonant_id: impl Into<String>) -> Self {
        Event::AnswerCorrect {
            consonant_id: consonant_id.into(),
        }
    }

    pub fn answer_wrong(consonant_id: impl Into<String>) -> Self {
        Event::AnswerWrong {
            consonant_id: consonant_id.into(),
        }
    }

    /// Correct or wrong answer for a family.
    pub fn answer(consonant_id: impl Into<String>, is_correct: bool) -> Self {
        if is_correct {
            Self::answer_correct(consonant_id)
        } else {
            Self::answer_wrong(consonant_id)
        }
    }

    pub fn navigate(screen: Screen) -> Self {
        Event::Navigate {
            screen,
            consonant_id: None,
        }
    }

    pub fn navigate_to_family(screen: Screen, consonant_id: impl Into<String>) -> Self {
        Event::Navigate {
            screen,
            consonant_id: Some(consonant_id.into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::AnswerCorrect { .. } => "ANSWER_CORRECT",
            Event::AnswerWrong { .. } => "ANSWER_WRONG",
            Event::UnlockNext => "UNLOCK_NEXT",
            Event::Navigate { .. } => "NAVIGATE",
            Event::Hydrate(_) => "HYDRATE",
            Event::SetSetting(_) => "SET_SETTING",
            Event::ResetAll => "RESET_ALL",
            Event::Unknown => "UNKNOWN",
        }
    }
}

/// What a single transition did, for logging and feedback cues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub xp_gained: u64,
    /// Families unlocked by this transition, in unlock order.
    pub unlocked: Vec<&'static str>,
    /// Whether the persisted subset changed.
    pub persisted_changed: bool,
    pub leveled_up: bool,
}

/// A family's standing as shown on the mastery map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyStatus {
    pub consonant: &'static Consonant,
    pub unlocked: bool,
    pub record: MasteryRecord,
    pub tier: MasteryTier,
}

/// Root progression aggregate.
///
/// `unlocked_ids` is always a prefix of the canonical consonant order with
/// length in `INITIAL_UNLOCK_COUNT..=26`, and every mastery record satisfies
/// `correct <= total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionState {
    pub xp: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub mastery: BTreeMap<String, MasteryRecord>,
    pub unlocked_ids: Vec<String>,
    pub settings: Settings,
    pub screen: Screen,
    pub active_consonant_id: Option<String>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp: 0,
            streak: 0,
            best_streak: 0,
            mastery: BTreeMap::new(),
            unlocked_ids: canonical_prefix(INITIAL_UNLOCK_COUNT),
            settings: Settings::default(),
            screen: Screen::Home,
            active_consonant_id: None,
        }
    }
}

fn canonical_prefix(len: usize) -> Vec<String> {
    CONSONANTS[..len].iter().map(|c| c.id.to_string()).collect()
}

/// Apply one event, returning the next state. The input is left untouched.
pub fn reduce(
    state: &ProgressionState,
    event: &Event,
    config: &ProgressionConfig,
) -> ProgressionState {
    let mut next = state.clone();
    next.apply(event, config);
    next
}

impl ProgressionState {
    /// Restore from a persisted snapshot, merged over the default state.
    /// Equivalent to hydrating a fresh default state.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut state = Self::default();
        state.restore(snapshot);
        state.auto_unlock();
        state
    }

    /// The persisted subset.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            xp: self.xp,
            streak: self.streak,
            best_streak: self.best_streak,
            mastery: self.mastery.clone(),
            unlocked_ids: self.unlocked_ids.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Apply one event in place.
    pub fn apply(&mut self, event: &Event, config: &ProgressionConfig) -> Transition {
        let before = self.snapshot();
        let level_before = self.level();
        let mut transition = Transition::default();

        let check_unlock = match event {
            Event::AnswerCorrect { consonant_id } => {
                self.answer_correct(consonant_id, config, &mut transition)
            }
            Event::AnswerWrong { consonant_id } => self.answer_wrong(consonant_id),
            Event::UnlockNext => {
                if let Some(id) = self.unlock_next() {
                    transition.unlocked.push(id);
                }
                true
            }
            Event::Navigate {
                screen,
                consonant_id,
            } => {
                self.navigate(*screen, consonant_id.as_deref());
                false
            }
            Event::Hydrate(snapshot) => {
                self.restore(snapshot);
                true
            }
            Event::SetSetting(change) => {
                self.settings.apply(*change);
                false
            }
            Event::ResetAll => {
                log::info!("progress reset to defaults");
                *self = Self::default();
                false
            }
            Event::Unknown => {
                log::debug!("ignoring unrecognized event");
                false
            }
        };

        if check_unlock {
            transition.unlocked.extend(self.auto_unlock());
        }

        transition.persisted_changed = self.snapshot() != before;
        transition.leveled_up = self.level() > level_before;
        transition
    }

    fn answer_correct(
        &mut self,
        consonant_id: &str,
        config: &ProgressionConfig,
        transition: &mut Transition,
    ) -> bool {
        let Ok(consonant) = consonant_by_id(consonant_id) else {
            log::warn!("correct answer for unknown consonant {consonant_id:?} ignored");
            return false;
        };
        self.mastery
            .entry(consonant.id.to_string())
            .or_default()
            .record_correct();
        self.streak = self.streak.saturating_add(1);
        self.best_streak = self.best_streak.max(self.streak);
        let gained = config.xp_for_streak(self.streak);
        self.xp = self.xp.saturating_add(gained);
        transition.xp_gained = gained;
        true
    }

    fn answer_wrong(&mut self, consonant_id: &str) -> bool {
        let Ok(consonant) = consonant_by_id(consonant_id) else {
            log::warn!("wrong answer for unknown consonant {consonant_id:?} ignored");
            return false;
        };
        self.mastery
            .entry(consonant.id.to_string())
            .or_default()
            .record_wrong();
        self.streak = 0;
        true
    }

    /// Append the next canonical family. `None` once all 26 are unlocked.
    fn unlock_next(&mut self) -> Option<&'static str> {
        let next = CONSONANTS.get(self.unlocked_ids.len())?;
        self.unlocked_ids.push(next.id.to_string());
        log::info!(
            "unlocked family {} ({}/{})",
            next.id,
            self.unlocked_ids.len(),
            CONSONANTS.len()
        );
        Some(next.id)
    }

    /// Keep unlocking while the newest family has earned a tier.
    fn auto_unlock(&mut self) -> Vec<&'static str> {
        let mut unlocked = Vec::new();
        while self.latest_unlocked_tier().is_mastered() {
            match self.unlock_next() {
                Some(id) => unlocked.push(id),
                None => break,
            }
        }
        unlocked
    }

    fn latest_unlocked_tier(&self) -> MasteryTier {
        self.unlocked_ids
            .last()
            .map(|id| self.tier_for(id))
            .unwrap_or(MasteryTier::None)
    }

    fn navigate(&mut self, screen: Screen, consonant_id: Option<&str>) {
        self.screen = screen;
        if let Some(id) = consonant_id {
            match consonant_by_id(id) {
                Ok(c) => self.active_consonant_id = Some(c.id.to_string()),
                Err(e) => log::warn!("navigation kept previous family: {e}"),
            }
        }
    }

    /// Replace the persisted subset with a sanitized copy of `snapshot`.
    /// UI fields are left as they are.
    fn restore(&mut self, snapshot: &Snapshot) {
        let mut mastery = BTreeMap::new();
        for (id, record) in &snapshot.mastery {
            match consonant_by_id(id) {
                Ok(c) => {
                    let record = MasteryRecord::new(record.correct, record.total);
                    mastery.insert(c.id.to_string(), record);
                }
                Err(_) => log::warn!("dropping mastery for unknown family {id:?}"),
            }
        }

        let unlocked_len = snapshot
            .unlocked_ids
            .len()
            .clamp(INITIAL_UNLOCK_COUNT, CONSONANTS.len());
        let unlocked_ids = canonical_prefix(unlocked_len);
        if unlocked_ids != snapshot.unlocked_ids {
            log::debug!(
                "normalized unlocked families from {:?} to first {}",
                snapshot.unlocked_ids,
                unlocked_len
            );
        }

        self.xp = snapshot.xp;
        self.streak = snapshot.streak;
        self.best_streak = snapshot.best_streak.max(snapshot.streak);
        self.mastery = mastery;
        self.unlocked_ids = unlocked_ids;
        self.settings = snapshot.settings.clone();
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn level(&self) -> u64 {
        level_of(self.xp, XP_PER_LEVEL)
    }

    pub fn xp_in_level(&self) -> u64 {
        xp_in_level(self.xp, XP_PER_LEVEL)
    }

    pub fn record(&self, consonant_id: &str) -> Option<&MasteryRecord> {
        self.mastery.get(consonant_id)
    }

    pub fn tier_for(&self, consonant_id: &str) -> MasteryTier {
        self.record(consonant_id)
            .map(MasteryRecord::tier)
            .unwrap_or(MasteryTier::None)
    }

    pub fn is_unlocked(&self, consonant_id: &str) -> bool {
        self.unlocked_ids.iter().any(|id| id == consonant_id)
    }

    pub fn all_unlocked(&self) -> bool {
        self.unlocked_ids.len() >= CONSONANTS.len()
    }

    /// Unlocked families in canonical order: the distractor and round pool.
    pub fn unlocked_pool(&self) -> Vec<&'static Consonant> {
        self.unlocked_ids
            .iter()
            .filter_map(|id| consonant_index(id).map(|i| &CONSONANTS[i]))
            .collect()
    }

    /// The family that will unlock next, if any.
    pub fn next_unlock(&self) -> Option<&'static Consonant> {
        CONSONANTS.get(self.unlocked_ids.len())
    }

    pub fn active_consonant(&self) -> Option<&'static Consonant> {
        self.active_consonant_id
            .as_deref()
            .and_then(|id| consonant_by_id(id).ok())
    }

    /// Families (of all 26) holding any tier above none.
    pub fn mastered_count(&self) -> usize {
        CONSONANTS
            .iter()
            .filter(|c| self.tier_for(c.id).is_mastered())
            .count()
    }

    /// One entry per family in canonical order, for the mastery map.
    pub fn mastery_map(&self) -> Vec<FamilyStatus> {
        CONSONANTS
            .iter()
            .map(|c| {
                let record = self.record(c.id).copied().unwrap_or_default();
                FamilyStatus {
                    consonant: c,
                    unlocked: self.is_unlocked(c.id),
                    record,
                    tier: record.tier(),
                }
            })
            .collect()
    }

    pub fn should_show_romanization(&self, consonant_id: &str) -> bool {
        self.settings
            .should_show_romanization(self.record(consonant_id))
    }
}
