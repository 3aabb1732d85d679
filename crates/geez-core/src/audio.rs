//! Pronunciation audio and feedback cues.
//!
//! The engine never plays sound itself. The presentation owns an
//! [`AudioSession`] and hands it to game sessions, which decide *what* to
//! play; the session implementation decides *how*. Starting a new clip stops
//! the previous one, so at most one pronunciation is audible at a time.

use geez_logic::alphabet::{audio_ref_of, Consonant, Syllable, VOWEL_ORDER_COUNT};
use serde::{Deserialize, Serialize};

/// Default asset root for pronunciation clips.
pub const DEFAULT_AUDIO_ROOT: &str = "/audio/geez";

/// Short feedback sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Correct,
    Wrong,
    LevelUp,
}

/// Playback backend supplied by the presentation layer.
pub trait AudioSession {
    /// Play one clip, stopping whatever is currently playing.
    fn play(&mut self, path: &str);

    /// Warm clips that are about to be needed.
    fn preload(&mut self, paths: &[String]);

    fn stop(&mut self);

    fn cue(&mut self, cue: SoundCue);
}

/// Maps audio references to asset paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAssets {
    root: String,
}

impl Default for AudioAssets {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIO_ROOT)
    }
}

impl AudioAssets {
    pub fn new(root: impl Into<String>) -> Self {
        let root: String = root.into();
        Self {
            root: root.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// `<root>/<reference>.mp3`
    pub fn path_for(&self, reference: &str) -> String {
        format!("{}/{}.mp3", self.root, reference)
    }

    pub fn syllable_path(&self, syllable: &Syllable) -> String {
        self.path_for(&syllable.audio_ref())
    }

    /// All seven clips of a family, first order first.
    pub fn family_paths(&self, consonant: &Consonant) -> Vec<String> {
        (0..VOWEL_ORDER_COUNT)
            .filter_map(|order| audio_ref_of(consonant.id, order).ok())
            .map(|reference| self.path_for(&reference))
            .collect()
    }
}

/// Discards everything. Used headless and when no backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSession for NullAudio {
    fn play(&mut self, _path: &str) {}
    fn preload(&mut self, _paths: &[String]) {}
    fn stop(&mut self) {}
    fn cue(&mut self, _cue: SoundCue) {}
}

/// What a recording session heard, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Play(String),
    Preload(Vec<String>),
    Stop,
    Cue(SoundCue),
}

/// Records every call instead of playing it.
///
/// Tracks the single "currently playing" clip the way a real backend does:
/// `play` replaces it and `stop` clears it.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub calls: Vec<AudioCall>,
    pub now_playing: Option<String>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<SoundCue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Cue(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn plays(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Play(path) => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl AudioSession for RecordingAudio {
    fn play(&mut self, path: &str) {
        self.calls.push(AudioCall::Play(path.to_string()));
        self.now_playing = Some(path.to_string());
    }

    fn preload(&mut self, paths: &[String]) {
        self.calls.push(AudioCall::Preload(paths.to_vec()));
    }

    fn stop(&mut self) {
        self.calls.push(AudioCall::Stop);
        self.now_playing = None;
    }

    fn cue(&mut self, cue: SoundCue) {
        self.calls.push(AudioCall::Cue(cue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geez_logic::alphabet::{consonant_by_id, CONSONANTS};

    #[test]
    fn path_layout() {
        let assets = AudioAssets::default();
        assert_eq!(assets.path_for("geez_h_1"), "/audio/geez/geez_h_1.mp3");
        let s = Syllable::new(consonant_by_id("l").unwrap(), 3).unwrap();
        assert_eq!(assets.syllable_path(&s), "/audio/geez/geez_l_4.mp3");
    }

    #[test]
    fn trailing_slash_trimmed() {
        let assets = AudioAssets::new("assets/sounds/");
        assert_eq!(assets.path_for("x"), "assets/sounds/x.mp3");
    }

    #[test]
    fn family_paths_cover_seven_orders() {
        let paths = AudioAssets::default().family_paths(&CONSONANTS[0]);
        assert_eq!(paths.len(), 7);
        assert_eq!(paths[0], "/audio/geez/geez_h_1.mp3");
        assert_eq!(paths[6], "/audio/geez/geez_h_7.mp3");
    }

    #[test]
    fn recording_tracks_single_clip() {
        let mut audio = RecordingAudio::new();
        audio.play("a");
        audio.play("b");
        assert_eq!(audio.now_playing.as_deref(), Some("b"));
        audio.stop();
        assert_eq!(audio.now_playing, None);
        audio.cue(SoundCue::Correct);
        assert_eq!(audio.cues(), vec![SoundCue::Correct]);
        assert_eq!(audio.plays(), vec!["a", "b"]);
    }
}
