//! The Geʽez abugida: 26 base consonants × 7 vowel orders = 182 characters.
//!
//! Characters are never stored. Each consonant row starts at a base
//! codepoint in the Ethiopic block and the seven vowel forms are sequential,
//! so a character is derived as `base + order`.
//!
//! ```
//! use geez_logic::alphabet::{char_of, consonant_by_id, translit_of};
//!
//! let h = consonant_by_id("h").unwrap();
//! assert_eq!(char_of(h, 0).unwrap(), 'ሀ');
//! assert_eq!(translit_of(h, 1).unwrap(), "hu");
//! ```
//!
//! The table ordering is significant: it is the unlock sequence.

use crate::error::{AlphabetError, Result};
use serde::Serialize;

/// Number of consonant families unlocked on a fresh install.
pub const INITIAL_UNLOCK_COUNT: usize = 4;

/// Number of consonant families.
pub const CONSONANT_COUNT: usize = 26;

/// Number of vowel orders per consonant family.
pub const VOWEL_ORDER_COUNT: usize = 7;

/// Total derived characters in the alphabet.
pub const TOTAL_CHARACTERS: usize = CONSONANT_COUNT * VOWEL_ORDER_COUNT;

/// One base consonant of the abugida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Consonant {
    /// Short unique code, also used in storage keys and audio references.
    pub id: &'static str,
    /// Traditional letter name.
    pub name: &'static str,
    /// Codepoint of the first-order form.
    pub base: u32,
    /// Latin transliteration of the bare consonant.
    pub latin: &'static str,
}

impl Consonant {
    const fn new(id: &'static str, name: &'static str, base: u32, latin: &'static str) -> Self {
        Self {
            id,
            name,
            base,
            latin,
        }
    }
}

/// One of the seven vowel orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VowelOrder {
    pub index: usize,
    pub name: &'static str,
    pub vowel: &'static str,
    /// Ordinal label ("1st" … "7th").
    pub label: &'static str,
}

pub static VOWEL_ORDERS: [VowelOrder; VOWEL_ORDER_COUNT] = [
    VowelOrder { index: 0, name: "Geʽez", vowel: "ä", label: "1st" },
    VowelOrder { index: 1, name: "Kaʽib", vowel: "u", label: "2nd" },
    VowelOrder { index: 2, name: "Salis", vowel: "i", label: "3rd" },
    VowelOrder { index: 3, name: "Rabiʽ", vowel: "a", label: "4th" },
    VowelOrder { index: 4, name: "Hamis", vowel: "e", label: "5th" },
    VowelOrder { index: 5, name: "Sadis", vowel: "ə", label: "6th" },
    VowelOrder { index: 6, name: "Sabiʽ", vowel: "o", label: "7th" },
];

pub static CONSONANTS: [Consonant; CONSONANT_COUNT] = [
    Consonant::new("h", "hoy", 0x1200, "h"),
    Consonant::new("l", "lawe", 0x1208, "l"),
    Consonant::new("hh", "ḥawt", 0x1210, "ḥ"),
    Consonant::new("m", "may", 0x1218, "m"),
    Consonant::new("sz", "śawt", 0x1220, "ś"),
    Consonant::new("r", "rəʾs", 0x1228, "r"),
    Consonant::new("s", "sat", 0x1230, "s"),
    Consonant::new("q", "qaf", 0x1240, "q"),
    Consonant::new("b", "bet", 0x1260, "b"),
    Consonant::new("t", "taw", 0x1270, "t"),
    Consonant::new("x", "ḫarm", 0x1280, "ḫ"),
    Consonant::new("n", "nahas", 0x1290, "n"),
    Consonant::new("alef", "ʾalf", 0x12A0, "ʾ"),
    Consonant::new("k", "kaf", 0x12A8, "k"),
    Consonant::new("w", "wawe", 0x12C8, "w"),
    Consonant::new("ayin", "ʿayn", 0x12D0, "ʿ"),
    Consonant::new("z", "zay", 0x12D8, "z"),
    Consonant::new("y", "yaman", 0x12E8, "y"),
    Consonant::new("d", "dənt", 0x12F0, "d"),
    Consonant::new("g", "gaml", 0x1308, "g"),
    Consonant::new("tt", "ṭayt", 0x1320, "ṭ"),
    Consonant::new("pp", "ṗayt", 0x1330, "ṗ"),
    Consonant::new("ts", "ṣadäy", 0x1338, "ṣ"),
    Consonant::new("tss", "ṣ́appa", 0x1340, "ṣ́"),
    Consonant::new("f", "af", 0x1348, "f"),
    Consonant::new("p", "psa", 0x1350, "p"),
];

fn vowel_order(order: usize) -> Result<&'static VowelOrder> {
    VOWEL_ORDERS
        .get(order)
        .ok_or(AlphabetError::InvalidVowelOrder(order))
}

/// Position of a consonant in the canonical (unlock) order.
pub fn consonant_index(id: &str) -> Option<usize> {
    CONSONANTS.iter().position(|c| c.id == id)
}

/// Look up a consonant by id.
pub fn consonant_by_id(id: &str) -> Result<&'static Consonant> {
    CONSONANTS
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| AlphabetError::UnknownConsonant(id.to_string()))
}

/// The Ethiopic glyph for `consonant` in vowel order `order` (0–6).
pub fn char_of(consonant: &Consonant, order: usize) -> Result<char> {
    vowel_order(order)?;
    // Every row of the table lies inside the Ethiopic block.
    Ok(char::from_u32(consonant.base + order as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Latin transliteration, e.g. `"hä"`, `"hu"`, `"hi"`.
pub fn translit_of(consonant: &Consonant, order: usize) -> Result<String> {
    let vowel = vowel_order(order)?;
    Ok(format!("{}{}", consonant.latin, vowel.vowel))
}

/// Pronunciation asset key for a character.
///
/// Asset names are numbered 1–7 while vowel orders are 0–6, so the suffix is
/// `order + 1`: `audio_ref_of("h", 0)` is `"geez_h_1"`.
pub fn audio_ref_of(consonant_id: &str, order: usize) -> Result<String> {
    let consonant = consonant_by_id(consonant_id)?;
    vowel_order(order)?;
    Ok(format!("geez_{}_{}", consonant.id, order + 1))
}

/// One member of a consonant family as shown on the "meet the family" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyMember {
    pub glyph: char,
    pub translit: String,
    pub order: usize,
    pub order_name: &'static str,
    pub vowel: &'static str,
}

/// All seven forms of a consonant, in vowel order.
pub fn family_of(consonant: &'static Consonant) -> Vec<FamilyMember> {
    VOWEL_ORDERS
        .iter()
        .map(|v| {
            let syllable = Syllable::from_parts(consonant, v.index);
            FamilyMember {
                glyph: syllable.glyph(),
                translit: syllable.translit(),
                order: v.index,
                order_name: v.name,
                vowel: v.vowel,
            }
        })
        .collect()
}

/// A derived character: one consonant in one vowel order.
///
/// The order is validated on construction, so the accessors are infallible.
/// Two syllables are equal when they share consonant id and order.
#[derive(Debug, Clone, Copy)]
pub struct Syllable {
    consonant: &'static Consonant,
    order: usize,
}

impl Syllable {
    pub fn new(consonant: &'static Consonant, order: usize) -> Result<Self> {
        vowel_order(order)?;
        Ok(Self { consonant, order })
    }

    /// Caller guarantees `order < VOWEL_ORDER_COUNT`.
    pub(crate) fn from_parts(consonant: &'static Consonant, order: usize) -> Self {
        debug_assert!(order < VOWEL_ORDER_COUNT);
        Self { consonant, order }
    }

    pub fn consonant(&self) -> &'static Consonant {
        self.consonant
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn vowel_order(&self) -> &'static VowelOrder {
        &VOWEL_ORDERS[self.order]
    }

    pub fn glyph(&self) -> char {
        char::from_u32(self.consonant.base + self.order as u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    pub fn translit(&self) -> String {
        format!("{}{}", self.consonant.latin, self.vowel_order().vowel)
    }

    pub fn audio_ref(&self) -> String {
        format!("geez_{}_{}", self.consonant.id, self.order + 1)
    }

    /// Identity key used for duplicate detection.
    pub fn key(&self) -> (&'static str, usize) {
        (self.consonant.id, self.order)
    }
}

impl PartialEq for Syllable {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Syllable {}

impl std::hash::Hash for Syllable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_sizes() {
        assert_eq!(CONSONANTS.len(), 26);
        assert_eq!(VOWEL_ORDERS.len(), 7);
        assert_eq!(TOTAL_CHARACTERS, 182);
    }

    #[test]
    fn consonant_ids_unique() {
        let ids: HashSet<_> = CONSONANTS.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CONSONANTS.len());
    }

    #[test]
    fn vowel_indices_match_position() {
        for (i, v) in VOWEL_ORDERS.iter().enumerate() {
            assert_eq!(v.index, i);
        }
    }

    #[test]
    fn glyph_codepoint_arithmetic() {
        let h = consonant_by_id("h").unwrap();
        assert_eq!(char_of(h, 0).unwrap(), '\u{1200}');
        assert_eq!(char_of(h, 6).unwrap(), '\u{1206}');
        let p = consonant_by_id("p").unwrap();
        assert_eq!(char_of(p, 3).unwrap(), '\u{1353}');
    }

    #[test]
    fn out_of_range_order_rejected() {
        let h = &CONSONANTS[0];
        assert_eq!(char_of(h, 7), Err(AlphabetError::InvalidVowelOrder(7)));
        assert_eq!(translit_of(h, 99), Err(AlphabetError::InvalidVowelOrder(99)));
        assert!(Syllable::new(h, 7).is_err());
    }

    #[test]
    fn unknown_consonant_rejected() {
        assert_eq!(
            consonant_by_id("zz"),
            Err(AlphabetError::UnknownConsonant("zz".into()))
        );
        assert!(audio_ref_of("zz", 0).is_err());
        assert_eq!(consonant_index("zz"), None);
    }

    #[test]
    fn transliteration_examples() {
        let hh = consonant_by_id("hh").unwrap();
        assert_eq!(translit_of(hh, 0).unwrap(), "ḥä");
        assert_eq!(translit_of(hh, 5).unwrap(), "ḥə");
        let tss = consonant_by_id("tss").unwrap();
        assert_eq!(translit_of(tss, 6).unwrap(), "ṣ́o");
    }

    #[test]
    fn audio_ref_is_one_based() {
        assert_eq!(audio_ref_of("h", 0).unwrap(), "geez_h_1");
        assert_eq!(audio_ref_of("alef", 6).unwrap(), "geez_alef_7");
        assert_eq!(audio_ref_of("h", 7), Err(AlphabetError::InvalidVowelOrder(7)));
    }

    #[test]
    fn family_has_seven_members_in_order() {
        let m = consonant_by_id("m").unwrap();
        let family = family_of(m);
        assert_eq!(family.len(), 7);
        assert_eq!(family[0].glyph, 'መ');
        assert_eq!(family[1].translit, "mu");
        assert_eq!(family[6].order_name, "Sabiʽ");
        for (i, member) in family.iter().enumerate() {
            assert_eq!(member.order, i);
        }
    }

    #[test]
    fn syllable_accessors_agree_with_lookups() {
        let k = consonant_by_id("k").unwrap();
        let s = Syllable::new(k, 4).unwrap();
        assert_eq!(s.glyph(), char_of(k, 4).unwrap());
        assert_eq!(s.translit(), translit_of(k, 4).unwrap());
        assert_eq!(s.audio_ref(), audio_ref_of("k", 4).unwrap());
        assert_eq!(s.vowel_order().label, "5th");
    }

    #[test]
    fn syllable_equality_by_key() {
        let a = Syllable::new(&CONSONANTS[2], 3).unwrap();
        let b = Syllable::new(consonant_by_id("hh").unwrap(), 3).unwrap();
        let c = Syllable::new(&CONSONANTS[2], 4).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn canonical_index() {
        assert_eq!(consonant_index("h"), Some(0));
        assert_eq!(consonant_index("sz"), Some(4));
        assert_eq!(consonant_index("p"), Some(25));
    }
}
