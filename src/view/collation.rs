//! Locale-aware string comparison and case folding.
//!
//! Comparison is three-level: base letters first, then accents, then case
//! (lowercase before uppercase), with a final code point tie-break so the
//! order is total. Turkish and Azerbaijani tailor the alphabet: `ç ğ ı ö ş ü`
//! are letters of their own, `ı` sorts before `i`, and `I`/`İ` lowercase to
//! `ı`/`i`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Collation tailoring selected from a locale tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Root collation; used for English, French, German and friends.
    #[default]
    Default,
    Turkish,
}

impl Locale {
    /// Map a BCP 47 tag such as `tr-TR` or `en` to a tailoring.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "tr" | "az" => Locale::Turkish,
            _ => Locale::Default,
        }
    }
}

/// Secondary weights. Combining marks weigh 1..=0x70 by code point; letters
/// without a canonical decomposition sort after every mark.
const NONE: u32 = 0;
const OTHER_MARK: u32 = 0x7f;
const DOTLESS: u32 = 0x80;
const STROKE: u32 = 0x81;
const LIGATURE: u32 = 0x82;

const CEDILLA: char = '\u{327}';
const BREVE: char = '\u{306}';
const DIAERESIS: char = '\u{308}';

/// One collation element per base letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Element {
    primary: u32,
    secondary: u32,
    tertiary: u8,
}

/// Locale-aware comparator for display strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collator {
    locale: Locale,
}

impl Collator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Lowercase with the locale's special cases. The result is NFC, so
    /// precomposed and decomposed spellings fold to the same string.
    pub fn fold_case(&self, text: &str) -> String {
        let mut folded = String::with_capacity(text.len());
        for c in text.nfc() {
            match (self.locale, c) {
                (Locale::Turkish, 'I') => folded.push('ı'),
                (Locale::Turkish, 'İ') => folded.push('i'),
                (_, c) => folded.extend(c.to_lowercase()),
            }
        }
        folded.nfc().collect()
    }

    /// Case-insensitive substring match. `needle` must already be folded.
    pub fn contains_folded(&self, haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let haystack = self.fold_case(haystack);
        match is_nfc_quick(needle.chars()) {
            IsNormalized::Yes => haystack.contains(needle),
            _ => haystack.contains(needle.nfc().collect::<String>().as_str()),
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let left = self.elements(a);
        let right = self.elements(b);

        let primary = left
            .iter()
            .map(|e| e.primary)
            .cmp(right.iter().map(|e| e.primary));
        if primary != Ordering::Equal {
            return primary;
        }
        let secondary = left
            .iter()
            .map(|e| e.secondary)
            .cmp(right.iter().map(|e| e.secondary));
        if secondary != Ordering::Equal {
            return secondary;
        }
        let tertiary = left
            .iter()
            .map(|e| e.tertiary)
            .cmp(right.iter().map(|e| e.tertiary));
        if tertiary != Ordering::Equal {
            return tertiary;
        }
        a.cmp(b)
    }

    fn elements(&self, text: &str) -> Vec<Element> {
        let mut out: Vec<Element> = Vec::with_capacity(text.len());
        let mut base = None;
        for c in text.nfc() {
            let tertiary = u8::from(c.is_uppercase());
            for folded in self.fold_case(c.encode_utf8(&mut [0; 4])).nfd() {
                if is_combining_mark(folded) {
                    self.attach_mark(&mut out, base, folded);
                    continue;
                }
                base = Some(folded);
                match expand(folded) {
                    Some((first, second)) => {
                        out.push(weighted(first, LIGATURE, tertiary));
                        out.push(weighted(second, LIGATURE, tertiary));
                    }
                    None => out.push(self.letter(folded, tertiary)),
                }
            }
        }
        out
    }

    fn letter(&self, c: char, tertiary: u8) -> Element {
        match (self.locale, c) {
            (Locale::Turkish, 'ı') => Element {
                primary: slot('i') + 1,
                secondary: NONE,
                tertiary,
            },
            _ => match undecomposable(c) {
                Some((base, secondary)) => weighted(base, secondary, tertiary),
                None => weighted(c, NONE, tertiary),
            },
        }
    }

    /// Fold a combining mark into the element of the letter it follows.
    ///
    /// Turkish `ç ğ ö ş ü` are letters of their own and take the slot after
    /// their base letter instead of an accent weight.
    fn attach_mark(&self, out: &mut [Element], base: Option<char>, mark: char) {
        let Some(last) = out.last_mut() else {
            return;
        };
        if let Some(base) = base {
            let tailored = self.locale == Locale::Turkish
                && last.secondary == NONE
                && last.primary == slot(base) + 2
                && matches!(
                    (base, mark),
                    ('c' | 's', CEDILLA) | ('g', BREVE) | ('o' | 'u', DIAERESIS)
                );
            if tailored {
                last.primary = slot(base) + 3;
                return;
            }
        }
        last.secondary = last
            .secondary
            .saturating_mul(0x100)
            .saturating_add(mark_weight(mark));
    }
}

/// Each base letter owns four primary slots: 1 for letters sorting just
/// before it, 2 for itself and 3 for tailored letters sorting after it.
fn slot(base: char) -> u32 {
    base as u32 * 4
}

fn weighted(base: char, secondary: u32, tertiary: u8) -> Element {
    Element {
        primary: slot(base) + 2,
        secondary,
        tertiary,
    }
}

fn mark_weight(mark: char) -> u32 {
    match mark as u32 {
        cp @ 0x300..=0x36f => cp - 0x2ff,
        _ => OTHER_MARK,
    }
}

/// Multi-letter expansions.
fn expand(c: char) -> Option<(char, char)> {
    match c {
        'ß' => Some(('s', 's')),
        'æ' => Some(('a', 'e')),
        'œ' => Some(('o', 'e')),
        _ => None,
    }
}

/// Letters whose accent is part of the glyph rather than a combining mark.
fn undecomposable(c: char) -> Option<(char, u32)> {
    match c {
        'ı' => Some(('i', DOTLESS)),
        'đ' => Some(('d', STROKE)),
        'ħ' => Some(('h', STROKE)),
        'ł' => Some(('l', STROKE)),
        'ø' => Some(('o', STROKE)),
        _ => None,
    }
}
