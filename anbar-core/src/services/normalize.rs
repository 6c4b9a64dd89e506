//! Text normalization for imported cells
//!
//! Two concerns live here:
//!
//! - `normalize`: strips invisible/bidi control code points, turns
//!   typographic spaces into plain ones, collapses whitespace, and
//!   straightens curly quotes and en/em dashes. Idempotent.
//! - `TextNormalizer::repair`: undoes Persian text that was UTF-8 encoded and
//!   then decoded as Latin-1 / Windows-1252 ("mojibake"). Strategies run in a
//!   configured order; the first one that changes the text wins. Repair is
//!   best-effort and never fails: unrepairable input comes back unchanged.

use std::sync::LazyLock;

use encoding_rs::WINDOWS_1252;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{Cell, Grid};

/// Zero-width, bidi-embedding and word-joiner code points dropped from input
static INVISIBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{200B}-\x{200D}\x{FEFF}\x{202A}-\x{202E}\x{2060}-\x{2064}\x{2066}-\x{2069}]")
        .expect("invisible-character pattern is valid")
});

/// Typographic spaces, line/paragraph separators and direction marks read as a space
static SPACE_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{2000}-\x{200A}\x{200E}\x{200F}\x{2028}\x{2029}]")
        .expect("space-like pattern is valid")
});

/// Whitespace runs, excluding U+0085: that code point is the 0x85 byte of
/// Latin-1 mojibake (`م` is D9 85) and must survive until repair.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s&&[^\x{85}]]+").expect("whitespace pattern is valid"));

static DOUBLE_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{201C}\x{201D}]").expect("quote pattern is valid"));

static SINGLE_QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{2018}\x{2019}]").expect("apostrophe pattern is valid"));

static DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{2013}\x{2014}]").expect("dash pattern is valid"));

/// Lead characters Persian/Arabic UTF-8 sequences turn into when mis-decoded
/// (bytes 0xD8-0xDB), plus `Ã` (0xC3) from double-encoded Latin text.
const MOJIBAKE_MARKERS: [char; 5] = ['\u{D8}', '\u{D9}', '\u{DA}', '\u{DB}', '\u{C3}'];

/// Drop invisible characters and turn space-like ones into plain spaces.
/// Leaves whitespace runs and punctuation alone.
fn strip_invisible(raw: &str) -> String {
    let visible = INVISIBLE_RE.replace_all(raw, "");
    SPACE_LIKE_RE.replace_all(&visible, " ").into_owned()
}

/// Remove invisible control characters, collapse whitespace runs, straighten
/// quotes and dashes, trim.
pub fn normalize(raw: &str) -> String {
    let visible = strip_invisible(raw);
    let collapsed = WHITESPACE_RE.replace_all(&visible, " ");
    let quoted = DOUBLE_QUOTE_RE.replace_all(&collapsed, "\"");
    let apostrophes = SINGLE_QUOTE_RE.replace_all(&quoted, "'");
    DASH_RE
        .replace_all(&apostrophes, "-")
        .trim_matches(|c: char| c.is_whitespace() && c != '\u{85}')
        .to_string()
}

/// True when the text carries a mojibake marker character
pub fn looks_mis_decoded(text: &str) -> bool {
    text.chars().any(|c| MOJIBAKE_MARKERS.contains(&c))
}

/// A single mojibake repair technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairStrategy {
    /// Map every character back to the byte it was decoded from and
    /// re-decode the bytes as UTF-8
    Bytes,
    /// Replace known corrupted sequences from a fixed lookup table
    Table,
}

impl RepairStrategy {
    /// Returns the repaired text, or `None` when this strategy cannot help
    pub fn apply(&self, text: &str) -> Option<String> {
        match self {
            RepairStrategy::Bytes => reinterpret_bytes(text),
            RepairStrategy::Table => replace_known_sequences(text),
        }
    }
}

/// Normalizer with an ordered list of repair strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNormalizer {
    strategies: Vec<RepairStrategy>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            strategies: vec![RepairStrategy::Bytes, RepairStrategy::Table],
        }
    }
}

impl TextNormalizer {
    pub fn new(strategies: Vec<RepairStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[RepairStrategy] {
        &self.strategies
    }

    /// Best-effort mojibake repair
    pub fn repair(&self, text: &str) -> String {
        if !looks_mis_decoded(text) {
            return text.to_string();
        }

        for strategy in &self.strategies {
            if let Some(fixed) = strategy.apply(text) {
                if fixed != text {
                    tracing::debug!(?strategy, "repaired mis-decoded text");
                    return fixed;
                }
            }
        }

        text.to_string()
    }

    /// Drop invisible characters, `repair`, then `normalize`.
    ///
    /// Repair sees the text before whitespace is collapsed, so mojibake
    /// bytes that look like whitespace are still intact.
    pub fn clean(&self, raw: &str) -> String {
        normalize(&self.repair(&strip_invisible(raw)))
    }

    /// Repair every text cell of a grid in place
    pub fn repair_grid(&self, grid: &mut Grid) {
        for cell in grid.iter_mut().flat_map(|row| row.iter_mut()) {
            if let Cell::Text(text) = cell {
                if looks_mis_decoded(text) {
                    *text = self.repair(text);
                }
            }
        }
    }
}

/// Byte-level strategy. Fails when a character has no single-byte origin in
/// Latin-1 or Windows-1252, or when the recovered bytes are not valid UTF-8.
fn reinterpret_bytes(text: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];

    for c in text.chars() {
        let code = u32::from(c);
        if code <= 0xFF {
            bytes.push(code as u8);
            continue;
        }
        let (encoded, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if had_errors || encoded.len() != 1 {
            return None;
        }
        bytes.push(encoded[0]);
    }

    String::from_utf8(bytes).ok()
}

/// Table strategy. Whole words are tried before single letters.
fn replace_known_sequences(text: &str) -> Option<String> {
    let mut fixed = text.to_string();
    for (corrupted, correct) in MOJIBAKE_TABLE {
        if fixed.contains(corrupted) {
            fixed = fixed.replace(corrupted, correct);
        }
    }
    (fixed != text).then_some(fixed)
}

/// Known Windows-1252 renderings of UTF-8 Persian text
const MOJIBAKE_TABLE: &[(&str, &str)] = &[
    // words seen in inventory headers and drug names
    ("\u{D8}\u{A7}\u{D8}\u{B3}\u{D8}\u{AA}\u{D8}\u{A7}\u{D9}\u{2026}\u{DB}\u{152}\u{D9}\u{2020}\u{D9}\u{2C6}\u{D9}\u{81}\u{D9}\u{2020}", "استامینوفن"),
    ("\u{D8}\u{A2}\u{D8}\u{B3}\u{D9}\u{BE}\u{D8}\u{B1}\u{DB}\u{152}\u{D9}\u{2020}", "آسپرین"),
    ("\u{D9}\u{2026}\u{D9}\u{2C6}\u{D8}\u{AC}\u{D9}\u{2C6}\u{D8}\u{AF}\u{DB}\u{152}", "موجودی"),
    ("\u{D8}\u{B3}\u{DB}\u{152}\u{D8}\u{B3}\u{D8}\u{AA}\u{D9}\u{2026}", "سیستم"),
    ("\u{DA}\u{A9}\u{D8}\u{A7}\u{D9}\u{201E}\u{D8}\u{A7}", "کالا"),
    ("\u{D8}\u{AF}\u{D8}\u{A7}\u{D8}\u{B1}\u{D9}\u{2C6}", "دارو"),
    ("\u{D9}\u{2020}\u{D8}\u{A7}\u{D9}\u{2026}", "نام"),
    // letters
    ("\u{D8}\u{A2}", "آ"),
    ("\u{D8}\u{A7}", "ا"),
    ("\u{D8}\u{A8}", "ب"),
    ("\u{D9}\u{BE}", "پ"),
    ("\u{D8}\u{AA}", "ت"),
    ("\u{D8}\u{AB}", "ث"),
    ("\u{D8}\u{AC}", "ج"),
    ("\u{DA}\u{2020}", "چ"),
    ("\u{D8}\u{AD}", "ح"),
    ("\u{D8}\u{AE}", "خ"),
    ("\u{D8}\u{AF}", "د"),
    ("\u{D8}\u{B0}", "ذ"),
    ("\u{D8}\u{B1}", "ر"),
    ("\u{D8}\u{B2}", "ز"),
    ("\u{DA}\u{2DC}", "ژ"),
    ("\u{D8}\u{B3}", "س"),
    ("\u{D8}\u{B4}", "ش"),
    ("\u{D8}\u{B5}", "ص"),
    ("\u{D8}\u{B6}", "ض"),
    ("\u{D8}\u{B7}", "ط"),
    ("\u{D8}\u{B8}", "ظ"),
    ("\u{D8}\u{B9}", "ع"),
    ("\u{D8}\u{BA}", "غ"),
    ("\u{D9}\u{81}", "ف"),
    ("\u{D9}\u{201A}", "ق"),
    ("\u{DA}\u{A9}", "ک"),
    ("\u{DA}\u{AF}", "گ"),
    ("\u{D9}\u{201E}", "ل"),
    ("\u{D9}\u{2026}", "م"),
    ("\u{D9}\u{2020}", "ن"),
    ("\u{D9}\u{2C6}", "و"),
    ("\u{D9}\u{2021}", "ه"),
    ("\u{DB}\u{152}", "ی"),
    ("\u{D9}\u{160}", "ي"),
    ("\u{D9}\u{192}", "ك"),
    ("\u{D8}\u{A6}", "ئ"),
    ("\u{D8}\u{A1}", "ء"),
    ("\u{D8}\u{A3}", "أ"),
    ("\u{D8}\u{A5}", "إ"),
    ("\u{D8}\u{A4}", "ؤ"),
    ("\u{D8}\u{A9}", "ة"),
];
