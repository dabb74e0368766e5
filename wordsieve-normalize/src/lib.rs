//! Wordsieve Text Normalization
//!
//! Deterministic code-point-level rewriting applied identically to
//! dictionary entries and query text, so that lexically distinct
//! obfuscations (case, fullwidth forms, styled numerals, Traditional
//! variants, homoglyphs, zero-width insertions) compare equal.
//!
//! Alongside the rewritten string, [`Normalizer::normalize_with_map`]
//! produces an index map from normalized code-point positions back to
//! positions in the original text, which is what lets hits be reported
//! as substrings of the caller's input rather than the folded form.

mod charmap;

pub use charmap::default_homoglyphs;

use ahash::AHashMap;

/// Folding toggles, listed in the order they are applied to each code point.
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    /// Drop invisible formatting code points entirely.
    pub remove_zero_width: bool,

    /// Replace visually confusable characters before any other folding.
    pub homoglyph_map: Option<AHashMap<char, char>>,

    /// Fold styled, circled, ideographic and fullwidth numerals to ASCII.
    pub normalize_digits: bool,

    /// Fold Traditional Chinese to Simplified where the mapping is 1:1.
    pub trad_to_simp: bool,

    /// Fold fullwidth and enclosed Latin letters to basic Latin.
    pub english_variants: bool,

    /// Fold the fullwidth ASCII block and ideographic space to halfwidth.
    pub to_halfwidth: bool,

    /// Lowercase.
    pub ignore_case: bool,

    /// Collapse runs of identical code points to length 1. Applied last,
    /// over the already-folded stream.
    pub ignore_repeat: bool,
}

impl Default for NormalizerOptions {
    /// Case and width folding only. This is what the engine uses unless
    /// told otherwise.
    fn default() -> Self {
        Self {
            remove_zero_width: false,
            homoglyph_map: None,
            normalize_digits: false,
            trad_to_simp: false,
            english_variants: false,
            to_halfwidth: true,
            ignore_case: true,
            ignore_repeat: false,
        }
    }
}

impl NormalizerOptions {
    /// Every fold enabled, with the built-in homoglyph table. The most
    /// aggressive anti-evasion configuration.
    pub fn strict() -> Self {
        Self {
            remove_zero_width: true,
            homoglyph_map: Some(charmap::default_homoglyphs()),
            normalize_digits: true,
            trad_to_simp: true,
            english_variants: true,
            to_halfwidth: true,
            ignore_case: true,
            ignore_repeat: true,
        }
    }
}

/// Applies a fixed [`NormalizerOptions`] to words and texts.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    opts: NormalizerOptions,
}

impl Normalizer {
    pub fn new(opts: NormalizerOptions) -> Self {
        Self { opts }
    }

    /// The strict preset.
    pub fn strict() -> Self {
        Self::new(NormalizerOptions::strict())
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.opts
    }

    /// Fold a single code point. `None` means the code point is dropped.
    fn fold_char(&self, c: char) -> Option<char> {
        let mut c = c;
        if self.opts.remove_zero_width && charmap::is_zero_width(c) {
            return None;
        }
        if let Some(map) = &self.opts.homoglyph_map {
            if let Some(&mapped) = map.get(&c) {
                c = mapped;
            }
        }
        if self.opts.normalize_digits {
            if let Some(d) = charmap::fold_digit(c) {
                c = d;
            }
        }
        if self.opts.trad_to_simp {
            if let Some(s) = charmap::trad_to_simp(c) {
                c = s;
            }
        }
        if self.opts.english_variants {
            if let Some(l) = charmap::fold_latin_variant(c) {
                c = l;
            }
        }
        if self.opts.to_halfwidth {
            c = charmap::to_halfwidth(c);
        }
        if self.opts.ignore_case {
            c = fold_lower(c);
        }
        Some(c)
    }

    /// Normalize `s`, returning the rewritten string together with the map
    /// from each normalized code-point index to the original code-point
    /// index it came from.
    ///
    /// The map is always the same length as the normalized string counted
    /// in code points, and is strictly increasing. Dropped code points
    /// (zero-width characters, collapsed repeats) contribute no entry.
    pub fn normalize_with_map(&self, s: &str) -> (String, Vec<usize>) {
        let mut norm = String::with_capacity(s.len());
        let mut idx_map = Vec::with_capacity(s.chars().count());
        let mut last: Option<char> = None;

        for (i, c) in s.chars().enumerate() {
            let Some(folded) = self.fold_char(c) else {
                continue;
            };
            if self.opts.ignore_repeat {
                if last == Some(folded) {
                    continue;
                }
                last = Some(folded);
            }
            norm.push(folded);
            idx_map.push(i);
        }

        (norm, idx_map)
    }

    /// Normalize a dictionary entry with the same policy as query text.
    pub fn normalize_word(&self, word: &str) -> String {
        self.normalize_with_map(word).0
    }
}

/// Lowercase where the fold is a single code point; multi-code-point
/// expansions keep the original so the index map stays 1:1.
fn fold_lower(c: char) -> char {
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}
