// Normalization wrapper over a matcher.
//
// The matcher only ever sees normalized text. Hit ranges come back in
// normalized code-point positions and are translated through the index
// map, so everything returned to the caller is a slice of the original
// input. The translated endpoints also cover any original code points
// that normalization dropped inside the span (zero-width characters,
// collapsed repeats), which is what replace and remove want.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use wordsieve_match::Matcher;
use wordsieve_normalize::Normalizer;

pub(crate) struct NormalizedFilter {
    normalizer: Normalizer,
    inner: Arc<dyn Matcher>,
}

impl NormalizedFilter {
    pub(crate) fn new(inner: Arc<dyn Matcher>, normalizer: Normalizer) -> Self {
        Self { normalizer, inner }
    }

    pub(crate) fn is_sensitive(&self, text: &str) -> bool {
        let (norm, _) = self.normalizer.normalize_with_map(text);
        self.inner.contains_any(&norm)
    }

    pub(crate) fn find_one(&self, text: &str) -> Option<String> {
        let (norm, idx_map) = self.normalizer.normalize_with_map(text);
        let hit = self.inner.first_hit(&norm)?;
        let orig: Vec<char> = text.chars().collect();
        Some(orig[idx_map[hit.start]..=idx_map[hit.end]].iter().collect())
    }

    /// Distinct hits as original substrings, in first-occurrence order.
    /// Deduplication keys on the normalized pattern, so repeated
    /// occurrences with differently obfuscated originals fold into the
    /// first one seen.
    pub(crate) fn find_all(&self, text: &str) -> Vec<String> {
        let (norm, idx_map) = self.normalizer.normalize_with_map(text);
        let hits = self.inner.scan(&norm);
        if hits.is_empty() {
            return Vec::new();
        }

        let norm_chars: Vec<char> = norm.chars().collect();
        let orig_chars: Vec<char> = text.chars().collect();
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut out = Vec::new();

        for hit in hits {
            let pattern: String = norm_chars[hit.start..=hit.end].iter().collect();
            if seen.insert(pattern) {
                out.push(
                    orig_chars[idx_map[hit.start]..=idx_map[hit.end]]
                        .iter()
                        .collect(),
                );
            }
        }
        out
    }

    /// Occurrence counts per hit, keyed by the first original substring
    /// of each normalized pattern. Overlapping occurrences all count.
    pub(crate) fn find_all_count(&self, text: &str) -> HashMap<String, usize> {
        let (norm, idx_map) = self.normalizer.normalize_with_map(text);
        let hits = self.inner.scan(&norm);
        if hits.is_empty() {
            return HashMap::new();
        }

        let norm_chars: Vec<char> = norm.chars().collect();
        let orig_chars: Vec<char> = text.chars().collect();
        let mut by_pattern: AHashMap<String, (String, usize)> = AHashMap::new();

        for hit in hits {
            let pattern: String = norm_chars[hit.start..=hit.end].iter().collect();
            by_pattern
                .entry(pattern)
                .and_modify(|(_, n)| *n += 1)
                .or_insert_with(|| {
                    let original: String = orig_chars[idx_map[hit.start]..=idx_map[hit.end]]
                        .iter()
                        .collect();
                    (original, 1)
                });
        }

        by_pattern.into_values().collect()
    }

    /// Rewrite every original code point covered by a hit to `repl`.
    pub(crate) fn replace(&self, text: &str, repl: char) -> String {
        let (norm, idx_map) = self.normalizer.normalize_with_map(text);
        let mut orig: Vec<char> = text.chars().collect();

        for hit in self.inner.scan(&norm) {
            for slot in &mut orig[idx_map[hit.start]..=idx_map[hit.end]] {
                *slot = repl;
            }
        }
        orig.into_iter().collect()
    }

    /// Drop every original code point covered by a hit.
    pub(crate) fn remove(&self, text: &str) -> String {
        let (norm, idx_map) = self.normalizer.normalize_with_map(text);
        let orig: Vec<char> = text.chars().collect();
        let mut keep = vec![true; orig.len()];

        for hit in self.inner.scan(&norm) {
            for flag in &mut keep[idx_map[hit.start]..=idx_map[hit.end]] {
                *flag = false;
            }
        }

        orig.into_iter()
            .zip(keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect()
    }
}
