//! Wordsieve Event Model
//!
//! Shared types that cross crate boundaries: the dictionary update event
//! carried from the store to the matchers, and the match result shapes
//! returned by the query surface.

use serde::Serialize;

/// A dictionary update announced by the store after the change is visible.
///
/// The word carried here is always in normalized form; consumers can apply
/// it to an automaton without any further rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictEvent {
    /// A word was inserted into the dictionary.
    Add(String),

    /// A word was removed from the dictionary.
    Del(String),
}

impl DictEvent {
    /// The word this event refers to.
    pub fn word(&self) -> &str {
        match self {
            DictEvent::Add(w) | DictEvent::Del(w) => w,
        }
    }
}

/// An inclusive `[start, end]` range of code-point indices into some
/// reference string.
///
/// Matchers report ranges over the text they scanned; the engine translates
/// them back into ranges over the original, pre-normalization input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    /// First covered code-point index.
    pub start: usize,

    /// Last covered code-point index (inclusive).
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of code points covered. Ranges are inclusive, so this is
    /// always at least 1.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Inclusive ranges cover at least one code point.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A matched word together with the logical dictionaries it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The matched substring of the original input.
    pub word: String,

    /// Source tags recorded for the underlying dictionary entry,
    /// in insertion order.
    pub sources: Vec<String>,
}

/// A matched word with its occurrence count and source tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCount {
    /// The matched substring of the original input (first occurrence).
    pub word: String,

    /// How many times the underlying pattern occurred in the scanned text.
    pub count: usize,

    /// Source tags recorded for the underlying dictionary entry.
    pub sources: Vec<String>,
}
