//! Wordsieve Matchers
//!
//! Two multi-pattern matching backends over normalized text:
//!
//! - [`TrieMatcher`]: a prefix trie swept from every start index. Updates
//!   apply immediately under a lock. Suited to small dictionaries and
//!   low-volume edits.
//! - [`AcMatcher`]: an Aho-Corasick automaton with precomputed failure
//!   links and merged outputs. Readers scan an immutable snapshot;
//!   updates are coalesced into windowed rebuilds and published by
//!   swapping the snapshot.
//!
//! Both operate on code points and report every occurrence as an
//! inclusive [`Range`] over the scanned text. Deduplication and mapping
//! back to the caller's original input happen a layer up.

mod ac;
mod trie;

pub use ac::{AcConfig, AcMatcher};
pub use trie::TrieMatcher;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use wordsieve_event::{DictEvent, Range};

/// The capability surface the engine composes with a normalizer wrapper.
///
/// Words handed to `add`/`del` and texts handed to the scan methods are
/// expected to already be normalized; matching is strictly literal.
pub trait Matcher: Send + Sync {
    /// Insert one word, visible to scans when the call returns.
    fn add(&self, word: &str);

    /// Remove one word, absent from scans when the call returns.
    fn del(&self, word: &str);

    /// Every occurrence of every dictionary word in `text`, in scan
    /// order, overlaps included. Occurrences are not deduplicated.
    fn scan(&self, text: &str) -> Vec<Range>;

    /// The first occurrence the scan reaches, if any.
    fn first_hit(&self, text: &str) -> Option<Range>;

    /// Whether any dictionary word occurs in `text`.
    fn contains_any(&self, text: &str) -> bool {
        self.first_hit(text).is_some()
    }

    /// Consume dictionary update events until the channel closes.
    ///
    /// The returned handle completes once the final pending update has
    /// been applied; the engine awaits it during shutdown.
    fn listen(self: Arc<Self>, events: mpsc::Receiver<DictEvent>) -> JoinHandle<()>;
}
