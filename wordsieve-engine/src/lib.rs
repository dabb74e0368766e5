//! Wordsieve Engine
//!
//! The [`Manager`] facade wires the dictionary store, the normalizer and
//! a matching backend into one query surface. Every word written and
//! every text queried passes through the same normalization, and hit
//! ranges are translated back so callers always receive substrings of
//! their own input.
//!
//! Construction spawns the matcher's update listener, so a `Manager`
//! must be created inside a Tokio runtime. Many managers can coexist;
//! each owns a disjoint dictionary.

pub mod dicts;
mod wrapper;

pub use wordsieve_event::{DictEvent, MatchCount, MatchResult, Range};
pub use wordsieve_match::{AcConfig, AcMatcher, Matcher, TrieMatcher};
pub use wordsieve_normalize::{default_homoglyphs, Normalizer, NormalizerOptions};
pub use wordsieve_store::{MemoryStore, Stats, StoreError};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use wrapper::NormalizedFilter;

/// Errors surfaced by the manager.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown store or filter kind, or an otherwise unusable setup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A dictionary file could not be read or written.
    #[error("io error accessing {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// `shutdown` gave up before the update listener drained.
    #[error("shutdown deadline exceeded")]
    DeadlineExceeded,
}

/// Result type for manager operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Matching backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Prefix trie swept per start index; updates apply immediately.
    Trie,

    /// Aho-Corasick automaton; updates coalesce into windowed rebuilds.
    #[default]
    Ac,
}

impl FromStr for FilterKind {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trie" => Ok(FilterKind::Trie),
            "ac" | "aho-corasick" => Ok(FilterKind::Ac),
            other => Err(EngineError::Config(format!("unknown filter kind: {other}"))),
        }
    }
}

/// Dictionary storage selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Memory,
}

impl FromStr for StoreKind {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            other => Err(EngineError::Config(format!("unknown store kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub kind: FilterKind,
}

#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub kind: StoreKind,
}

/// The sensitive-word filter facade.
pub struct Manager {
    store: Arc<MemoryStore>,
    filter: NormalizedFilter,
    normalizer: Normalizer,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Manager {
    /// Build a ready manager with the default normalizer (case and width
    /// folding). Must be called inside a Tokio runtime.
    pub fn new(store_opts: StoreOptions, filter_opts: FilterOptions) -> EngineResult<Self> {
        Self::with_normalizer(store_opts, filter_opts, Normalizer::default())
    }

    /// Build a ready manager with an explicit normalization policy.
    pub fn with_normalizer(
        store_opts: StoreOptions,
        filter_opts: FilterOptions,
        normalizer: Normalizer,
    ) -> EngineResult<Self> {
        let store = match store_opts.kind {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        };

        let matcher: Arc<dyn Matcher> = match filter_opts.kind {
            FilterKind::Trie => Arc::new(TrieMatcher::new()),
            FilterKind::Ac => Arc::new(AcMatcher::new(AcConfig::default())),
        };

        let events = store
            .take_events()
            .ok_or_else(|| EngineError::Config("store event channel already consumed".into()))?;
        let listener = matcher.clone().listen(events);

        info!(filter = ?filter_opts.kind, "filter manager ready");

        Ok(Self {
            store,
            filter: NormalizedFilter::new(matcher, normalizer.clone()),
            normalizer,
            listener: Mutex::new(Some(listener)),
        })
    }

    fn normalized<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        words
            .iter()
            .map(|w| self.normalizer.normalize_word(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect()
    }

    fn split_lines(content: &str) -> Vec<&str> {
        content
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    // ---- dictionary maintenance ----------------------------------------

    pub async fn add_word(&self, word: &str) -> EngineResult<()> {
        self.add_words(&[word]).await
    }

    pub async fn add_words<S: AsRef<str>>(&self, words: &[S]) -> EngineResult<()> {
        let words = self.normalized(words);
        if words.is_empty() {
            return Ok(());
        }
        Ok(self.store.add_words(&words).await?)
    }

    pub async fn add_words_with_source<S: AsRef<str>>(
        &self,
        words: &[S],
        source: &str,
    ) -> EngineResult<()> {
        let words = self.normalized(words);
        if words.is_empty() {
            return Ok(());
        }
        Ok(self.store.add_words_with_source(&words, source).await?)
    }

    pub async fn del_word(&self, word: &str) -> EngineResult<()> {
        self.del_words(&[word]).await
    }

    pub async fn del_words<S: AsRef<str>>(&self, words: &[S]) -> EngineResult<()> {
        let words = self.normalized(words);
        if words.is_empty() {
            return Ok(());
        }
        Ok(self.store.del_words(&words).await?)
    }

    /// Weak replace: old words leave, new words enter, with no atomicity
    /// across the two with respect to concurrent queries.
    pub async fn replace_words<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> EngineResult<()> {
        let old = self.normalized(old);
        let new = self.normalized(new);
        Ok(self.store.replace_words(&old, &new).await?)
    }

    // ---- loading -------------------------------------------------------

    /// Load dictionary files, one word per line. Words from paths loaded
    /// before an error are kept.
    pub async fn load_path<P: AsRef<Path>>(&self, paths: &[P]) -> EngineResult<()> {
        for p in paths {
            let path = p.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| EngineError::Io(path.to_path_buf(), e))?;
            let content = String::from_utf8_lossy(&bytes);
            let source = format!("file://{}", path.display());
            self.load_with_source(&content, &source).await?;
            info!(path = %path.display(), "loaded dictionary file");
        }
        Ok(())
    }

    /// Load embedded dictionary contents without source attribution.
    pub async fn load_embedded(&self, contents: &[&str]) -> EngineResult<()> {
        for content in contents {
            let words = self.normalized(&Self::split_lines(content));
            if !words.is_empty() {
                self.store.add_words(&words).await?;
            }
        }
        Ok(())
    }

    /// Load line-oriented dictionary content under a source tag.
    pub async fn load_with_source(&self, content: &str, source: &str) -> EngineResult<()> {
        let words = self.normalized(&Self::split_lines(content));
        if words.is_empty() {
            return Ok(());
        }
        Ok(self.store.add_words_with_source(&words, source).await?)
    }

    /// Pull words from a user callback (database, cache, config service)
    /// under `callback://{source}`. A loader error adds nothing.
    pub async fn load_callback<F>(&self, loader: F, source: &str) -> EngineResult<()>
    where
        F: FnOnce() -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>,
    {
        let words = loader().map_err(StoreError::Loader)?;
        let words = self.normalized(&words);
        if words.is_empty() {
            return Ok(());
        }
        let tag = format!("callback://{source}");
        Ok(self.store.add_words_with_source(&words, &tag).await?)
    }

    /// Reload from a file: either append to the current dictionary or
    /// clear it first.
    pub async fn refresh_from_path<P: AsRef<Path>>(
        &self,
        path: P,
        replace: bool,
    ) -> EngineResult<()> {
        if replace {
            self.clear().await?;
        }
        self.load_path(&[path]).await
    }

    /// Pull every word of another manager, with its source tags.
    pub async fn merge_from(&self, other: &Manager) -> EngineResult<()> {
        Ok(self.store.merge(&other.store).await?)
    }

    // ---- queries -------------------------------------------------------

    pub fn is_sensitive(&self, text: &str) -> bool {
        self.filter.is_sensitive(text)
    }

    /// The first hit as a substring of the original input.
    pub fn find_one(&self, text: &str) -> Option<String> {
        self.filter.find_one(text)
    }

    /// Distinct hits as original substrings, in first-occurrence order.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.filter.find_all(text)
    }

    /// Occurrence counts keyed by the first original substring of each
    /// matched pattern. Distinct originals that normalize to the same
    /// pattern collapse under one key.
    pub fn find_all_count(&self, text: &str) -> HashMap<String, usize> {
        self.filter.find_all_count(text)
    }

    /// Copy of `text` with every hit's code points rewritten to `repl`.
    pub fn replace(&self, text: &str, repl: char) -> String {
        self.filter.replace(text, repl)
    }

    /// Copy of `text` with every hit's code points removed.
    pub fn remove(&self, text: &str) -> String {
        self.filter.remove(text)
    }

    /// Hits with the sources that contributed each underlying word.
    pub fn find_all_with_source(&self, text: &str) -> Vec<MatchResult> {
        self.find_all(text)
            .into_iter()
            .map(|word| {
                let sources = self.word_sources(&word);
                MatchResult { word, sources }
            })
            .collect()
    }

    /// Hits with occurrence counts and sources, keyed like
    /// [`Manager::find_all_count`].
    pub fn find_all_count_with_source(&self, text: &str) -> HashMap<String, MatchCount> {
        self.find_all_count(text)
            .into_iter()
            .map(|(word, count)| {
                let sources = self.word_sources(&word);
                (word.clone(), MatchCount { word, count, sources })
            })
            .collect()
    }

    // ---- introspection and persistence ---------------------------------

    /// Sources of a word (normalized before lookup).
    pub fn word_sources(&self, word: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize_word(word);
        self.store.word_sources(&normalized)
    }

    pub fn all_word_sources(&self) -> HashMap<String, Vec<String>> {
        self.store.all_word_sources()
    }

    pub fn stats(&self) -> Stats {
        self.store.stats()
    }

    pub fn export_to_string(&self) -> String {
        self.store.export_string()
    }

    pub async fn export_to_file<P: AsRef<Path>>(&self, path: P) -> EngineResult<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.store.export_string())
            .await
            .map_err(|e| EngineError::Io(path.to_path_buf(), e))
    }

    // ---- lifecycle -----------------------------------------------------

    /// Empty the dictionary; the manager stays usable.
    pub async fn clear(&self) -> EngineResult<()> {
        Ok(self.store.clear().await?)
    }

    /// Reject further mutations and signal the update listener to drain.
    /// Queries keep answering against the last published dictionary.
    pub fn close(&self) {
        self.store.close();
    }

    /// Close, then wait up to `deadline` for the update listener to apply
    /// its final batch and exit.
    pub async fn shutdown(&self, deadline: Duration) -> EngineResult<()> {
        self.store.close();
        let handle = self.listener.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match tokio::time::timeout(deadline, handle).await {
            Ok(_) => {
                info!("filter manager shut down");
                Ok(())
            }
            Err(_) => {
                warn!("update listener did not drain before the deadline");
                Err(EngineError::DeadlineExceeded)
            }
        }
    }
}
