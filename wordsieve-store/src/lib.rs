//! Wordsieve Dictionary Store
//!
//! The canonical set of dictionary words, each carrying the source tags
//! that contributed it, plus a statistics record. Every mutation is
//! announced on a bounded event channel *after* the in-store change is
//! visible, so the consuming matcher can always rely on the store already
//! reflecting the event it is processing.

mod memory;

pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Capacity of the store-to-matcher event channel. Senders block once the
/// buffer is full, which is the backpressure path for slow consumers.
pub const EVENT_CHANNEL_CAPACITY: usize = 8192;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has been closed; mutations are permanently rejected.
    #[error("store is closed")]
    Closed,

    /// A dictionary file could not be accessed.
    #[error("io error accessing {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// A reader or writer stream failed mid-transfer.
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// A user-supplied dictionary loader reported an error; none of its
    /// words were added.
    #[error("dictionary loader failed: {0}")]
    Loader(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Snapshot of the store's bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    /// Current dictionary size.
    pub total_words: usize,

    /// When the dictionary last changed.
    pub last_update: std::time::SystemTime,

    /// Words actually added plus words actually removed, accumulated.
    pub update_count: u64,

    /// Distinct load sources seen, in first-seen order.
    pub sources: Vec<String>,
}
