// In-memory dictionary store.
//
// The word map and the statistics record live under separate locks so
// stats readers do not contend with dictionary readers. The event channel
// sender is dropped on close, which is what tells the matcher listener to
// drain and exit.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};
use wordsieve_event::DictEvent;

use crate::{Stats, StoreError, StoreResult, EVENT_CHANNEL_CAPACITY};

#[derive(Debug)]
struct StatsInner {
    last_update: SystemTime,
    update_count: u64,
    sources: Vec<String>,
}

/// The in-memory dictionary model.
pub struct MemoryStore {
    /// Normalized word to its source tags, insertion-ordered, deduplicated.
    words: RwLock<AHashMap<String, Vec<String>>>,

    stats: Mutex<StatsInner>,

    event_tx: Mutex<Option<mpsc::Sender<DictEvent>>>,
    event_rx: Mutex<Option<mpsc::Receiver<DictEvent>>>,

    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            words: RwLock::new(AHashMap::new()),
            stats: Mutex::new(StatsInner {
                last_update: SystemTime::now(),
                update_count: 0,
                sources: Vec::new(),
            }),
            event_tx: Mutex::new(Some(tx)),
            event_rx: Mutex::new(Some(rx)),
            closed: AtomicBool::new(false),
        }
    }

    /// Hand out the update-event receiver. There is exactly one consumer;
    /// subsequent calls return `None`.
    pub fn take_events(&self) -> Option<mpsc::Receiver<DictEvent>> {
        self.event_rx.lock().take()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Reject further mutations and drop the event sender so the consumer
    /// drains whatever is buffered and stops.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.event_tx.lock().take();
    }

    /// Emit an event after the corresponding map change is visible.
    /// Blocks when the channel is full; errors once the store is closed.
    async fn emit(&self, event: DictEvent) -> StoreResult<()> {
        let tx = self.event_tx.lock().clone();
        match tx {
            Some(tx) => tx.send(event).await.map_err(|_| StoreError::Closed),
            None => Err(StoreError::Closed),
        }
    }

    /// Insert one word, unioning `sources` into its tag list. Returns
    /// whether the word was genuinely new.
    async fn add_one(&self, word: &str, sources: &[&str]) -> StoreResult<bool> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(false);
        }
        if self.is_closed() {
            return Err(StoreError::Closed);
        }

        let is_new = {
            let mut map = self.words.write();
            match map.get_mut(word) {
                Some(tags) => {
                    for s in sources {
                        if !tags.iter().any(|t| t == s) {
                            tags.push((*s).to_string());
                        }
                    }
                    false
                }
                None => {
                    map.insert(
                        word.to_string(),
                        sources.iter().map(|s| (*s).to_string()).collect(),
                    );
                    true
                }
            }
        };

        self.emit(DictEvent::Add(word.to_string())).await?;
        Ok(is_new)
    }

    /// Remove one word and its tags. Returns whether it was present.
    async fn del_one(&self, word: &str) -> StoreResult<bool> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(false);
        }
        if self.is_closed() {
            return Err(StoreError::Closed);
        }

        let was_present = self.words.write().remove(word).is_some();
        self.emit(DictEvent::Del(word.to_string())).await?;
        Ok(was_present)
    }

    fn touch_stats(&self, changed: usize) {
        let mut stats = self.stats.lock();
        stats.last_update = SystemTime::now();
        stats.update_count += changed as u64;
    }

    fn record_source(&self, source: &str) {
        let mut stats = self.stats.lock();
        if !stats.sources.iter().any(|s| s == source) {
            stats.sources.push(source.to_string());
        }
    }

    async fn add_batch<S: AsRef<str>>(
        &self,
        words: &[S],
        source: Option<&str>,
    ) -> StoreResult<usize> {
        let tags: Vec<&str> = source.into_iter().collect();
        let mut added = 0;
        for word in words {
            if self.add_one(word.as_ref(), &tags).await? {
                added += 1;
            }
        }
        if let Some(source) = source {
            self.record_source(source);
        }
        self.touch_stats(added);
        Ok(added)
    }

    /// Insert words with no source attribution.
    pub async fn add_words<S: AsRef<str>>(&self, words: &[S]) -> StoreResult<()> {
        self.add_batch(words, None).await?;
        Ok(())
    }

    /// Insert words, tagging each with `source`.
    pub async fn add_words_with_source<S: AsRef<str>>(
        &self,
        words: &[S],
        source: &str,
    ) -> StoreResult<()> {
        self.add_batch(words, Some(source)).await?;
        Ok(())
    }

    /// Remove words. Only actually-present words count toward the update
    /// statistics.
    pub async fn del_words<S: AsRef<str>>(&self, words: &[S]) -> StoreResult<()> {
        let mut removed = 0;
        for word in words {
            if self.del_one(word.as_ref()).await? {
                removed += 1;
            }
        }
        self.touch_stats(removed);
        Ok(())
    }

    /// Weak replace: remove `old`, then insert `new`. Readers may observe
    /// the intermediate state.
    pub async fn replace_words<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> StoreResult<()> {
        self.del_words(old).await?;
        self.add_words(new).await
    }

    /// Empty the dictionary through the normal removal path, then reset
    /// the recorded sources. Channels and lifecycle state stay intact.
    pub async fn clear(&self) -> StoreResult<()> {
        let all = self.read_all();
        self.del_words(&all).await?;
        self.stats.lock().sources.clear();
        Ok(())
    }

    /// Pull every word of `other`, unioning its source tags.
    pub async fn merge(&self, other: &MemoryStore) -> StoreResult<()> {
        let snapshot = other.all_word_sources();
        let mut added = 0;
        for (word, tags) in &snapshot {
            let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
            if self.add_one(word, &tag_refs).await? {
                added += 1;
            }
            for tag in tags {
                self.record_source(tag);
            }
        }
        self.touch_stats(added);
        Ok(())
    }

    /// Split `content` into words: one per line, CR/LF/CRLF all accepted,
    /// surrounding whitespace trimmed, blanks skipped, lowercased.
    fn split_words(content: &str) -> Vec<String> {
        content
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    /// Load dictionary files. Words from paths that loaded before an
    /// error are kept.
    pub async fn load_path<P: AsRef<Path>>(&self, paths: &[P]) -> StoreResult<()> {
        for p in paths {
            let path = p.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| StoreError::Io(path.to_path_buf(), e))?;
            let content = String::from_utf8_lossy(&bytes);
            let words = Self::split_words(&content);
            let source = format!("file://{}", path.display());
            let added = self.add_batch(&words, Some(source.as_str())).await?;
            info!(path = %path.display(), words = added, "loaded dictionary file");
        }
        Ok(())
    }

    /// Load embedded dictionary contents (same line format as files).
    pub async fn load_embedded(&self, contents: &[&str]) -> StoreResult<()> {
        for content in contents {
            let words = Self::split_words(content);
            let added = self.add_batch(&words, None).await?;
            debug!(words = added, "loaded embedded dictionary");
        }
        Ok(())
    }

    /// Load from an async line-oriented reader.
    pub async fn load_reader<R>(&self, reader: R) -> StoreResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut words = Vec::new();
        while let Some(line) = lines.next_line().await? {
            let word = line.trim();
            if !word.is_empty() {
                words.push(word.to_lowercase());
            }
        }
        self.add_batch(&words, None).await?;
        Ok(())
    }

    /// Invoke a user loader and add its words under `callback://{source}`.
    /// A loader error adds nothing.
    pub async fn load_callback<F>(&self, loader: F, source: &str) -> StoreResult<()>
    where
        F: FnOnce() -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>,
    {
        let words = loader().map_err(StoreError::Loader)?;
        let tag = format!("callback://{source}");
        let added = self.add_batch(&words, Some(tag.as_str())).await?;
        info!(source = %tag, words = added, "loaded dictionary from callback");
        Ok(())
    }

    /// Write one word per line, unspecified order.
    pub fn export_writer<W: std::io::Write>(&self, writer: &mut W) -> StoreResult<()> {
        for word in self.read_all() {
            writeln!(writer, "{word}")?;
        }
        Ok(())
    }

    /// One word per line, unspecified order.
    pub fn export_string(&self) -> String {
        let mut out = String::new();
        for word in self.read_all() {
            out.push_str(&word);
            out.push('\n');
        }
        out
    }

    /// Snapshot of the current word set.
    pub fn read_all(&self) -> Vec<String> {
        self.words.read().keys().cloned().collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.read().contains_key(word)
    }

    /// Source tags of one word, insertion-ordered. Empty if absent or
    /// added through a source-less API.
    pub fn word_sources(&self, word: &str) -> Vec<String> {
        self.words.read().get(word).cloned().unwrap_or_default()
    }

    /// Snapshot of every word with its source tags.
    pub fn all_word_sources(&self) -> HashMap<String, Vec<String>> {
        self.words
            .read()
            .iter()
            .map(|(w, tags)| (w.clone(), tags.clone()))
            .collect()
    }

    pub fn stats(&self) -> Stats {
        let total_words = self.words.read().len();
        let inner = self.stats.lock();
        Stats {
            total_words,
            last_update: inner.last_update,
            update_count: inner.update_count,
            sources: inner.sources.clone(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_counts_only_new_words() {
        let store = MemoryStore::new();
        store.add_words(&["毒品", "赌博"]).await.unwrap();
        store.add_words(&["毒品", "诈骗"]).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.update_count, 3);
    }

    #[tokio::test]
    async fn test_words_are_trimmed_and_empties_skipped() {
        let store = MemoryStore::new();
        store.add_words(&["  毒品  ", "", "   "]).await.unwrap();
        assert!(store.contains("毒品"));
        assert_eq!(store.stats().total_words, 1);
    }

    #[tokio::test]
    async fn test_source_union_keeps_insertion_order() {
        let store = MemoryStore::new();
        store
            .add_words_with_source(&["违禁词a", "违禁词b"], "custom")
            .await
            .unwrap();
        store
            .add_words_with_source(&["违禁词a", "违禁词c"], "business")
            .await
            .unwrap();

        assert_eq!(store.word_sources("违禁词a"), vec!["custom", "business"]);
        assert_eq!(store.word_sources("违禁词b"), vec!["custom"]);
        assert_eq!(store.word_sources("违禁词d"), Vec::<String>::new());
        assert_eq!(store.stats().sources, vec!["custom", "business"]);
    }

    #[tokio::test]
    async fn test_del_counts_only_present_words() {
        let store = MemoryStore::new();
        store.add_words(&["a", "b"]).await.unwrap();
        store.del_words(&["a", "missing"]).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.total_words, 1);
        // 2 adds + 1 real delete
        assert_eq!(stats.update_count, 3);
    }

    #[tokio::test]
    async fn test_replace_words() {
        let store = MemoryStore::new();
        store.add_words(&["old1", "old2"]).await.unwrap();
        store.replace_words(&["old1"], &["new1"]).await.unwrap();

        assert!(!store.contains("old1"));
        assert!(store.contains("old2"));
        assert!(store.contains("new1"));
    }

    #[tokio::test]
    async fn test_clear_resets_words_and_sources() {
        let store = MemoryStore::new();
        store
            .add_words_with_source(&["a", "b"], "custom")
            .await
            .unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.stats().total_words, 0);
        assert!(store.stats().sources.is_empty());
        assert!(store.read_all().is_empty());

        // still usable after clear
        store.add_words(&["c"]).await.unwrap();
        assert!(store.contains("c"));
    }

    #[tokio::test]
    async fn test_merge_unions_words_and_sources() {
        let a = MemoryStore::new();
        let b = MemoryStore::new();
        a.add_words_with_source(&["x"], "left").await.unwrap();
        b.add_words_with_source(&["x", "y"], "right").await.unwrap();

        a.merge(&b).await.unwrap();
        assert_eq!(a.stats().total_words, 2);
        assert_eq!(a.word_sources("x"), vec!["left", "right"]);
        assert_eq!(a.word_sources("y"), vec!["right"]);
    }

    #[tokio::test]
    async fn test_event_emitted_after_store_mutation() {
        let store = MemoryStore::new();
        let mut rx = store.take_events().unwrap();
        assert!(store.take_events().is_none());

        store.add_words(&["gun"]).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event, DictEvent::Add("gun".to_string()));
        // by emission order the store already reflects the event
        assert!(store.contains("gun"));

        store.del_words(&["gun"]).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), DictEvent::Del("gun".to_string()));
        assert!(!store.contains("gun"));
    }

    #[tokio::test]
    async fn test_closed_store_rejects_mutations() {
        let store = MemoryStore::new();
        store.add_words(&["a"]).await.unwrap();
        store.close();

        assert!(store.is_closed());
        assert!(matches!(
            store.add_words(&["b"]).await,
            Err(StoreError::Closed)
        ));
        assert!(matches!(
            store.del_words(&["a"]).await,
            Err(StoreError::Closed)
        ));

        // reads still work
        assert!(store.contains("a"));
    }

    #[tokio::test]
    async fn test_export_and_split_round_trip() {
        let store = MemoryStore::new();
        store.add_words(&["alpha", "beta", "gamma"]).await.unwrap();

        let exported = store.export_string();
        let other = MemoryStore::new();
        other.load_embedded(&[exported.as_str()]).await.unwrap();

        let mut a = store.read_all();
        let mut b = other.read_all();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_load_path_records_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict.txt");
        std::fs::write(&path, "Alpha\r\n\r\n  beta  \rgamma\n").unwrap();

        let store = MemoryStore::new();
        store.load_path(&[&path]).await.unwrap();

        let mut words = store.read_all();
        words.sort();
        assert_eq!(words, vec!["alpha", "beta", "gamma"]);

        let source = format!("file://{}", path.display());
        assert_eq!(store.word_sources("alpha"), vec![source.clone()]);
        assert_eq!(store.stats().sources, vec![source]);
    }

    #[tokio::test]
    async fn test_load_path_missing_file_keeps_prior_words() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "kept\n").unwrap();
        let bad = dir.path().join("missing.txt");

        let store = MemoryStore::new();
        let result = store.load_path(&[good.clone(), bad]).await;
        assert!(matches!(result, Err(StoreError::Io(_, _))));
        assert!(store.contains("kept"));
    }

    #[tokio::test]
    async fn test_load_reader() {
        let store = MemoryStore::new();
        let data: &[u8] = b"ONE\ntwo\n\n  three  \n";
        store.load_reader(data).await.unwrap();

        let mut words = store.read_all();
        words.sort();
        assert_eq!(words, vec!["one", "three", "two"]);
    }

    #[tokio::test]
    async fn test_load_callback_success_and_failure() {
        let store = MemoryStore::new();
        store
            .load_callback(|| Ok(vec!["from_db".to_string()]), "database")
            .await
            .unwrap();
        assert_eq!(store.word_sources("from_db"), vec!["callback://database"]);

        let result = store
            .load_callback(|| Err("connection refused".into()), "database")
            .await;
        assert!(matches!(result, Err(StoreError::Loader(_))));
        assert_eq!(store.stats().total_words, 1);
    }

    #[tokio::test]
    async fn test_export_writer() {
        let store = MemoryStore::new();
        store.add_words(&["w1"]).await.unwrap();

        let mut buf = Vec::new();
        store.export_writer(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "w1\n");
    }
}
