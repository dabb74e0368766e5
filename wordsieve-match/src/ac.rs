// Aho-Corasick matcher.
//
// The automaton is an arena of nodes addressed by index; children,
// failure links and outputs never hold owning references, so the cycles
// failure links introduce cost nothing to drop. A fully linked automaton
// is immutable: readers clone the current Arc once per scan and are
// unaffected by concurrent rebuilds. Writers construct a replacement
// off-line and publish it by swapping the Arc.
//
// Dictionary updates arriving over the event channel are coalesced: the
// listener buffers them and rebuilds once per time window, or sooner when
// a buffer reaches the batch threshold, so a bulk load of thousands of
// words costs a handful of rebuilds instead of one each.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use wordsieve_event::{DictEvent, Range};

use crate::Matcher;

#[derive(Debug, Clone, Default)]
struct AcNode {
    children: AHashMap<char, u32>,
    fail: u32,
    terminal: bool,
    /// Code-point lengths of every dictionary word ending at this state:
    /// the word terminating here plus words reachable over failure links.
    /// Precomputed at link time, longest first.
    outputs: SmallVec<[u32; 2]>,
}

/// A fully linked, immutable automaton snapshot. Root at index 0.
#[derive(Debug)]
struct AcAutomaton {
    nodes: Vec<AcNode>,
}

impl AcAutomaton {
    fn empty() -> Self {
        Self {
            nodes: vec![AcNode::default()],
        }
    }

    /// Follow failure links until a child for `c` exists, else the root.
    fn step(&self, mut cur: u32, c: char) -> u32 {
        loop {
            if let Some(&next) = self.nodes[cur as usize].children.get(&c) {
                return next;
            }
            if cur == 0 {
                return 0;
            }
            cur = self.nodes[cur as usize].fail;
        }
    }

    fn scan_into(&self, chars: &[char], hits: &mut Vec<Range>) {
        let mut cur = 0u32;
        for (i, &c) in chars.iter().enumerate() {
            cur = self.step(cur, c);
            for &len in &self.nodes[cur as usize].outputs {
                hits.push(Range::new(i + 1 - len as usize, i));
            }
        }
    }

    fn first_hit(&self, chars: &[char]) -> Option<Range> {
        let mut cur = 0u32;
        for (i, &c) in chars.iter().enumerate() {
            cur = self.step(cur, c);
            // outputs are ordered longest first
            if let Some(&len) = self.nodes[cur as usize].outputs.first() {
                return Some(Range::new(i + 1 - len as usize, i));
            }
        }
        None
    }
}

/// Mutable automaton-under-construction: trie structure plus terminal
/// bits, with failure links and outputs recomputed by [`AcBuilder::link`].
struct AcBuilder {
    nodes: Vec<AcNode>,
}

impl AcBuilder {
    /// A compacting copy of the snapshot's trie structure. Only nodes
    /// reachable from the root survive, so branches unlinked by earlier
    /// removals stop costing clone time.
    fn from_snapshot(auto: &AcAutomaton) -> Self {
        let mut nodes = Vec::with_capacity(auto.nodes.len());
        let mut remap = vec![0u32; auto.nodes.len()];
        let mut queue = VecDeque::from([0u32]);

        nodes.push(AcNode {
            terminal: auto.nodes[0].terminal,
            ..AcNode::default()
        });

        while let Some(old) = queue.pop_front() {
            let new_idx = remap[old as usize] as usize;
            for (&c, &child) in &auto.nodes[old as usize].children {
                let mapped = nodes.len() as u32;
                remap[child as usize] = mapped;
                nodes.push(AcNode {
                    terminal: auto.nodes[child as usize].terminal,
                    ..AcNode::default()
                });
                nodes[new_idx].children.insert(c, mapped);
                queue.push_back(child);
            }
        }

        Self { nodes }
    }

    fn insert(&mut self, word: &str) {
        let mut cur = 0u32;
        for c in word.chars() {
            cur = match self.nodes[cur as usize].children.get(&c) {
                Some(&next) => next,
                None => {
                    self.nodes.push(AcNode::default());
                    let next = (self.nodes.len() - 1) as u32;
                    self.nodes[cur as usize].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[cur as usize].terminal = true;
    }

    fn remove(&mut self, word: &str) {
        let mut path: Vec<(u32, char, u32)> = Vec::new();
        let mut cur = 0u32;
        for c in word.chars() {
            match self.nodes[cur as usize].children.get(&c) {
                Some(&next) => {
                    path.push((cur, c, next));
                    cur = next;
                }
                None => return,
            }
        }
        if path.is_empty() || !self.nodes[cur as usize].terminal {
            return;
        }
        self.nodes[cur as usize].terminal = false;

        // unlink the dead branch; the next compacting copy drops it
        for &(parent, edge, node) in path.iter().rev() {
            let n = &self.nodes[node as usize];
            if n.terminal || !n.children.is_empty() {
                break;
            }
            self.nodes[parent as usize].children.remove(&edge);
        }
    }

    /// BFS failure-link construction with output propagation: a node's
    /// outputs are its own terminating word followed by the outputs of
    /// its failure target, which BFS order has already completed.
    fn link(mut self) -> AcAutomaton {
        let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

        let root_children: Vec<u32> = self.nodes[0].children.values().copied().collect();
        for v in root_children {
            let node = &mut self.nodes[v as usize];
            node.fail = 0;
            node.outputs = if node.terminal {
                SmallVec::from_slice(&[1])
            } else {
                SmallVec::new()
            };
            queue.push_back((v, 1));
        }

        while let Some((u, depth)) = queue.pop_front() {
            let children: Vec<(char, u32)> = self.nodes[u as usize]
                .children
                .iter()
                .map(|(&c, &v)| (c, v))
                .collect();

            for (c, v) in children {
                let mut t = self.nodes[u as usize].fail;
                let fail = loop {
                    if let Some(&w) = self.nodes[t as usize].children.get(&c) {
                        break w;
                    }
                    if t == 0 {
                        break 0;
                    }
                    t = self.nodes[t as usize].fail;
                };

                let child_depth = depth + 1;
                let mut outputs: SmallVec<[u32; 2]> = SmallVec::new();
                if self.nodes[v as usize].terminal {
                    outputs.push(child_depth);
                }
                outputs.extend_from_slice(&self.nodes[fail as usize].outputs);

                let node = &mut self.nodes[v as usize];
                node.fail = fail;
                node.outputs = outputs;
                queue.push_back((v, child_depth));
            }
        }

        AcAutomaton { nodes: self.nodes }
    }
}

/// Configuration for the batched rebuild path.
#[derive(Debug, Clone)]
pub struct AcConfig {
    /// Window between batched rebuilds.
    pub rebuild_window: Duration,

    /// Pending-update count that forces a rebuild before the window ends.
    pub batch_threshold: usize,
}

impl Default for AcConfig {
    fn default() -> Self {
        Self {
            rebuild_window: Duration::from_millis(100),
            batch_threshold: 1000,
        }
    }
}

/// Aho-Corasick matcher with snapshot reads and coalesced rebuilds.
pub struct AcMatcher {
    /// The published automaton. Readers clone the Arc once at scan entry;
    /// the previous version is dropped when its last reader finishes.
    current: RwLock<Arc<AcAutomaton>>,

    /// Serializes rebuilds so concurrent writers cannot lose updates.
    build_lock: Mutex<()>,

    rebuilds: AtomicU64,
    config: AcConfig,
}

impl AcMatcher {
    pub fn new(config: AcConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(AcAutomaton::empty())),
            build_lock: Mutex::new(()),
            rebuilds: AtomicU64::new(0),
            config,
        }
    }

    fn snapshot(&self) -> Arc<AcAutomaton> {
        self.current.read().clone()
    }

    /// Rebuilds performed since construction. Bulk loads through the
    /// event channel should push this up by roughly batch-count, not
    /// word-count.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    fn apply_batch(&self, adds: &[String], dels: &[String]) {
        let _guard = self.build_lock.lock();

        let mut builder = AcBuilder::from_snapshot(&self.snapshot());
        for word in dels {
            builder.remove(word);
        }
        for word in adds {
            builder.insert(word);
        }
        let automaton = builder.link();

        *self.current.write() = Arc::new(automaton);
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    fn flush(&self, adds: &mut Vec<String>, dels: &mut Vec<String>) {
        if adds.is_empty() && dels.is_empty() {
            return;
        }
        self.apply_batch(adds, dels);
        debug!(
            adds = adds.len(),
            dels = dels.len(),
            "rebuilt automaton from batched updates"
        );
        adds.clear();
        dels.clear();
    }
}

impl Matcher for AcMatcher {
    fn add(&self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.apply_batch(&[word.to_string()], &[]);
    }

    fn del(&self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.apply_batch(&[], &[word.to_string()]);
    }

    fn scan(&self, text: &str) -> Vec<Range> {
        let chars: Vec<char> = text.chars().collect();
        let mut hits = Vec::new();
        self.snapshot().scan_into(&chars, &mut hits);
        hits
    }

    fn first_hit(&self, text: &str) -> Option<Range> {
        let chars: Vec<char> = text.chars().collect();
        self.snapshot().first_hit(&chars)
    }

    fn listen(self: Arc<Self>, mut events: mpsc::Receiver<DictEvent>) -> JoinHandle<()> {
        let window = self.config.rebuild_window;
        let threshold = self.config.batch_threshold;

        tokio::spawn(async move {
            let mut pending_adds: Vec<String> = Vec::new();
            let mut pending_dels: Vec<String> = Vec::new();
            let mut ticker = tokio::time::interval(window);

            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(DictEvent::Add(word)) if !word.is_empty() => {
                            pending_adds.push(word);
                            if pending_adds.len() >= threshold {
                                self.flush(&mut pending_adds, &mut pending_dels);
                            }
                        }
                        Some(DictEvent::Del(word)) if !word.is_empty() => {
                            pending_dels.push(word);
                            if pending_dels.len() >= threshold {
                                self.flush(&mut pending_adds, &mut pending_dels);
                            }
                        }
                        Some(_) => {}
                        None => break,
                    },
                    _ = ticker.tick() => {
                        self.flush(&mut pending_adds, &mut pending_dels);
                    }
                }
            }

            // channel closed: one last flush regardless of timer state
            self.flush(&mut pending_adds, &mut pending_dels);
            debug!("automaton update listener stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_words(m: &AcMatcher, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        m.scan(text)
            .into_iter()
            .map(|r| chars[r.start..=r.end].iter().collect())
            .collect()
    }

    #[test]
    fn test_emission_order_is_end_position_then_depth() {
        let m = AcMatcher::new(AcConfig::default());
        for w in ["he", "she", "his", "hers"] {
            m.add(w);
        }
        assert_eq!(hit_words(&m, "ushers"), vec!["she", "he", "hers"]);
    }

    #[test]
    fn test_failure_links_reach_suffix_patterns() {
        let m = AcMatcher::new(AcConfig::default());
        m.add("abcd");
        m.add("bc");
        assert_eq!(hit_words(&m, "zabcz"), vec!["bc"]);
    }

    #[test]
    fn test_sync_add_del_visible_on_return() {
        let m = AcMatcher::new(AcConfig::default());
        m.add("毒品");
        assert!(m.contains_any("贩卖毒品"));

        m.del("毒品");
        assert!(!m.contains_any("贩卖毒品"));
        assert_eq!(m.rebuild_count(), 2);
    }

    #[test]
    fn test_del_only_removes_one_pattern() {
        let m = AcMatcher::new(AcConfig::default());
        m.add("abc");
        m.add("ab");
        m.del("abc");
        assert_eq!(hit_words(&m, "abc"), vec!["ab"]);
    }

    #[test]
    fn test_first_hit_prefers_longest_at_position() {
        let m = AcMatcher::new(AcConfig::default());
        m.add("he");
        m.add("she");
        let r = m.first_hit("ushers").unwrap();
        assert_eq!(r, Range::new(1, 3));
    }

    #[test]
    fn test_scans_see_consistent_snapshot() {
        let m = AcMatcher::new(AcConfig::default());
        m.add("aa");

        let before = m.snapshot();
        m.add("bb");

        let chars: Vec<char> = "aabb".chars().collect();
        let mut old_hits = Vec::new();
        before.scan_into(&chars, &mut old_hits);
        assert_eq!(old_hits, vec![Range::new(0, 1)]);

        assert_eq!(m.scan("aabb"), vec![Range::new(0, 1), Range::new(2, 3)]);
    }

    #[tokio::test]
    async fn test_listener_flushes_on_channel_close() {
        let (tx, rx) = mpsc::channel(64);
        let m = Arc::new(AcMatcher::new(AcConfig::default()));
        let handle = m.clone().listen(rx);

        for w in ["gambling", "scam"] {
            tx.send(DictEvent::Add(w.to_string())).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert!(m.contains_any("online gambling site"));
        assert!(m.contains_any("a scam"));
    }

    #[tokio::test]
    async fn test_listener_applies_deletes_before_adds_per_batch() {
        let (tx, rx) = mpsc::channel(64);
        let m = Arc::new(AcMatcher::new(AcConfig::default()));
        let handle = m.clone().listen(rx);

        tx.send(DictEvent::Add("spam".to_string())).await.unwrap();
        tx.send(DictEvent::Del("spam".to_string())).await.unwrap();
        tx.send(DictEvent::Add("spam".to_string())).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        // deletions apply first, so the re-add within the batch survives
        assert!(m.contains_any("spam wave"));
    }

    #[tokio::test]
    async fn test_bulk_load_coalesces_rebuilds() {
        let config = AcConfig {
            rebuild_window: Duration::from_millis(500),
            batch_threshold: 100,
        };
        let (tx, rx) = mpsc::channel(8192);
        let m = Arc::new(AcMatcher::new(config));
        let handle = m.clone().listen(rx);

        for i in 0..1000 {
            tx.send(DictEvent::Add(format!("词条{i}"))).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert!(m.contains_any("内容词条0结尾"));
        assert!(m.contains_any("内容词条999结尾"));

        // at most one timer flush lands mid-stream on top of the
        // threshold flushes and the final drain
        assert!(m.rebuild_count() >= 10);
        assert!(m.rebuild_count() <= 11, "rebuilds = {}", m.rebuild_count());
    }
}
