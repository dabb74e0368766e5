// Prefix trie matcher.
//
// A rooted tree keyed by code point with a terminal bit per node, swept
// from every start index so overlapping occurrences are all reported.
// Worst case O(text len * longest word), which is the right trade for
// short dictionaries that mutate in place.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use wordsieve_event::{DictEvent, Range};

use crate::Matcher;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: AHashMap<char, u32>,
    terminal: bool,
}

#[derive(Debug)]
struct TrieInner {
    /// Arena of nodes; the root lives at index 0 and is never freed.
    nodes: Vec<TrieNode>,
    free: Vec<u32>,
}

impl TrieInner {
    fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            free: Vec::new(),
        }
    }

    fn alloc(&mut self) -> u32 {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx as usize] = TrieNode::default();
            idx
        } else {
            self.nodes.push(TrieNode::default());
            (self.nodes.len() - 1) as u32
        }
    }

    fn insert(&mut self, word: &str) {
        let mut cur = 0u32;
        for c in word.chars() {
            cur = match self.nodes[cur as usize].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.alloc();
                    self.nodes[cur as usize].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[cur as usize].terminal = true;
    }

    fn remove(&mut self, word: &str) {
        // (parent, edge, node) for each step of the walk
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

        // prune empty non-terminal ancestors bottom-up
        for &(parent, edge, node) in path.iter().rev() {
            let n = &self.nodes[node as usize];
            if n.terminal || !n.children.is_empty() {
                break;
            }
            self.nodes[parent as usize].children.remove(&edge);
            self.free.push(node);
        }
    }
}

/// Longest-match prefix trie with immediate, lock-guarded updates.
pub struct TrieMatcher {
    inner: RwLock<TrieInner>,
}

impl TrieMatcher {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(TrieInner::new()),
        }
    }
}

impl Default for TrieMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for TrieMatcher {
    fn add(&self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.inner.write().insert(word);
    }

    fn del(&self, word: &str) {
        if word.is_empty() {
            return;
        }
        self.inner.write().remove(word);
    }

    fn scan(&self, text: &str) -> Vec<Range> {
        let chars: Vec<char> = text.chars().collect();
        let inner = self.inner.read();
        let mut hits = Vec::new();

        for start in 0..chars.len() {
            let mut cur = 0u32;
            for (pos, &c) in chars.iter().enumerate().skip(start) {
                match inner.nodes[cur as usize].children.get(&c) {
                    Some(&next) => cur = next,
                    None => break,
                }
                if inner.nodes[cur as usize].terminal {
                    hits.push(Range::new(start, pos));
                }
            }
        }
        hits
    }

    fn first_hit(&self, text: &str) -> Option<Range> {
        let chars: Vec<char> = text.chars().collect();
        let inner = self.inner.read();

        for start in 0..chars.len() {
            let mut cur = 0u32;
            for (pos, &c) in chars.iter().enumerate().skip(start) {
                match inner.nodes[cur as usize].children.get(&c) {
                    Some(&next) => cur = next,
                    None => break,
                }
                if inner.nodes[cur as usize].terminal {
                    return Some(Range::new(start, pos));
                }
            }
        }
        None
    }

    fn listen(self: Arc<Self>, mut events: mpsc::Receiver<DictEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    DictEvent::Add(word) => self.add(&word),
                    DictEvent::Del(word) => self.del(&word),
                }
            }
            debug!("trie update listener stopped");
        })
    }
}
