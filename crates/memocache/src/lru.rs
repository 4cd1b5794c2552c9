//! LRU (Least Recently Used) recency list with key index
//!
//! Entries live in a slot arena threaded by an intrusive doubly-linked list.
//! The index maps each key to its slot, so a hit relocates its entry and a
//! full cache drops its tail in O(1). Slots freed by eviction are recycled
//! through a free list, keeping every other slot handle stable.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use ahash::RandomState;

use crate::error::{Error, Result};

/// Upper bound on up-front allocation; larger caches grow on demand.
const MAX_PREALLOC: usize = 1 << 16;

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache with fixed capacity
///
/// Not synchronized; [`MemoCache`](crate::MemoCache) wraps it in a mutex.
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// A capacity of 0 is accepted; such a cache never retains anything.
    pub fn new(capacity: usize) -> Self {
        let prealloc = capacity.min(MAX_PREALLOC);

        Self {
            map: HashMap::with_capacity_and_hasher(prealloc, RandomState::new()),
            nodes: Vec::with_capacity(prealloc),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Get a value and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Get a value without touching recency order
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Check membership without touching recency order
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert a key-value pair at the front
    ///
    /// If the key is already present its value is replaced and it moves to
    /// the front; nothing is evicted. Otherwise, when the cache is full, the
    /// single least recently used entry is removed and returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
            }
            self.move_to_front(idx);
            return None;
        }

        if self.capacity == 0 {
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.push_front(idx);
        self.map.insert(key, idx);

        evicted
    }

    /// Remove a key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.free_list.push(idx);
        self.nodes[idx].take().map(|node| node.value)
    }

    /// Most recently used key
    pub fn front(&self) -> Option<&K> {
        self.head
            .and_then(|idx| self.nodes[idx].as_ref())
            .map(|node| &node.key)
    }

    /// Least recently used key (next eviction candidate)
    pub fn back(&self) -> Option<&K> {
        self.tail
            .and_then(|idx| self.nodes[idx].as_ref())
            .map(|node| &node.key)
    }

    /// Iterate keys from most to least recently used
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            nodes: &self.nodes,
            next: self.head,
        }
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of retained entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    /// Arena slot currently holding `key`
    #[cfg(test)]
    pub(crate) fn slot_of(&self, key: &K) -> Option<usize> {
        self.map.get(key).copied()
    }

    /// Verify that the index and the recency list describe the same entries
    pub fn check_invariants(&self) -> Result<()>
    where
        K: Debug,
    {
        let mut count = 0;
        let mut prev: Option<usize> = None;
        let mut current = self.head;

        while let Some(idx) = current {
            count += 1;
            if count > self.nodes.len() {
                return Err(Error::invariant("recency list contains a cycle"));
            }

            let node = self.nodes[idx]
                .as_ref()
                .ok_or_else(|| Error::invariant(format!("list links to free slot {}", idx)))?;

            if node.prev != prev {
                return Err(Error::invariant(format!(
                    "node {:?} has prev {:?}, expected {:?}",
                    node.key, node.prev, prev
                )));
            }

            match self.map.get(&node.key) {
                Some(&mapped) if mapped == idx => {}
                Some(&mapped) => {
                    return Err(Error::invariant(format!(
                        "key {:?} indexed at slot {}, found at slot {}",
                        node.key, mapped, idx
                    )));
                }
                None => {
                    return Err(Error::invariant(format!(
                        "key {:?} is in the list but not the index",
                        node.key
                    )));
                }
            }

            prev = Some(idx);
            current = node.next;
        }

        if self.tail != prev {
            return Err(Error::invariant(format!(
                "tail is {:?}, list ends at {:?}",
                self.tail, prev
            )));
        }

        if count != self.map.len() {
            return Err(Error::invariant(format!(
                "index has {} keys, list has {} entries",
                self.map.len(),
                count
            )));
        }

        if self.map.len() > self.capacity {
            return Err(Error::invariant(format!(
                "{} entries exceed capacity {}",
                self.map.len(),
                self.capacity
            )));
        }

        if self.nodes.len() != count + self.free_list.len() {
            return Err(Error::invariant(format!(
                "{} slots, {} live, {} free",
                self.nodes.len(),
                count,
                self.free_list.len()
            )));
        }

        Ok(())
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Drop exactly one entry: the current tail
    fn evict(&mut self) -> Option<(K, V)> {
        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        let node = self.nodes[tail_idx].take()?;
        self.map.remove(&node.key);
        self.free_list.push(tail_idx);
        Some((node.key, node.value))
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

/// Iterator over keys in recency order, front first
pub struct Keys<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    next: Option<usize>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = nodes[self.next?].as_ref()?;
        self.next = node.next;
        Some(&node.key)
    }
}
