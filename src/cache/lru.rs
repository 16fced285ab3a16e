//! LRU Index Module
//!
//! Recency-ordered key index backed by an arena of slots.
//!
//! Nodes live in a `Vec` and link to each other by slot index instead of by
//! pointer. Vacated slots go on a free list and are reused by later inserts,
//! so a steady-state cache stops allocating once it has filled up.

use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Node ==
#[derive(Debug)]
struct Node<V> {
    entry: CacheEntry<V>,
    /// Neighbour closer to the head (more recent)
    prev: Option<usize>,
    /// Neighbour closer to the tail (less recent)
    next: Option<usize>,
}

// == LRU Index ==
/// Doubly-linked recency list plus a key -> slot map.
///
/// - Head = most recently used
/// - Tail = least recently used
#[derive(Debug)]
pub struct LruIndex<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    map: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> Default for LruIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LruIndex<V> {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            map: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            map: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    // == Lookup ==
    /// Returns the slot holding `key`, if any.
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        self.map.get(key).copied()
    }

    /// Returns the entry stored in `slot`.
    pub fn entry(&self, slot: usize) -> Option<&CacheEntry<V>> {
        self.node(slot).map(|node| &node.entry)
    }

    /// Returns the entry stored in `slot` for in-place mutation.
    pub fn entry_mut(&mut self, slot: usize) -> Option<&mut CacheEntry<V>> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .map(|node| &mut node.entry)
    }

    /// Returns the entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.slot_of(key).and_then(|slot| self.entry(slot))
    }

    // == Push Front ==
    /// Inserts a new entry at the head and returns its slot.
    ///
    /// If the key is already indexed its old node is dropped first, so the
    /// map never points at two nodes for one key.
    pub fn push_front(&mut self, entry: CacheEntry<V>) -> usize {
        if let Some(old) = self.slot_of(&entry.key) {
            self.remove(old);
        }

        let key = entry.key.clone();
        let node = Node {
            entry,
            prev: None,
            next: None,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.link_front(slot);
        self.map.insert(key, slot);
        slot
    }

    // == Move To Front ==
    /// Marks the node in `slot` as most recently used.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) || self.node(slot).is_none() {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    // == Remove ==
    /// Removes the node in `slot` and returns its entry.
    pub fn remove(&mut self, slot: usize) -> Option<CacheEntry<V>> {
        self.node(slot)?;
        self.unlink(slot);

        let node = self.slots[slot].take()?;
        self.free.push(slot);
        self.map.remove(&node.entry.key);
        Some(node.entry)
    }

    /// Removes the node stored under `key` and returns its entry.
    pub fn remove_key(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let slot = self.slot_of(key)?;
        self.remove(slot)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry<V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Traversal ==
    /// Slot of the least recently used node.
    pub fn back(&self) -> Option<usize> {
        self.tail
    }

    /// Slot of the most recently used node.
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    /// Slot of the neighbour one step closer to the head.
    pub fn prev_of(&self, slot: usize) -> Option<usize> {
        self.node(slot).and_then(|node| node.prev)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            index: self,
            cursor: self.head,
        }
    }

    // == Clear ==
    /// Drops every node and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.map.clear();
        self.head = None;
        self.tail = None;
    }

    // == Length ==
    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // == Consistency ==
    /// Verifies the map/list bijection and link symmetry.
    ///
    /// Walks the list head to tail, checking each node's back link and map
    /// entry, then checks every slot is either linked or on the free list.
    pub fn is_consistent(&self) -> bool {
        let mut seen = 0usize;
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(slot) = cursor {
            let Some(node) = self.node(slot) else {
                return false;
            };
            if node.prev != prev || self.map.get(&node.entry.key) != Some(&slot) {
                return false;
            }
            seen += 1;
            if seen > self.slots.len() {
                // cycle
                return false;
            }
            prev = Some(slot);
            cursor = node.next;
        }

        let vacant = self.slots.iter().filter(|s| s.is_none()).count();

        self.tail == prev
            && seen == self.map.len()
            && vacant == self.free.len()
            && seen + vacant == self.slots.len()
            && self.free.iter().all(|&slot| self.slots[slot].is_none())
    }

    // == Internal Helpers ==
    fn node(&self, slot: usize) -> Option<&Node<V>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: usize) -> Option<&mut Node<V>> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Detaches `slot` from its neighbours, leaving the node in place.
    fn unlink(&mut self, slot: usize) {
        let Some((prev, next)) = self.node(slot).map(|node| (node.prev, node.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(slot) {
            node.prev = None;
            node.next = None;
        }
    }

    /// Attaches a detached `slot` at the head.
    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;

        if let Some(node) = self.node_mut(slot) {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }

        self.head = Some(slot);
    }
}

// == Keys Iterator ==
/// Iterator over keys in recency order, most recent first.
pub struct Keys<'a, V> {
    index: &'a LruIndex<V>,
    cursor: Option<usize>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.node(self.cursor?)?;
        self.cursor = node.next;
        Some(node.entry.key.as_str())
    }
}
