//! LRU List Module
//!
//! Implements Least Recently Used ordering for cache eviction.

// Sentinel index for "no node"
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: usize,
    next: usize,
}

// == LRU List ==
/// Recency order for LRU eviction, stored as a doubly linked list in a slab.
///
/// Nodes are addressed by the index returned from [`LruList::push_newest`];
/// the index stays valid until the node is removed. Freed slots are reused.
/// - Head = Least recently used (eviction candidate)
/// - Tail = Most recently used
///
/// Touch, remove and pop are all O(1).
#[derive(Debug)]
pub struct LruList<K> {
    nodes: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<K> LruList<K> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Push ==
    /// Appends a key at the most recent position and returns its index.
    pub fn push_newest(&mut self, key: K) -> usize {
        let node = Some(Node {
            key,
            prev: NIL,
            next: NIL,
        });
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_newest(idx);
        self.len += 1;
        idx
    }

    // == Touch ==
    /// Moves the node at `idx` to the most recent position.
    ///
    /// Returns false if `idx` does not address a live node.
    pub fn move_to_newest(&mut self, idx: usize) -> bool {
        if !self.is_live(idx) {
            return false;
        }
        if self.tail != idx {
            self.unlink(idx);
            self.link_newest(idx);
        }
        true
    }

    // == Remove ==
    /// Removes the node at `idx` and returns its key.
    pub fn remove(&mut self, idx: usize) -> Option<K> {
        if !self.is_live(idx) {
            return None;
        }
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.key)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used key.
    ///
    /// Returns None if the list is empty.
    pub fn pop_oldest(&mut self) -> Option<K> {
        self.remove(self.head)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.node(self.head).map(|node| &node.key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every node and releases the slab slots.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn is_live(&self, idx: usize) -> bool {
        self.node(idx).is_some()
    }

    fn node(&self, idx: usize) -> Option<&Node<K>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K>> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    // Detaches `idx` from its neighbours; the slot itself stays occupied.
    fn unlink(&mut self, idx: usize) {
        let Some((prev, next)) = self.node(idx).map(|node| (node.prev, node.next)) else {
            return;
        };

        match self.node_mut(prev) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_newest(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = NIL;
        }
        match self.node_mut(old_tail) {
            Some(node) => node.next = idx,
            None => self.head = idx,
        }
        self.tail = idx;
    }
}

impl<K> Default for LruList<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Oldest-to-newest iterator over an [`LruList`].
pub struct Iter<'a, K> {
    list: &'a LruList<K>,
    cursor: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor)?;
        self.cursor = node.next;
        Some(&node.key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(lru: &LruList<&'static str>) -> Vec<&'static str> {
        lru.iter().copied().collect()
    }

    #[test]
    fn test_lru_new() {
        let lru: LruList<&str> = LruList::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_push_keeps_insertion_order() {
        let mut lru = LruList::new();

        lru.push_newest("key1");
        lru.push_newest("key2");
        lru.push_newest("key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(lru.peek_oldest(), Some(&"key1"));
        assert_eq!(keys(&lru), vec!["key1", "key2", "key3"]);
    }

    #[test]
    fn test_lru_move_existing_key() {
        let mut lru = LruList::new();

        let key1 = lru.push_newest("key1");
        lru.push_newest("key2");
        lru.push_newest("key3");

        // Touch key1 again - should move to newest
        assert!(lru.move_to_newest(key1));

        assert_eq!(lru.len(), 3);
        // key2 is now oldest
        assert_eq!(lru.peek_oldest(), Some(&"key2"));
        assert_eq!(keys(&lru), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_lru_move_newest_is_noop() {
        let mut lru = LruList::new();

        lru.push_newest("a");
        let b = lru.push_newest("b");

        assert!(lru.move_to_newest(b));
        assert_eq!(keys(&lru), vec!["a", "b"]);
    }

    #[test]
    fn test_lru_pop_oldest() {
        let mut lru = LruList::new();

        lru.push_newest("key1");
        lru.push_newest("key2");
        lru.push_newest("key3");

        assert_eq!(lru.pop_oldest(), Some("key1"));
        assert_eq!(lru.len(), 2);

        assert_eq!(lru.pop_oldest(), Some("key2"));
        assert_eq!(lru.len(), 1);

        assert_eq!(lru.pop_oldest(), Some("key3"));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_pop_empty() {
        let mut lru: LruList<&str> = LruList::new();
        assert_eq!(lru.pop_oldest(), None);
    }

    #[test]
    fn test_lru_remove_middle() {
        let mut lru = LruList::new();

        lru.push_newest("key1");
        let key2 = lru.push_newest("key2");
        lru.push_newest("key3");

        assert_eq!(lru.remove(key2), Some("key2"));

        assert_eq!(lru.len(), 2);
        assert_eq!(keys(&lru), vec!["key1", "key3"]);
    }

    #[test]
    fn test_lru_remove_stale_index() {
        let mut lru = LruList::new();

        let key1 = lru.push_newest("key1");
        lru.push_newest("key2");

        assert_eq!(lru.remove(key1), Some("key1"));
        // Removing again should not panic or affect existing keys
        assert_eq!(lru.remove(key1), None);
        assert!(!lru.move_to_newest(key1));
        assert_eq!(lru.remove(999), None);

        assert_eq!(keys(&lru), vec!["key2"]);
    }

    #[test]
    fn test_lru_reuses_freed_slots() {
        let mut lru = LruList::new();

        let a = lru.push_newest("a");
        lru.push_newest("b");
        lru.remove(a);

        let c = lru.push_newest("c");
        assert_eq!(c, a);
        assert_eq!(keys(&lru), vec!["b", "c"]);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruList::new();

        let a = lru.push_newest("a");
        let b = lru.push_newest("b");
        let c = lru.push_newest("c");

        // Access in different order: a, c, b
        lru.move_to_newest(a);
        lru.move_to_newest(c);
        lru.move_to_newest(b);

        assert_eq!(lru.pop_oldest(), Some("a"));
        assert_eq!(lru.pop_oldest(), Some("c"));
        assert_eq!(lru.pop_oldest(), Some("b"));
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruList::new();

        lru.push_newest("a");
        lru.push_newest("b");
        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.iter().count(), 0);

        lru.push_newest("c");
        assert_eq!(keys(&lru), vec!["c"]);
    }
}
