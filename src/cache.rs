use std::collections::VecDeque;

/// A fixed-capacity memo backed by VecDeque.
/// When full, inserting a new key drops the oldest entry.
#[derive(Clone, Debug)]
pub struct RenderCache<K, V> {
    buf: VecDeque<(K, V)>,
    capacity: usize,
}

impl<K: PartialEq, V> RenderCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.buf.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace. If at capacity, the oldest entry is dropped.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(pos) = self.buf.iter().position(|(k, _)| *k == key) {
            self.buf.remove(pos);
        } else if self.buf.len() >= self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back((key, value));
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
