use bytes::Bytes;
use std::collections::VecDeque;

/// tiny LRU over (request bytes, response bytes). the master retries
/// the same payload against the same helper, and a hit skips the whole
/// emulation burst.
pub struct Cache {
    capacity: usize,
    entries: VecDeque<(Bytes, Bytes)>,
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&mut self, key: &[u8]) -> Option<Bytes> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(position).unwrap();
        let value = entry.1.clone();
        self.entries.push_front(entry);
        Some(value)
    }

    pub fn put(&mut self, key: Bytes, value: Bytes) {
        self.entries.retain(|(k, _)| k != &key);
        self.entries.push_front((key, value));
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Bytes {
        Bytes::from(vec![n; 4])
    }

    #[test]
    fn hit_returns_stored_value() {
        let mut cache = Cache::new(8);
        cache.put(key(1), Bytes::from_static(b"one"));
        assert_eq!(cache.get(&key(1)), Some(Bytes::from_static(b"one")));
        assert_eq!(cache.get(&key(2)), None);
    }

    #[test]
    fn capacity_evicts_least_recent() {
        let mut cache = Cache::new(8);
        for n in 0..9 {
            cache.put(key(n), Bytes::from_static(b"v"));
        }
        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get(&key(0)), None);
        assert!(cache.get(&key(1)).is_some());
    }

    #[test]
    fn touch_protects_from_eviction() {
        let mut cache = Cache::new(8);
        for n in 0..8 {
            cache.put(key(n), Bytes::from_static(b"v"));
        }
        assert!(cache.get(&key(0)).is_some());
        cache.put(key(8), Bytes::from_static(b"v"));
        assert!(cache.get(&key(0)).is_some());
        assert_eq!(cache.get(&key(1)), None);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut cache = Cache::new(8);
        cache.put(key(1), Bytes::from_static(b"old"));
        cache.put(key(1), Bytes::from_static(b"new"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)), Some(Bytes::from_static(b"new")));
    }
}
