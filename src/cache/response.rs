use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use super::Signature;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    captured_at: Instant,
}

/// Time-boxed memoization of read responses.
///
/// Entries leave only through TTL expiry or explicit invalidation; there is
/// no size bound. Every invalidation advances a generation counter and
/// records it against the invalidated prefix. [`ResponseCache::put`] refuses
/// a value fetched under an older generation only when an invalidation since
/// then covered its signature.
#[derive(Debug)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: HashMap<Signature, CacheEntry<V>>,
    generation: u64,
    cleared_at: u64,
    invalidated: HashMap<String, u64>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            generation: 0,
            cleared_at: 0,
            invalidated: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the stored value while it is younger than the TTL.
    pub fn get(&mut self, signature: &Signature, now: Instant) -> Option<V> {
        let entry = self.entries.get(signature)?;
        if now.saturating_duration_since(entry.captured_at) < self.ttl {
            return Some(entry.value.clone());
        }

        self.entries.remove(signature);
        None
    }

    /// Stores `value` unless its signature was invalidated after
    /// `generation` was observed. Returns whether the value was kept.
    pub fn put(&mut self, signature: Signature, value: V, generation: u64, now: Instant) -> bool {
        if self.invalidated_since(&signature, generation) {
            return false;
        }

        self.entries.insert(
            signature,
            CacheEntry {
                value,
                captured_at: now,
            },
        );
        true
    }

    /// Drops every entry whose signature starts with `prefix`.
    pub fn invalidate(&mut self, prefix: &str) -> usize {
        self.generation += 1;
        self.invalidated.insert(prefix.to_string(), self.generation);
        let before = self.entries.len();
        self.entries
            .retain(|signature, _| !signature.starts_with(prefix));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.cleared_at = self.generation;
        self.invalidated.clear();
        self.entries.clear();
    }

    fn invalidated_since(&self, signature: &Signature, generation: u64) -> bool {
        self.cleared_at > generation
            || self
                .invalidated
                .iter()
                .any(|(prefix, at)| *at > generation && signature.starts_with(prefix))
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.entries.contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
