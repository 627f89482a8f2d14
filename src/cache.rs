//! Per-session decoded frame cache.
//!
//! [`FrameCache`] maps exact frame positions to decoded buffers. Its memory
//! behaviour is chosen explicitly through [`CachePolicy`]: disabled,
//! unbounded for the session's lifetime, or bounded with least-recently-used
//! eviction (the default).
//!
//! A cache belongs to exactly one [`VideoSession`](crate::VideoSession) and
//! is never shared, so it carries no locking.

use std::collections::{BTreeMap, HashMap};

use crate::config::CachePolicy;
use crate::frame::FrameBuffer;

/// Hit, miss, and eviction counters for a [`FrameCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to stay within capacity.
    pub evictions: u64,
}

struct CacheEntry {
    buffer: FrameBuffer,
    last_used: u64,
}

/// Position-keyed store of decoded frames.
pub struct FrameCache {
    policy: CachePolicy,
    entries: HashMap<u64, CacheEntry>,
    /// Recency index: `last_used` tick → position. Oldest first.
    recency: BTreeMap<u64, u64>,
    tick: u64,
    stats: CacheStats,
}

impl FrameCache {
    /// Create an empty cache governed by `policy`.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    /// The eviction policy in effect.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Look up a position, recording a hit or a miss.
    pub fn get(&mut self, position: u64) -> Option<FrameBuffer> {
        self.tick += 1;
        let tick = self.tick;
        match self.entries.get_mut(&position) {
            Some(entry) => {
                self.recency.remove(&entry.last_used);
                entry.last_used = tick;
                self.recency.insert(tick, position);
                self.stats.hits += 1;
                Some(entry.buffer.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Returns `true` if `position` is cached. Does not touch the counters
    /// or recency order.
    pub fn contains(&self, position: u64) -> bool {
        self.entries.contains_key(&position)
    }

    /// Store a decoded frame, evicting the least recently used entry when a
    /// bounded cache is full. Does nothing when caching is disabled.
    pub fn put(&mut self, position: u64, buffer: FrameBuffer) {
        let capacity = match self.policy {
            CachePolicy::Disabled => return,
            CachePolicy::Lru { capacity } if capacity == 0 => return,
            CachePolicy::Lru { capacity } => Some(capacity),
            CachePolicy::Unbounded => None,
        };

        self.tick += 1;
        let tick = self.tick;
        if let Some(previous) = self.entries.insert(
            position,
            CacheEntry {
                buffer,
                last_used: tick,
            },
        ) {
            self.recency.remove(&previous.last_used);
        }
        self.recency.insert(tick, position);

        if let Some(capacity) = capacity {
            while self.entries.len() > capacity {
                let Some((_, oldest)) = self.recency.pop_first() else {
                    break;
                };
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
                log::trace!("Evicted frame {oldest} from cache");
            }
        }
    }

    /// Number of cached frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Counters accumulated since the cache was created.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
