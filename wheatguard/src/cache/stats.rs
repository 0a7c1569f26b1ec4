//! Cache statistics tracking.

/// Counters describing value cache behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Lookups that found an entry past its time-to-live
    pub expirations: u64,
    /// Entries removed to make room for new ones
    pub evictions: u64,
    pub writes: u64,
    pub entry_count: usize,
}

impl CacheStats {
    /// Create a new statistics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit rate over all lookups (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Record a miss. Expired entries count as misses too.
    pub fn record_miss(&mut self, expired: bool) {
        self.misses += 1;
        if expired {
            self.expirations += 1;
        }
    }

    pub fn record_write(&mut self, entry_count: usize) {
        self.writes += 1;
        self.entry_count = entry_count;
    }

    pub fn record_evictions(&mut self, count: u64, entry_count: usize) {
        self.evictions += count;
        self.entry_count = entry_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_empty() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_and_expirations() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss(true);

        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
    }
}
