//! Core engine configuration

use serde::{Deserialize, Serialize};

/// Default minimum interval between outbound mutation calls, in
/// milliseconds
///
/// This is the single source of truth for the rate governor's delay;
/// nothing mutates the value at runtime.
pub const DEFAULT_MUTATION_INTERVAL_MS: u64 = 350;

/// Replication engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Ceiling on concurrently active clone operations
    pub max_concurrent_ops: usize,
    /// Minimum interval between outbound mutation calls, in milliseconds
    pub mutation_interval_ms: u64,
    /// Capacity of each operation's event channel
    pub event_capacity: usize,
    /// How many terminal operation snapshots the registry retains for
    /// immediately-following status queries
    pub recent_capacity: usize,
}

impl CoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a concurrency ceiling
    #[inline]
    #[must_use]
    pub fn with_max_concurrent_ops(mut self, max: usize) -> Self {
        self.max_concurrent_ops = max;
        self
    }

    /// With a mutation interval in milliseconds
    #[inline]
    #[must_use]
    pub fn with_mutation_interval_ms(mut self, interval_ms: u64) -> Self {
        self.mutation_interval_ms = interval_ms;
        self
    }

    /// With a retained-terminal-snapshot capacity
    #[inline]
    #[must_use]
    pub fn with_recent_capacity(mut self, capacity: usize) -> Self {
        self.recent_capacity = capacity;
        self
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_concurrent_ops: 2,
            mutation_interval_ms: DEFAULT_MUTATION_INTERVAL_MS,
            event_capacity: 64,
            recent_capacity: 8,
        }
    }
}
