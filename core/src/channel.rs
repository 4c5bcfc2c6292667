//! Channel configuration for worker -> aggregator communication

/// Channel buffer configuration
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Error event buffer size (workers -> error aggregator)
    pub error_buffer: usize,

    /// Upper bound for the live snapshot buffer (workers -> live aggregator)
    pub live_buffer_cap: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            error_buffer: 1024,
            live_buffer_cap: 1000,
        }
    }
}

impl ChannelConfig {
    /// Create a new channel config with custom error buffer size
    pub fn with_error_buffer(mut self, size: usize) -> Self {
        self.error_buffer = size;
        self
    }

    /// Create a new channel config with custom live buffer cap
    pub fn with_live_buffer_cap(mut self, size: usize) -> Self {
        self.live_buffer_cap = size;
        self
    }

    /// Live snapshot buffer for the given number of workers
    ///
    /// One slot per worker, capped at `live_buffer_cap`.
    pub fn live_buffer(&self, parallelism: usize) -> usize {
        parallelism.min(self.live_buffer_cap).max(1)
    }
}
