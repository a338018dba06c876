//! Registry configuration

/// Default number of frames buffered per receiver before it starts lagging
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Configuration for the connection registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of the broadcast channel
    ///
    /// A client that falls this many frames behind skips the oldest ones.
    pub broadcast_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Set the broadcast channel capacity (at least 1)
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        let config = RegistryConfig::default();
        assert_eq!(config.broadcast_capacity, DEFAULT_BROADCAST_CAPACITY);
    }

    #[test]
    fn test_capacity_never_zero() {
        let config = RegistryConfig::default().broadcast_capacity(0);
        assert_eq!(config.broadcast_capacity, 1);
    }
}
