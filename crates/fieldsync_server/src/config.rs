//! Configuration for the merge server.

/// Configuration for batch handling.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum operations accepted in one submitted batch.
    /// Oversized batches are rejected as invalid requests.
    pub max_batch: usize,
}

impl ServerConfig {
    /// Creates a configuration with the given batch limit.
    #[must_use]
    pub fn new(max_batch: usize) -> Self {
        Self { max_batch }
    }

    /// Sets the batch limit.
    #[must_use]
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = ServerConfig::default().with_max_batch(10);
        assert_eq!(config.max_batch, 10);
    }
}
