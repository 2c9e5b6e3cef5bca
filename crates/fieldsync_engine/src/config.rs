//! Configuration for the sync coordinator.

use std::time::Duration;
use uuid::Uuid;

/// What to do with the local optimistic copy when the server reports
/// a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictBehavior {
    /// Keep the stale optimistic copy until the next full fetch from
    /// the server. The device keeps showing what its operator last
    /// entered.
    #[default]
    AcceptStale,
    /// Overwrite the local copy with the winning record attached to
    /// the conflict outcome.
    AdoptServer,
}

/// Configuration for a device's sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Organization this device belongs to. Stamped onto every
    /// mutation; the server scopes all resolution to it.
    pub organization_id: Uuid,
    /// Submission timeout. A timed-out batch fails wholesale and is
    /// retried on the next connectivity event.
    pub timeout: Duration,
    /// Maximum operations submitted per batch.
    pub batch_limit: usize,
    /// Local handling of conflict outcomes.
    pub on_conflict: ConflictBehavior,
}

impl SyncConfig {
    /// Creates a configuration for an organization with defaults.
    pub fn new(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            timeout: Duration::from_secs(30),
            batch_limit: 100,
            on_conflict: ConflictBehavior::AcceptStale,
        }
    }

    /// Sets the submission timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the batch limit.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    /// Sets the conflict behavior.
    pub fn with_conflict_behavior(mut self, behavior: ConflictBehavior) -> Self {
        self.on_conflict = behavior;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let org = Uuid::new_v4();
        let config = SyncConfig::new(org)
            .with_timeout(Duration::from_secs(5))
            .with_batch_limit(10)
            .with_conflict_behavior(ConflictBehavior::AdoptServer);

        assert_eq!(config.organization_id, org);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.batch_limit, 10);
        assert_eq!(config.on_conflict, ConflictBehavior::AdoptServer);
    }

    #[test]
    fn defaults_accept_stale() {
        let config = SyncConfig::new(Uuid::new_v4());
        assert_eq!(config.on_conflict, ConflictBehavior::AcceptStale);
        assert_eq!(config.batch_limit, 100);
    }
}
