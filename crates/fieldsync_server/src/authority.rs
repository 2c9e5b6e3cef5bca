//! The authoritative store contract.

use fieldsync_clock::Hlc;
use fieldsync_protocol::{Collection, Record};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Result type for authority operations.
pub type AuthorityResult<T> = Result<T, AuthorityError>;

/// Errors reported by an authoritative store.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The targeted record exists but belongs to a different
    /// organization. Permanent; retrying cannot succeed.
    #[error("record {id} in {collection} belongs to another organization")]
    OrganizationMismatch {
        /// Targeted collection.
        collection: Collection,
        /// Targeted record id.
        id: Uuid,
    },

    /// A backend failure (constraint violation, connection loss).
    /// Retryable; the client keeps the operation queued.
    #[error("backend error: {0}")]
    Backend(String),
}

/// The version of an authoritative row, used for compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowVersion {
    /// No row exists for this id.
    Absent,
    /// A row exists but carries no causal timestamp (seeded outside
    /// the sync path). Always loses to a stamped write.
    Unstamped,
    /// A row exists with this stored timestamp.
    Stamped(Hlc),
}

impl RowVersion {
    /// Computes the version of an observed row.
    #[must_use]
    pub fn of(row: Option<&Record>) -> Self {
        match row {
            None => RowVersion::Absent,
            Some(record) => match &record.last_timestamp {
                None => RowVersion::Unstamped,
                Some(ts) => RowVersion::Stamped(ts.clone()),
            },
        }
    }
}

/// Outcome of a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The expected version matched and the write was applied.
    Applied,
    /// Another writer changed the row since it was read. The caller
    /// re-reads and re-compares; it never blindly retries the write.
    Stale {
        /// The row as it stands now.
        current: Option<Record>,
    },
}

/// Read/write contract the merge service consumes from the
/// authoritative store.
///
/// Submissions arrive from independent processes, so the
/// read-modify-write in merge resolution cannot be closed by
/// in-process locking: the conditional operations here are
/// compare-and-swap on the stored timestamp, the moral equivalent of
/// a relational `UPDATE ... WHERE hlc = ?`. Every operation is
/// scoped to an owning organization; a row belonging to another
/// organization is rejected, never read or overwritten.
pub trait AuthoritativeStore: Send + Sync {
    /// Reads the current authoritative row for an id.
    fn get_for_update(
        &self,
        organization: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> AuthorityResult<Option<Record>>;

    /// Upserts a record if the current row version matches
    /// `expected`.
    fn upsert_if(
        &self,
        organization: Uuid,
        collection: Collection,
        record: Record,
        expected: &RowVersion,
    ) -> AuthorityResult<CasOutcome>;

    /// Deletes a row if its current version matches `expected`.
    /// Deleting an absent row with `expected == Absent` applies as a
    /// no-op, keeping deletes idempotent.
    fn delete_if(
        &self,
        organization: Uuid,
        collection: Collection,
        id: Uuid,
        expected: &RowVersion,
    ) -> AuthorityResult<CasOutcome>;
}

/// In-process reference implementation of [`AuthoritativeStore`].
///
/// Backs the merge service in tests and single-node deployments. A
/// relational implementation slots in behind the same trait with the
/// conditional writes expressed as conditional SQL updates.
#[derive(Debug, Default)]
pub struct MemoryAuthority {
    rows: RwLock<HashMap<(Collection, Uuid), Record>>,
}

impl MemoryAuthority {
    /// Creates an empty authority.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the authority holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Seeds a row directly, bypassing resolution. For tests and
    /// server-side provisioning.
    pub fn seed(&self, collection: Collection, record: Record) {
        self.rows.write().insert((collection, record.id), record);
    }

    fn check_organization(
        row: Option<&Record>,
        organization: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> AuthorityResult<()> {
        match row {
            Some(record) if record.organization_id != organization => {
                Err(AuthorityError::OrganizationMismatch { collection, id })
            }
            _ => Ok(()),
        }
    }
}

impl AuthoritativeStore for MemoryAuthority {
    fn get_for_update(
        &self,
        organization: Uuid,
        collection: Collection,
        id: Uuid,
    ) -> AuthorityResult<Option<Record>> {
        let rows = self.rows.read();
        let row = rows.get(&(collection, id));
        Self::check_organization(row, organization, collection, id)?;
        Ok(row.cloned())
    }

    fn upsert_if(
        &self,
        organization: Uuid,
        collection: Collection,
        record: Record,
        expected: &RowVersion,
    ) -> AuthorityResult<CasOutcome> {
        let mut rows = self.rows.write();
        let key = (collection, record.id);
        let current = rows.get(&key);
        Self::check_organization(current, organization, collection, record.id)?;

        if RowVersion::of(current) != *expected {
            return Ok(CasOutcome::Stale {
                current: current.cloned(),
            });
        }

        rows.insert(key, record);
        Ok(CasOutcome::Applied)
    }

    fn delete_if(
        &self,
        organization: Uuid,
        collection: Collection,
        id: Uuid,
        expected: &RowVersion,
    ) -> AuthorityResult<CasOutcome> {
        let mut rows = self.rows.write();
        let key = (collection, id);
        let current = rows.get(&key);
        Self::check_organization(current, organization, collection, id)?;

        if RowVersion::of(current) != *expected {
            return Ok(CasOutcome::Stale {
                current: current.cloned(),
            });
        }

        rows.remove(&key);
        Ok(CasOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_testkit::fixtures::stamp_at;

    fn stamp(physical: u64) -> Hlc {
        stamp_at(physical, "srv")
    }

    fn record(org: Uuid, physical: u64) -> Record {
        Record::new(Uuid::new_v4(), org).with_timestamp(stamp(physical))
    }

    #[test]
    fn cas_applies_when_version_matches() {
        let authority = MemoryAuthority::new();
        let org = Uuid::new_v4();
        let rec = record(org, 100);

        let outcome = authority
            .upsert_if(org, Collection::Assets, rec.clone(), &RowVersion::Absent)
            .unwrap();
        assert_eq!(outcome, CasOutcome::Applied);
        assert_eq!(
            authority
                .get_for_update(org, Collection::Assets, rec.id)
                .unwrap(),
            Some(rec)
        );
    }

    #[test]
    fn cas_reports_stale_on_version_mismatch() {
        let authority = MemoryAuthority::new();
        let org = Uuid::new_v4();
        let rec = record(org, 100);
        authority.seed(Collection::Assets, rec.clone());

        // A writer that read before the seed expects Absent.
        let newer = rec.clone().with_timestamp(stamp(200));
        let outcome = authority
            .upsert_if(org, Collection::Assets, newer, &RowVersion::Absent)
            .unwrap();
        assert_eq!(
            outcome,
            CasOutcome::Stale {
                current: Some(rec)
            }
        );
    }

    #[test]
    fn delete_of_absent_row_is_noop_applied() {
        let authority = MemoryAuthority::new();
        let outcome = authority
            .delete_if(
                Uuid::new_v4(),
                Collection::Assets,
                Uuid::new_v4(),
                &RowVersion::Absent,
            )
            .unwrap();
        assert_eq!(outcome, CasOutcome::Applied);
    }

    #[test]
    fn foreign_organization_row_is_rejected() {
        let authority = MemoryAuthority::new();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let rec = record(owner, 100);
        authority.seed(Collection::Assets, rec.clone());

        assert!(matches!(
            authority.get_for_update(intruder, Collection::Assets, rec.id),
            Err(AuthorityError::OrganizationMismatch { .. })
        ));
        assert!(matches!(
            authority.upsert_if(
                intruder,
                Collection::Assets,
                rec.clone(),
                &RowVersion::Absent
            ),
            Err(AuthorityError::OrganizationMismatch { .. })
        ));
        assert!(matches!(
            authority.delete_if(intruder, Collection::Assets, rec.id, &RowVersion::Absent),
            Err(AuthorityError::OrganizationMismatch { .. })
        ));
    }

    #[test]
    fn row_version_of_unstamped_row() {
        let rec = Record::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(RowVersion::of(Some(&rec)), RowVersion::Unstamped);
        assert_eq!(RowVersion::of(None), RowVersion::Absent);
    }
}
