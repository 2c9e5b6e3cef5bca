//! Batch resolution against the authoritative store.

use crate::authority::{AuthoritativeStore, AuthorityError, CasOutcome, RowVersion};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use fieldsync_protocol::{
    MalformedOperation, PendingOperation, Record, SubmitRequest, SubmitResponse, SyncAction,
    SyncOutcome,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Resolves submitted operation batches with last-writer-wins
/// semantics.
///
/// One operation never decides the fate of its neighbours: each is
/// validated, compared, and applied independently, and its outcome
/// reported in request order. The whole batch fails only when the
/// request itself is unacceptable (over the size limit).
pub struct MergeService<A> {
    config: ServerConfig,
    authority: A,
}

impl<A: AuthoritativeStore> MergeService<A> {
    /// Creates a merge service over an authoritative store.
    pub fn new(config: ServerConfig, authority: A) -> Self {
        Self { config, authority }
    }

    /// Read access to the underlying store.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Resolves a batch, producing one outcome per operation.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] when the batch exceeds
    /// the configured size limit. Per-operation failures never
    /// surface here; they become `Error` outcomes.
    pub fn submit(&self, request: &SubmitRequest) -> ServerResult<SubmitResponse> {
        if request.len() > self.config.max_batch {
            return Err(ServerError::InvalidRequest(format!(
                "batch of {} operations exceeds limit of {}",
                request.len(),
                self.config.max_batch
            )));
        }

        debug!(
            organization = %request.organization_id,
            node = %request.node_id,
            operations = request.len(),
            "resolving batch"
        );

        let outcomes = request
            .operations
            .iter()
            .map(|wire| {
                let operation_id = wire.id;
                match wire.clone().into_pending() {
                    Ok(op) => self.resolve(request.organization_id, &op),
                    Err(reject) => {
                        warn!(operation = %operation_id, %reject, "malformed operation");
                        SyncOutcome::malformed(operation_id, reject.to_string())
                    }
                }
            })
            .collect();

        Ok(SubmitResponse::new(outcomes))
    }

    /// Resolves a single validated operation.
    ///
    /// The stored row is read, compared, and conditionally written.
    /// A stale conditional write means another submission landed
    /// between the read and the write; the loop re-reads and
    /// re-compares, and terminates because every stale round implies
    /// someone else made progress on the row.
    fn resolve(&self, organization: Uuid, op: &PendingOperation) -> SyncOutcome {
        loop {
            let current = match self
                .authority
                .get_for_update(organization, op.collection, op.record_id())
            {
                Ok(current) => current,
                Err(err) => return self.authority_outcome(op, err),
            };

            if let Some(stored) = &current {
                // Unstamped rows were seeded outside the sync path and
                // always lose to a stamped write.
                if let Some(stored_ts) = &stored.last_timestamp {
                    if op.timestamp <= *stored_ts {
                        debug!(
                            operation = %op.id,
                            incoming = %op.timestamp,
                            stored = %stored_ts,
                            "discarding stale write"
                        );
                        return SyncOutcome::conflict(op.id, current);
                    }
                }
            }

            let expected = RowVersion::of(current.as_ref());
            let raced: Option<Record> = match op.action {
                SyncAction::Create | SyncAction::Update => {
                    let stored = self.stamp(organization, op);
                    match self.authority.upsert_if(
                        organization,
                        op.collection,
                        stored.clone(),
                        &expected,
                    ) {
                        Ok(CasOutcome::Applied) => {
                            return SyncOutcome::applied(op.id, Some(stored))
                        }
                        Ok(CasOutcome::Stale { current }) => current,
                        Err(err) => return self.authority_outcome(op, err),
                    }
                }
                SyncAction::Delete => {
                    match self
                        .authority
                        .delete_if(organization, op.collection, op.record_id(), &expected)
                    {
                        Ok(CasOutcome::Applied) => return SyncOutcome::applied(op.id, None),
                        Ok(CasOutcome::Stale { current }) => current,
                        Err(err) => return self.authority_outcome(op, err),
                    }
                }
            };

            debug!(operation = %op.id, "conditional write raced, re-reading");
            // Fast path: if the racing writer already carries a
            // winning timestamp, report the conflict without another
            // read.
            if let Some(stored) = &raced {
                if let Some(stored_ts) = &stored.last_timestamp {
                    if op.timestamp <= *stored_ts {
                        return SyncOutcome::conflict(op.id, raced);
                    }
                }
            }
        }
    }

    /// The record as it will be stored: the submitted payload with
    /// the tenant and causal timestamp stamped server-side. Client
    /// copies of either field are never trusted.
    fn stamp(&self, organization: Uuid, op: &PendingOperation) -> Record {
        let mut stored = op.payload.clone();
        stored.organization_id = organization;
        stored.last_timestamp = Some(op.timestamp.clone());
        stored
    }

    fn authority_outcome(&self, op: &PendingOperation, err: AuthorityError) -> SyncOutcome {
        match err {
            AuthorityError::OrganizationMismatch { .. } => {
                warn!(operation = %op.id, "cross-organization write rejected");
                let reject = MalformedOperation::OrganizationMismatch {
                    operation_id: op.id,
                };
                SyncOutcome::malformed(op.id, reject.to_string())
            }
            AuthorityError::Backend(message) => {
                warn!(operation = %op.id, %message, "backend failure, operation stays queued");
                SyncOutcome::error(op.id, message)
            }
        }
    }
}
