//! The device-side sync coordinator.

use crate::config::{ConflictBehavior, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use fieldsync_clock::{HybridClock, NodeId};
use fieldsync_protocol::{
    Collection, PendingOperation, Record, RejectReason, SubmitRequest, SyncAction, SyncOutcome,
};
use fieldsync_store::LocalStore;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Counters for one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Another sync cycle was already running; nothing was done.
    pub skipped: bool,
    /// Operations submitted (an operation resubmitted after an error
    /// counts again).
    pub submitted: usize,
    /// Operations applied by the server and retired from the queue.
    pub applied: usize,
    /// Operations discarded as conflicts and retired from the queue.
    pub conflicts: usize,
    /// Operations permanently rejected as malformed and retired.
    pub malformed: usize,
    /// Operations that failed retryably and stay queued.
    pub failed: usize,
}

impl SyncReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Whether the cycle ran and left nothing behind retryably.
    #[must_use]
    pub fn clean(&self) -> bool {
        !self.skipped && self.failed == 0
    }
}

/// Cumulative counters across sync cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Completed (non-skipped) sync cycles.
    pub cycles: u64,
    /// Total operations submitted.
    pub submitted: u64,
    /// Total operations applied.
    pub applied: u64,
    /// Total conflicts.
    pub conflicts: u64,
    /// Total malformed rejections.
    pub malformed: u64,
    /// Total retryable failures.
    pub failed: u64,
}

impl SyncStats {
    fn absorb(&mut self, report: &SyncReport) {
        self.cycles += 1;
        self.submitted += report.submitted as u64;
        self.applied += report.applied as u64;
        self.conflicts += report.conflicts as u64;
        self.malformed += report.malformed as u64;
        self.failed += report.failed as u64;
    }
}

/// The sync coordinator owned by one device.
///
/// Mediates every mutation: stamps it with the device clock, applies
/// it optimistically to the local store, and either writes it through
/// to the merge service directly (online) or queues it durably for
/// the next connectivity event (offline). Mutations are never
/// rejected for lack of connectivity.
pub struct SyncCoordinator<S, T> {
    config: SyncConfig,
    node: NodeId,
    clock: Mutex<HybridClock>,
    store: Arc<S>,
    transport: Arc<T>,
    online: AtomicBool,
    syncing: AtomicBool,
    stats: RwLock<SyncStats>,
}

impl<S: LocalStore, T: SyncTransport> SyncCoordinator<S, T> {
    /// Creates a coordinator for a device. Starts online; the host
    /// application feeds connectivity changes via [`set_online`].
    ///
    /// [`set_online`]: SyncCoordinator::set_online
    pub fn new(config: SyncConfig, node: NodeId, store: Arc<S>, transport: Arc<T>) -> Self {
        Self {
            config,
            clock: Mutex::new(HybridClock::new(node.clone())),
            node,
            store,
            transport,
            online: AtomicBool::new(true),
            syncing: AtomicBool::new(false),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// The device identity driving the clock.
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// The local store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the device currently considers itself online.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Cumulative sync counters.
    pub fn stats(&self) -> SyncStats {
        *self.stats.read()
    }

    /// Applies a mutation locally and routes it to the server.
    ///
    /// The record is stamped with a fresh causal timestamp and the
    /// configured organization; a `Create` without an id gets a fresh
    /// one. The local store always reflects the mutation immediately.
    /// Online, the operation is written through directly and the
    /// authoritative copy returned; offline (or on transport
    /// failure) it is queued durably and the optimistic copy
    /// returned.
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidMutation`] when an update or delete names
    /// no record, [`SyncError::Rejected`] when the server permanently
    /// rejects a direct write, and store errors from the local apply.
    pub fn mutate(
        &self,
        collection: Collection,
        action: SyncAction,
        mut record: Record,
    ) -> SyncResult<Record> {
        if record.id.is_nil() {
            if action == SyncAction::Create {
                record.id = Uuid::new_v4();
            } else {
                return Err(SyncError::InvalidMutation(
                    "update and delete require a record id".into(),
                ));
            }
        }
        record.organization_id = self.config.organization_id;
        let stamp = self.clock.lock().generate();
        record.last_timestamp = Some(stamp.clone());
        let operation = PendingOperation::new(stamp, collection, action, record.clone());

        // Optimistic local apply, unconditional and without rollback.
        match action {
            SyncAction::Create | SyncAction::Update => {
                self.store.put(collection, record.clone())?;
            }
            SyncAction::Delete => self.store.delete(collection, record.id)?,
        }

        if self.is_online() && self.transport.is_reachable() {
            match self.direct_write(&operation) {
                Ok(current) => return Ok(current),
                Err(err @ SyncError::Rejected(_)) => return Err(err),
                Err(err) => {
                    debug!(operation = %operation.id, %err, "direct write failed, queueing");
                }
            }
        } else {
            debug!(operation = %operation.id, "offline, queueing");
        }

        self.store.enqueue(operation)?;
        Ok(record)
    }

    /// Submits one operation outside the queue.
    fn direct_write(&self, operation: &PendingOperation) -> SyncResult<Record> {
        let request = SubmitRequest::new(
            self.config.organization_id,
            self.node.clone(),
            vec![operation.clone()],
        );
        let response = self.transport.submit(&request, self.config.timeout)?;
        let outcome = response
            .outcome_for(operation.id)
            .cloned()
            .ok_or_else(|| {
                SyncError::Protocol("response missing outcome for submitted operation".into())
            })?;
        self.fold_clock(&outcome);

        if outcome.applied {
            if let Some(current) = outcome.current {
                if operation.action != SyncAction::Delete {
                    self.store.put(operation.collection, current.clone())?;
                }
                return Ok(current);
            }
            return Ok(operation.payload.clone());
        }

        match outcome.reason {
            Some(RejectReason::Conflict) => {
                info!(operation = %operation.id, "direct write lost to a newer record");
                if self.config.on_conflict == ConflictBehavior::AdoptServer {
                    if let Some(winner) = &outcome.current {
                        self.store.put(operation.collection, winner.clone())?;
                        return Ok(winner.clone());
                    }
                }
                Ok(operation.payload.clone())
            }
            Some(RejectReason::Malformed) => Err(SyncError::Rejected(
                outcome.message.unwrap_or_else(|| "malformed operation".into()),
            )),
            Some(RejectReason::Error) => Err(SyncError::transport_retryable(
                outcome.message.unwrap_or_else(|| "server error".into()),
            )),
            None => Err(SyncError::Protocol(
                "outcome neither applied nor carries a reason".into(),
            )),
        }
    }

    /// Drains the pending queue against the merge service.
    ///
    /// Re-entrant-safe: a second concurrent trigger returns a skipped
    /// report instead of queueing behind the running cycle. The queue
    /// is submitted in enqueue order; applied, conflicting, and
    /// malformed operations are retired, retryable failures stay
    /// queued for the next connectivity event. After a clean round
    /// the queue is re-checked so operations enqueued mid-sync are
    /// not stranded.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotConnected`] when the device is offline, plus
    /// local store failures. Transport failures do not error; the
    /// affected operations are counted as failed and stay queued.
    pub fn try_sync(&self) -> SyncResult<SyncReport> {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already in progress, skipping");
            return Ok(SyncReport::skipped());
        }

        let result = self.sync_cycle();
        self.syncing.store(false, Ordering::SeqCst);

        let report = result?;
        self.stats.write().absorb(&report);
        info!(
            applied = report.applied,
            conflicts = report.conflicts,
            malformed = report.malformed,
            failed = report.failed,
            "sync cycle finished"
        );
        Ok(report)
    }

    fn sync_cycle(&self) -> SyncResult<SyncReport> {
        if !self.is_online() || !self.transport.is_reachable() {
            return Err(SyncError::NotConnected);
        }

        let mut report = SyncReport::default();
        loop {
            let pending = self.store.list_pending()?;
            if pending.is_empty() {
                break;
            }

            let mut progressed = false;
            let mut stop = false;
            for chunk in pending.chunks(self.config.batch_limit) {
                let request = SubmitRequest::new(
                    self.config.organization_id,
                    self.node.clone(),
                    chunk.to_vec(),
                );
                report.submitted += chunk.len();

                let response = match self.transport.submit(&request, self.config.timeout) {
                    Ok(response) => response,
                    Err(err) => {
                        warn!(%err, operations = chunk.len(), "batch failed, stays queued");
                        report.failed += chunk.len();
                        stop = true;
                        break;
                    }
                };

                for operation in chunk {
                    match response.outcome_for(operation.id) {
                        Some(outcome) => {
                            if self.settle(operation, outcome, &mut report)? {
                                progressed = true;
                            } else {
                                stop = true;
                            }
                        }
                        None => {
                            warn!(operation = %operation.id, "response missing outcome");
                            report.failed += 1;
                            stop = true;
                        }
                    }
                }
                if stop {
                    break;
                }
            }

            if stop || !progressed {
                break;
            }
        }
        Ok(report)
    }

    /// Retires or re-queues one acknowledged operation. Returns true
    /// when the operation left the queue.
    fn settle(
        &self,
        operation: &PendingOperation,
        outcome: &SyncOutcome,
        report: &mut SyncReport,
    ) -> SyncResult<bool> {
        self.fold_clock(outcome);

        if outcome.applied {
            self.store.dequeue(operation.id)?;
            report.applied += 1;
            return Ok(true);
        }

        match outcome.reason {
            Some(RejectReason::Conflict) => {
                debug!(operation = %operation.id, "conflict, discarding queued write");
                if self.config.on_conflict == ConflictBehavior::AdoptServer {
                    if let Some(winner) = &outcome.current {
                        self.store.put(operation.collection, winner.clone())?;
                    }
                }
                self.store.dequeue(operation.id)?;
                report.conflicts += 1;
                Ok(true)
            }
            Some(RejectReason::Malformed) => {
                warn!(
                    operation = %operation.id,
                    message = outcome.message.as_deref().unwrap_or(""),
                    "operation permanently rejected"
                );
                self.store.dequeue(operation.id)?;
                report.malformed += 1;
                Ok(true)
            }
            Some(RejectReason::Error) | None => {
                report.failed += 1;
                Ok(false)
            }
        }
    }

    /// Folds a returned authoritative timestamp into the device
    /// clock, so later local stamps order after everything this
    /// device has observed.
    fn fold_clock(&self, outcome: &SyncOutcome) {
        if let Some(ts) = outcome
            .current
            .as_ref()
            .and_then(|record| record.last_timestamp.as_ref())
        {
            self.clock.lock().update(ts);
        }
    }

    /// Feeds a connectivity change. The offline-to-online transition
    /// triggers a sync cycle; its report is returned.
    pub fn set_online(&self, online: bool) -> SyncResult<Option<SyncReport>> {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            info!("device back online, draining queue");
            return self.try_sync().map(Some);
        }
        Ok(None)
    }
}
