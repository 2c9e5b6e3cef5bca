//! Submit messages exchanged between coordinator and merge service.

use crate::operation::{PendingOperation, WireOperation};
use crate::outcome::SyncOutcome;
use fieldsync_clock::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A batch of operations submitted by one device.
///
/// Operations are ordered: the coordinator submits them in enqueue
/// order, and the merge service evaluates them in that order, so two
/// operations from the same device targeting the same record are
/// observed in causal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Organization the submitting device belongs to. Every
    /// resolution is scoped to this tenant boundary.
    #[serde(rename = "organizationId")]
    pub organization_id: Uuid,
    /// Identity of the submitting device.
    #[serde(rename = "nodeId")]
    pub node_id: NodeId,
    /// Operations in enqueue order, in untrusted wire form.
    pub operations: Vec<WireOperation>,
}

impl SubmitRequest {
    /// Builds a request from typed pending operations.
    #[must_use]
    pub fn new(organization_id: Uuid, node_id: NodeId, operations: Vec<PendingOperation>) -> Self {
        Self {
            organization_id,
            node_id,
            operations: operations.into_iter().map(WireOperation::from).collect(),
        }
    }

    /// Number of operations in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Ordered per-operation outcomes for a submitted batch.
///
/// Same length and order as the request, correlated by operation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// One outcome per submitted operation, in request order.
    pub outcomes: Vec<SyncOutcome>,
}

impl SubmitResponse {
    /// Wraps outcomes into a response.
    #[must_use]
    pub fn new(outcomes: Vec<SyncOutcome>) -> Self {
        Self { outcomes }
    }

    /// Finds the outcome for a given operation id.
    #[must_use]
    pub fn outcome_for(&self, operation_id: Uuid) -> Option<&SyncOutcome> {
        self.outcomes.iter().find(|o| o.operation_id == operation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::operation::SyncAction;
    use crate::record::Record;
    use fieldsync_clock::Hlc;

    fn make_op(counter: u16) -> PendingOperation {
        let node = NodeId::new("dev").unwrap();
        PendingOperation::new(
            Hlc::new(1000, counter, node),
            Collection::Assets,
            SyncAction::Update,
            Record::new(Uuid::new_v4(), Uuid::new_v4()),
        )
    }

    #[test]
    fn request_preserves_order() {
        let ops = vec![make_op(0), make_op(1), make_op(2)];
        let ids: Vec<Uuid> = ops.iter().map(|op| op.id).collect();
        let request = SubmitRequest::new(Uuid::new_v4(), NodeId::new("dev").unwrap(), ops);
        let wire_ids: Vec<Uuid> = request.operations.iter().map(|op| op.id).collect();
        assert_eq!(wire_ids, ids);
    }

    #[test]
    fn response_lookup_by_operation_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let response = SubmitResponse::new(vec![
            SyncOutcome::applied(a, None),
            SyncOutcome::error(b, "boom"),
        ]);
        assert!(response.outcome_for(a).unwrap().applied);
        assert!(!response.outcome_for(b).unwrap().applied);
        assert!(response.outcome_for(Uuid::new_v4()).is_none());
    }

    #[test]
    fn request_roundtrip() {
        let request = SubmitRequest::new(
            Uuid::new_v4(),
            NodeId::new("dev").unwrap(),
            vec![make_op(0)],
        );
        let json = serde_json::to_string(&request).unwrap();
        let back: SubmitRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
