//! Transport layer abstraction for batch submission.

use crate::error::{SyncError, SyncResult};
use fieldsync_protocol::{SubmitRequest, SubmitResponse, SyncOutcome};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A sync transport carries operation batches to the merge service.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process loopback, mock for testing). A
/// direct write is a one-operation batch through the same path.
pub trait SyncTransport: Send + Sync {
    /// Submits a batch and returns the per-operation outcomes.
    ///
    /// The timeout bounds the whole round trip; a batch that does not
    /// complete within it fails wholesale as a retryable error.
    fn submit(&self, request: &SubmitRequest, timeout: Duration) -> SyncResult<SubmitResponse>;

    /// Whether the merge service is currently reachable.
    fn is_reachable(&self) -> bool;
}

/// A mock transport for testing.
///
/// Records every submitted request and answers from a queue of
/// prepared responses. With the queue empty it acknowledges every
/// operation as applied.
#[derive(Default)]
pub struct MockTransport {
    reachable: AtomicBool,
    responses: Mutex<VecDeque<SyncResult<SubmitResponse>>>,
    requests: Mutex<Vec<SubmitRequest>>,
    timeouts: Mutex<Vec<Duration>>,
}

impl MockTransport {
    /// Creates a reachable mock transport.
    pub fn new() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            timeouts: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response for the next submission.
    pub fn push_response(&self, response: SubmitResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queues an error for the next submission.
    pub fn push_error(&self, error: SyncError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Sets the reachability switch.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Every request submitted so far.
    pub fn requests(&self) -> Vec<SubmitRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of submissions seen.
    pub fn submission_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Timeout carried by the most recent submission.
    pub fn last_timeout(&self) -> Option<Duration> {
        self.timeouts.lock().unwrap().last().copied()
    }
}

impl SyncTransport for MockTransport {
    fn submit(&self, request: &SubmitRequest, timeout: Duration) -> SyncResult<SubmitResponse> {
        if !self.is_reachable() {
            return Err(SyncError::NotConnected);
        }
        self.requests.lock().unwrap().push(request.clone());
        self.timeouts.lock().unwrap().push(timeout);

        if let Some(prepared) = self.responses.lock().unwrap().pop_front() {
            return prepared;
        }

        // Default behavior: acknowledge everything as applied.
        let outcomes = request
            .operations
            .iter()
            .map(|op| SyncOutcome::applied(op.id, None))
            .collect();
        Ok(SubmitResponse::new(outcomes))
    }

    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_clock::NodeId;
    use uuid::Uuid;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn empty_request() -> SubmitRequest {
        SubmitRequest::new(Uuid::new_v4(), NodeId::new("dev").unwrap(), vec![])
    }

    #[test]
    fn unreachable_transport_errors() {
        let transport = MockTransport::new();
        transport.set_reachable(false);
        assert!(!transport.is_reachable());
        assert!(matches!(
            transport.submit(&empty_request(), TIMEOUT),
            Err(SyncError::NotConnected)
        ));
        assert_eq!(transport.submission_count(), 0);
    }

    #[test]
    fn prepared_responses_are_served_in_order() {
        let transport = MockTransport::new();
        transport.push_error(SyncError::Timeout);
        transport.push_response(SubmitResponse::new(vec![]));

        assert!(matches!(
            transport.submit(&empty_request(), TIMEOUT),
            Err(SyncError::Timeout)
        ));
        assert!(transport.submit(&empty_request(), TIMEOUT).is_ok());
        assert_eq!(transport.submission_count(), 2);
        assert_eq!(transport.last_timeout(), Some(TIMEOUT));
    }
}
