//! JSON front door over the merge service.

use crate::authority::{AuthoritativeStore, MemoryAuthority};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::merge::MergeService;
use fieldsync_protocol::{SubmitRequest, SubmitResponse};

/// Path the coordinator posts operation batches to.
pub const SUBMIT_PATH: &str = "/sync/submit";

/// The merge server.
///
/// Speaks JSON over a transport-agnostic post interface so an HTTP
/// framework, a unix socket, or an in-process loopback can all front
/// the same resolution logic.
///
/// # Example
///
/// ```
/// use fieldsync_server::{MergeServer, ServerConfig};
///
/// let server = MergeServer::in_memory(ServerConfig::default());
/// // In a real deployment an HTTP route for POST /sync/submit
/// // forwards the request body to server.handle_post().
/// ```
pub struct MergeServer<A> {
    service: MergeService<A>,
}

impl MergeServer<MemoryAuthority> {
    /// Creates a merge server over an in-process authority.
    #[must_use]
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(config, MemoryAuthority::new())
    }
}

impl<A: AuthoritativeStore> MergeServer<A> {
    /// Creates a merge server over a given authoritative store.
    pub fn new(config: ServerConfig, authority: A) -> Self {
        Self {
            service: MergeService::new(config, authority),
        }
    }

    /// Read access to the underlying authority.
    pub fn authority(&self) -> &A {
        self.service.authority()
    }

    /// Resolves a typed submit request.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] for oversized batches.
    pub fn handle_submit(&self, request: &SubmitRequest) -> ServerResult<SubmitResponse> {
        self.service.submit(request)
    }

    /// Handles a posted JSON body for a given path.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidRequest`] for unknown paths and
    /// oversized batches, and [`ServerError::Codec`] for bodies that
    /// do not parse as a submit request.
    pub fn handle_post(&self, path: &str, body: &str) -> ServerResult<String> {
        if path != SUBMIT_PATH {
            return Err(ServerError::InvalidRequest(format!(
                "unknown path: {path}"
            )));
        }

        let request: SubmitRequest = serde_json::from_str(body)?;
        let response = self.handle_submit(&request)?;
        Ok(serde_json::to_string(&response)?)
    }
}
