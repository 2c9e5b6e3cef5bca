//! JSON transport over a pluggable HTTP client.
//!
//! The actual HTTP client is abstracted via a trait so different
//! libraries (reqwest, ureq, a platform webview bridge) can carry the
//! same JSON bodies. A loopback client routes requests straight into
//! an in-process merge server for tests.

use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use fieldsync_protocol::{SubmitRequest, SubmitResponse};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Path operation batches are posted to.
pub const SUBMIT_PATH: &str = "/sync/submit";

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual transport. The client
/// must abort a request once the given timeout elapses and report it
/// as an `Err`, which fails the batch wholesale.
pub trait HttpClient: Send + Sync {
    /// Sends a POST with a JSON body and returns the response body.
    fn post(&self, url: &str, body: &str, timeout: Duration) -> Result<String, String>;

    /// Checks if the client is connected/healthy.
    fn is_healthy(&self) -> bool;
}

/// HTTP-based sync transport with JSON bodies.
pub struct JsonTransport<C: HttpClient> {
    /// Base URL of the merge service.
    base_url: String,
    client: C,
    connected: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> JsonTransport<C> {
    /// Creates a transport posting to the given base URL.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            connected: AtomicBool::new(true),
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the last transport error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().unwrap().clone()
    }

    fn set_error(&self, err: &str) {
        *self.last_error.write().unwrap() = Some(err.to_string());
    }

    fn clear_error(&self) {
        *self.last_error.write().unwrap() = None;
    }
}

impl<C: HttpClient> SyncTransport for JsonTransport<C> {
    fn submit(&self, request: &SubmitRequest, timeout: Duration) -> SyncResult<SubmitResponse> {
        if !self.is_reachable() {
            return Err(SyncError::NotConnected);
        }

        let body = serde_json::to_string(request)
            .map_err(|e| SyncError::Protocol(format!("failed to encode request: {e}")))?;

        let url = format!("{}{}", self.base_url, SUBMIT_PATH);
        let response_body = self.client.post(&url, &body, timeout).map_err(|e| {
            self.set_error(&e);
            self.connected.store(false, Ordering::SeqCst);
            SyncError::transport_retryable(e)
        })?;

        self.clear_error();
        self.connected.store(true, Ordering::SeqCst);

        serde_json::from_str(&response_body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode response: {e}")))
    }

    fn is_reachable(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && self.client.is_healthy()
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a POST request and returns the response body.
    fn handle_post(&self, path: &str, body: &str) -> Result<String, String>;
}

/// A loopback HTTP client that routes requests directly to a merge
/// server, without network overhead. Useful for testing.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a loopback client over the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn post(&self, url: &str, body: &str, _timeout: Duration) -> Result<String, String> {
        let path = url.find("/sync/").map(|i| &url[i..]).unwrap_or(url);
        self.server.handle_post(path, body)
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
