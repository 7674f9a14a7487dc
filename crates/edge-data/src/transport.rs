//! Outbound HTTP transport seam.

use async_trait::async_trait;
use edge_core::{RequestContext, ResponseContext};

use crate::client::FetchError;

/// Sends a request and returns the raw response.
///
/// Implementations never follow redirects themselves; [`crate::FetchClient`]
/// does that when the request's redirect mode allows it. Futures are not
/// `Send` because the Spin host's are not.
#[async_trait(?Send)]
pub trait HttpTransport: Send + Sync {
    /// Send a request.
    async fn send(&self, request: RequestContext) -> Result<ResponseContext, FetchError>;
}
