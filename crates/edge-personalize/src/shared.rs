//! Process-wide decision client.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::client::DecisionService;

/// Decision client initialized at most once per process.
///
/// Concurrent first uses converge on a single instance; there is no
/// teardown.
///
/// ```ignore
/// static DECISIONS: SharedClient = SharedClient::new();
///
/// let service = DECISIONS.get_or_try_init(|| build_client(&config))?;
/// ```
pub struct SharedClient {
    cell: OnceCell<Arc<dyn DecisionService>>,
}

impl SharedClient {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The client, if it has been initialized.
    pub fn get(&self) -> Option<Arc<dyn DecisionService>> {
        self.cell.get().cloned()
    }

    /// Return the client, initializing it on first use.
    pub fn get_or_init<F>(&self, init: F) -> Arc<dyn DecisionService>
    where
        F: FnOnce() -> Arc<dyn DecisionService>,
    {
        self.cell.get_or_init(init).clone()
    }

    /// Fallible initialization. A failed attempt leaves the cell empty.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<Arc<dyn DecisionService>, E>
    where
        F: FnOnce() -> Result<Arc<dyn DecisionService>, E>,
    {
        self.cell.get_or_try_init(init).cloned()
    }
}

impl Default for SharedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EdgeApiClient;
    use edge_data::mock::MockTransport;
    use edge_data::FetchClient;
    use http::StatusCode;

    fn build() -> Arc<dyn DecisionService> {
        let fetch = FetchClient::new(MockTransport::status(StatusCode::OK));
        Arc::new(EdgeApiClient::new(fetch, None).unwrap())
    }

    #[test]
    fn test_initialized_once() {
        let shared = SharedClient::new();
        assert!(shared.get().is_none());

        let first = shared.get_or_init(build);
        let second = shared.get_or_init(|| panic!("initializer ran twice"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_init_retries() {
        let shared = SharedClient::new();
        let failed: Result<_, &str> = shared.get_or_try_init(|| Err("no config"));
        assert!(failed.is_err());
        assert!(shared.get().is_none());

        let ok: Result<_, &str> = shared.get_or_try_init(|| Ok(build()));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_concurrent_first_use_converges() {
        static SHARED: SharedClient = SharedClient::new();

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| SHARED.get_or_init(build)))
            .collect();
        let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
