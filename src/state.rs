use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::store::KeyValueStore;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub store: Arc<dyn KeyValueStore>,
    /// Read the client address from proxy headers instead of the socket peer.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        store: Arc<dyn KeyValueStore>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            store,
            behind_proxy,
        }
    }
}
