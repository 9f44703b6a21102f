use std::{fmt, sync::Arc};

use stumpcast_core::{CommentaryStore, DownstreamPublisher};

use crate::broadcast::Broadcaster;
use crate::infra::config::Config;
use crate::infra::websocket::{ConnectionRegistry, CursorTracker};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CommentaryStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub cursors: Arc<CursorTracker>,
    pub broadcaster: Broadcaster,
    pub publisher: Arc<dyn DownstreamPublisher>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        store: Arc<dyn CommentaryStore>,
        publisher: Arc<dyn DownstreamPublisher>,
        config: Arc<Config>,
    ) -> Self {
        let cursors = Arc::new(CursorTracker::new());
        let registry = Arc::new(ConnectionRegistry::new(Arc::clone(&cursors)));
        let broadcaster = Broadcaster::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&cursors),
        );

        Self {
            store,
            registry,
            cursors,
            broadcaster,
            publisher,
            config,
        }
    }
}
