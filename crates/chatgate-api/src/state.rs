//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use chatgate_chat::MessageRouter;
use chatgate_core::config::ChatgateConfig;
use chatgate_dedup::SharedFilter;

/// Shared application state.
///
/// Cloned into every handler; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatgateConfig>,
    /// Same filter the router consults.
    pub filter: SharedFilter,
    pub router: Arc<MessageRouter>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ChatgateConfig, router: MessageRouter) -> Self {
        Self {
            config: Arc::new(config),
            filter: router.filter().clone(),
            router: Arc::new(router),
            start_time: Instant::now(),
        }
    }
}
