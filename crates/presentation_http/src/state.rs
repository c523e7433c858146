//! Application state shared across handlers

use std::sync::Arc;

use application::DispatchService;
use infrastructure::AppConfig;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handles every inbound webhook message
    pub dispatch_service: Arc<DispatchService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}
