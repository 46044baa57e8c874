//! Application state.

use std::sync::Arc;

use ffgate_jobs::{Coordinator, UrlIntake};

use crate::config::GatewayConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub coordinator: Arc<Coordinator>,
    pub intake: Arc<UrlIntake>,
}

impl AppState {
    pub fn new(config: GatewayConfig, coordinator: Coordinator, intake: UrlIntake) -> Self {
        Self {
            config: Arc::new(config),
            coordinator: Arc::new(coordinator),
            intake: Arc::new(intake),
        }
    }
}
