use std::sync::Arc;

use reconciliation::ReconciliationEngine;

use crate::configs::GatewaySettings;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReconciliationEngine>,
    pub gateway: Arc<GatewaySettings>,
}

impl AppState {
    pub fn new(engine: Arc<ReconciliationEngine>, gateway: Arc<GatewaySettings>) -> Self {
        Self { engine, gateway }
    }
}
