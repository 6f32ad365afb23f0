pub mod handlers;
pub mod routes;
pub mod ui;

pub use routes::*;

use crate::serving::PredictionService;
use std::sync::Arc;

/// Shared application state
///
/// The prediction service is immutable after startup; cloning the state
/// only bumps the Arc.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self { service }
    }
}
