pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::auth::IdentityVerifier;
use crate::processing::RiskProcessor;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<RiskProcessor>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(processor: Arc<RiskProcessor>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            processor,
            verifier,
        }
    }
}
