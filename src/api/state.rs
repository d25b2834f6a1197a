use std::sync::Arc;

use crate::services::RecommendationService;

/// Shared application state
///
/// The pipeline is stateless; the state only carries the wired-up service so
/// handlers can reach the providers.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
        }
    }
}
