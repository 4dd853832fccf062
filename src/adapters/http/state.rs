use std::sync::Arc;
use crate::application::services::DetectionService;

/// Shared state for the axum handlers: the use cases, built once at startup.
#[derive(Clone)]
pub struct HttpState {
    pub detection: Arc<DetectionService>,
}
