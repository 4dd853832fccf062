use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

/// Startup check on the weights file, run before any session is built so a
/// bad path fails with a readable error instead of an ONNX Runtime one.
#[derive(Debug, Default)]
pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        let raw = model.onnx_path.trim();
        if raw.is_empty() {
            return Err(DomainError::InvalidInput(format!("model '{}' has no weights path", model.name)));
        }

        let path = Path::new(raw);
        let meta = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DomainError::NotFound(format!("weights {} do not exist", raw)),
            _ => DomainError::OperationFailed(format!("cannot stat {}: {}", raw, e)),
        })?;

        if !meta.is_file() {
            return Err(DomainError::InvalidInput(format!("weights {} is not a regular file", raw)));
        }
        if path.extension().map_or(true, |ext| ext != "onnx") {
            warn!(path = raw, "weights file lacks the .onnx extension");
        }

        debug!(model = %model.name, bytes = meta.len(), "weights file found");
        Ok(())
    }
}
