use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::Detection, errors::DomainResult, model::ModelId};

#[async_trait]
pub trait DetectorPort: Send + Sync {
    /// Runs the model over one RGB image. Boxes come back in the image's own pixel space,
    /// in the order the model ranks them.
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>>;

    /// Fixed class-name table, indexed by `Detection::class_id`.
    fn labels(&self) -> &[String];
}

pub trait ImageDecoderPort: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> DomainResult<RgbImage>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
