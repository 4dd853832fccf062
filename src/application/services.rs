use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::{
    application::{
        dto::{DetectResponse, DetectionRecord},
        ports::{DetectorPort, ImageDecoderPort},
    },
    domain::{
        detection::summarize_detections,
        errors::{DomainError, DomainResult},
    },
};

/// Use case behind `POST /detect`: bytes in, detection records out.
/// Stateless once constructed; the detector is shared by every request.
#[derive(Clone)]
pub struct DetectionService {
    decoder: Arc<dyn ImageDecoderPort>,
    detector: Arc<dyn DetectorPort>,
}

impl DetectionService {
    pub fn new(decoder: Arc<dyn ImageDecoderPort>, detector: Arc<dyn DetectorPort>) -> Self {
        Self { decoder, detector }
    }

    pub async fn detect(&self, bytes: Vec<u8>) -> DomainResult<DetectResponse> {
        let decoder = self.decoder.clone();
        let image = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("decode task: {}", e)))??;

        debug!(width = image.width(), height = image.height(), "image decoded");

        let t_infer_start = Instant::now();
        let detections = self.detector.detect(image).await?;
        let infer_ms = t_infer_start.elapsed().as_secs_f32() * 1000.0;

        let labels = self.detector.labels();
        let records: Vec<DetectionRecord> = detections
            .iter()
            .map(|det| DetectionRecord::from_detection(det, labels))
            .collect();

        info!(
            count = records.len(),
            infer_ms,
            "detected: {}",
            summarize_detections(records.iter().map(|r| r.label.as_str()))
        );

        Ok(DetectResponse { detections: records })
    }
}
