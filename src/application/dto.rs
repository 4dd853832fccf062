use serde::Serialize;

use crate::domain::detection::Detection;

/// Wire form of one detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    pub label: String,
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: [i32; 4],
}

impl DetectionRecord {
    pub fn from_detection(det: &Detection, labels: &[String]) -> Self {
        Self {
            label: label_for(det.class_id, labels),
            confidence: round_confidence(det.score),
            // `as` truncates toward zero
            bbox: [det.x1 as i32, det.y1 as i32, det.x2 as i32, det.y2 as i32],
        }
    }
}

pub fn label_for(class_id: usize, labels: &[String]) -> String {
    labels
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

/// Clamps to [0, 1] and rounds to two decimals, ties to even.
pub fn round_confidence(score: f32) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    let c = (score as f64).clamp(0.0, 1.0);
    (c * 100.0).round_ties_even() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectResponse {
    pub detections: Vec<DetectionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
