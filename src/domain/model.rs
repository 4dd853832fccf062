use std::path::Path;

/// Weights file plus the name it is logged under.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelId {
    pub name: String,
    pub onnx_path: String,
}

impl ModelId {
    /// Name is the file stem of `path` ("models/yolov8n.onnx" -> "yolov8n").
    pub fn from_path(path: &str) -> Self {
        let name = Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "yolo".to_string());
        Self { name, onnx_path: path.to_string() }
    }
}

/// Detector knobs. Defaults are the ones the pretrained checkpoints are
/// evaluated with.
#[derive(Debug, Clone, PartialEq)]
pub struct YoloParams {
    /// Side of the square model input, in pixels.
    pub input_size: u32,
    pub conf_threshold: f32,
    /// NMS overlap above which the lower-scored box of a class is dropped.
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl YoloParams {
    pub const MIN_INPUT_SIZE: u32 = 32;
    pub const MAX_INPUT_SIZE: u32 = 4096;

    pub fn accepts_input_size(side: u32) -> bool {
        (Self::MIN_INPUT_SIZE..=Self::MAX_INPUT_SIZE).contains(&side)
    }
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub model: ModelId,
    pub params: YoloParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_is_file_stem() {
        let id = ModelId::from_path("models/yolov8n.onnx");
        assert_eq!(id.name, "yolov8n");
        assert_eq!(id.onnx_path, "models/yolov8n.onnx");
    }

    #[test]
    fn default_params() {
        let p = YoloParams::default();
        assert_eq!(p.input_size, 640);
        assert!((p.conf_threshold - 0.25).abs() < 1e-6);
        assert!((p.iou_threshold - 0.7).abs() < 1e-6);
        assert_eq!(p.max_detections, 300);
        assert!(YoloParams::accepts_input_size(p.input_size));
    }

    #[test]
    fn input_size_bounds() {
        assert!(!YoloParams::accepts_input_size(0));
        assert!(!YoloParams::accepts_input_size(16));
        assert!(YoloParams::accepts_input_size(32));
        assert!(YoloParams::accepts_input_size(4096));
        assert!(!YoloParams::accepts_input_size(65_536));
    }
}
