//! Process configuration, read once at startup.

use std::str::FromStr;

use crate::domain::model::{InferenceConfig, ModelId, YoloParams};

/// Weights loaded at startup. Fixed: not a request parameter nor an env var.
pub const MODEL_PATH: &str = "models/yolov8n.onnx";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Max request body size in bytes
    pub max_upload_bytes: usize,
    /// Detector settings
    pub inference: InferenceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 20 * 1024 * 1024, // 20MB
            inference: InferenceConfig {
                model: ModelId::from_path(MODEL_PATH),
                params: YoloParams::default(),
            },
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let params = defaults.inference.params.clone();

        Self {
            host: lookup("DETECT_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "DETECT_PORT").unwrap_or(defaults.port),
            max_upload_bytes: parse_var(&lookup, "DETECT_MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            inference: InferenceConfig {
                model: defaults.inference.model,
                params: YoloParams {
                    input_size: parse_var::<u32, _>(&lookup, "DETECT_INPUT_SIZE")
                        .filter(|&side| YoloParams::accepts_input_size(side))
                        .unwrap_or(params.input_size),
                    conf_threshold: parse_var(&lookup, "DETECT_CONF_THRESHOLD").unwrap_or(params.conf_threshold),
                    iou_threshold: parse_var(&lookup, "DETECT_IOU_THRESHOLD").unwrap_or(params.iou_threshold),
                    max_detections: parse_var(&lookup, "DETECT_MAX_DETECTIONS").unwrap_or(params.max_detections),
                },
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
