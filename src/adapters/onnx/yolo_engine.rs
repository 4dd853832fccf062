use anyhow::{anyhow, ensure, Result};
use async_trait::async_trait;
use image::RgbImage;
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::{Tensor, Value};
use std::fs;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::adapters::onnx::classes::labels_from_metadata;
use crate::adapters::onnx::postprocess::decode_output;
use crate::adapters::onnx::preprocess::letterbox;
use crate::application::ports::DetectorPort;
use crate::domain::detection::Detection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::{InferenceConfig, YoloParams};

/// YOLO detector backed by one ONNX Runtime session, loaded once and shared.
pub struct OnnxYoloEngine {
    inner: Arc<EngineInner>,
    labels: Vec<String>,
}

struct EngineInner {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    params: YoloParams,
}

impl OnnxYoloEngine {
    pub fn load(config: &InferenceConfig) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA is optional: registered when available, CPU otherwise.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(&config.model.onnx_path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        let names = session
            .metadata()
            .and_then(|meta| meta.custom("names"))
            .ok()
            .flatten();
        let labels = labels_from_metadata(names.as_deref(), &config.model.name);

        info!(
            model = %config.model.name,
            classes = labels.len(),
            input_size = config.params.input_size,
            "YOLO model loaded"
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                session: Mutex::new(session),
                params: config.params.clone(),
            }),
            labels,
        })
    }
}

impl EngineInner {
    fn infer(&self, rgb: &RgbImage) -> Result<Vec<Detection>> {
        ensure!(rgb.width() > 0 && rgb.height() > 0, "empty image");

        let imgsz = self.params.input_size as usize;
        let lb = letterbox(rgb, self.params.input_size);

        let input_tensor: Value = Tensor::from_array((vec![1usize, 3, imgsz, imgsz], lb.tensor.into_boxed_slice()))
            .map(Value::from)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("session lock poisoned"))?;
        let outputs = session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        decode_output(&dims, data_out, &lb.geometry, &self.params)
    }
}

#[async_trait]
impl DetectorPort for OnnxYoloEngine {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || inner.infer(&image))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("inference task: {}", e)))?
            .map_err(|e| DomainError::Inference(format!("{:#}", e)))
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}
