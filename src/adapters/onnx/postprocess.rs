use anyhow::{ensure, Result};
use ndarray::{s, ArrayView2, ArrayViewD, Axis, Ix2, IxDyn};

use crate::adapters::onnx::preprocess::LetterboxGeometry;
use crate::domain::detection::Detection;
use crate::domain::model::YoloParams;

/// Candidates considered by NMS, after the confidence filter.
const MAX_NMS_CANDIDATES: usize = 30_000;

/// Validates the raw output tensor (`[1, 4 + nc, N]`, row-major) and decodes it.
pub fn decode_output(
    dims: &[usize],
    data: &[f32],
    geometry: &LetterboxGeometry,
    params: &YoloParams,
) -> Result<Vec<Detection>> {
    ensure!(
        dims.len() == 3 && dims[0] == 1,
        "unexpected output shape {:?}, expected [1, 4+nc, N]",
        dims
    );
    ensure!(dims[1] > 4, "output has {} rows, no class scores", dims[1]);

    let array_view = ArrayViewD::from_shape(IxDyn(dims), data)?;
    let view = array_view.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?;
    Ok(decode_predictions(view, geometry, params))
}

/// Turns a YOLOv8 head output `[4 + nc, N]` (rows: cx, cy, w, h, class scores)
/// into detections in original-image coordinates, best score first.
pub fn decode_predictions(
    view: ArrayView2<f32>,
    geometry: &LetterboxGeometry,
    params: &YoloParams,
) -> Vec<Detection> {
    if view.nrows() <= 4 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for i in 0..view.ncols() {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if !(score > params.conf_threshold) {
            continue;
        }

        let cx = view[[0, i]];
        let cy = view[[1, i]];
        let w = view[[2, i]];
        let h = view[[3, i]];

        candidates.push(Detection {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            score,
            class_id,
        });
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(MAX_NMS_CANDIDATES);

    let mut kept = non_maximum_suppression(candidates, params.iou_threshold);
    kept.truncate(params.max_detections);

    for det in &mut kept {
        det.x1 = geometry.unmap_x(det.x1);
        det.y1 = geometry.unmap_y(det.y1);
        det.x2 = geometry.unmap_x(det.x2);
        det.y2 = geometry.unmap_y(det.y2);
    }
    kept
}

/// Greedy class-aware NMS. Input must be sorted by descending score; output keeps that order.
pub fn non_maximum_suppression(detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    let mut suppressed = vec![false; detections.len()];
    let mut keep = Vec::new();

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[i].class_id != detections[j].class_id {
                continue;
            }
            if detections[i].iou(&detections[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
        keep.push(detections[i].clone());
    }

    keep
}
