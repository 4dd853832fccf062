pub mod classes;
pub mod model_catalog;
pub mod postprocess;
pub mod preprocess;
pub mod yolo_engine;
