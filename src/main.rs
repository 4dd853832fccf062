mod adapters;
mod application;
mod config;
mod domain;

use std::sync::Arc;
use crate::adapters::{
    http::{router, state::HttpState},
    imaging::decoder::ImageCodecDecoder,
    onnx::{model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
};
use crate::application::{ports::ModelCatalogPort, services::DetectionService};
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG=info by default
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let model = &config.inference.model;

    tracing::info!("Loading model {} from {}", model.name, model.onnx_path);
    OnnxModelCatalog::new().validate_model(model).await?;

    // Loaded once, shared read-only by every request.
    let engine = Arc::new(OnnxYoloEngine::load(&config.inference)?);
    let decoder = Arc::new(ImageCodecDecoder::new());
    let detection = Arc::new(DetectionService::new(decoder, engine));

    let app = router(HttpState { detection }, config.max_upload_bytes);

    let addr = config.bind_addr();
    tracing::info!("Detection server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
