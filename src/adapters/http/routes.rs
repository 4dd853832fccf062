use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::DetectResponse;
use crate::domain::errors::DomainError;

pub const IMAGE_FIELD: &str = "image";

/// `POST /detect`: multipart upload with an `image` field.
pub async fn detect(
    State(st): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let mut multipart = multipart?;

    let mut image_bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            image_bytes = Some(field.bytes().await?.to_vec());
            break;
        }
    }

    let bytes = image_bytes
        .ok_or_else(|| DomainError::InvalidInput(format!("missing '{}' field", IMAGE_FIELD)))?;

    Ok(Json(st.detection.detect(bytes).await?))
}
