use thiserror::Error;

/// Failures surfaced by the ports. The HTTP layer turns all of them into a
/// server error; the variant only shapes the message.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A configured resource (weights file) is absent.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The request or configuration is unusable as given.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Upload bytes are not an image the codecs can read.
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    /// Runtime plumbing, e.g. a blocking task that panicked.
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl From<image::ImageError> for DomainError {
    fn from(e: image::ImageError) -> Self {
        DomainError::Decode(e.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
