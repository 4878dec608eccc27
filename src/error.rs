/// Error types shared across the form client
///
/// Store and config errors are ordinary `Result` errors. Submission failures
/// are not propagated anywhere: the orchestrator turns them into a terminal
/// attempt state and the UI renders their message.

use thiserror::Error;

use crate::state::schema::FieldName;

/// Errors raised by the blob and document store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("worker task failed: {0}")]
    Join(String),
}

/// Errors raised while loading the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Internal failure of the image compressor. Never leaves the imaging module;
/// the compressor falls back to the original file instead.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("worker task failed: {0}")]
    Join(String),
}

/// Why a submission attempt ended in the failed state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    #[error("required field {0} is empty")]
    MissingRequiredField(FieldName),

    #[error("image upload failed: {0}")]
    ImageUploadFailed(String),

    #[error("could not store submission: {0}")]
    PersistenceFailed(String),
}

impl SubmissionFailure {
    /// Text shown in the feedback modal. The cause is only logged.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmissionFailure::MissingRequiredField(_) => "Please fill all required fields",
            SubmissionFailure::ImageUploadFailed(_) => "Image upload failed. Please try again.",
            SubmissionFailure::PersistenceFailed(_) => "Error submitting form. Please try again.",
        }
    }
}

/// The selected file is not one of the accepted image types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported media type {media_type:?} for {filename}")]
pub struct InvalidMediaType {
    pub filename: String,
    pub media_type: String,
}

impl InvalidMediaType {
    /// Text shown in the blocking alert
    pub const ALERT: &'static str = "Please upload a valid image file (jpg/jpeg/png/heic)";
}
