use crate::upload::{UploadFailure, UploadSummary};
use zenpic_files::FilesError;
use zenpic_imaging::ImagingError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("query parameter condition required")]
    MissingCondition,
    #[error("query condition '{0}' does not exist")]
    InvalidCondition(String),
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("failed to transform image: {0}")]
    Transform(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file uploaded")]
    NoFiles,
    /// Some files could not be written. Files listed in `stored` remain on disk.
    #[error("{} of {} files failed to upload", .failed.len(), .stored.len() + .failed.len())]
    Partial {
        stored: Vec<UploadSummary>,
        failed: Vec<UploadFailure>,
    },
}

impl From<FilesError> for CoreError {
    fn from(err: FilesError) -> Self {
        match err {
            FilesError::NotFound(msg) => CoreError::NotFound(msg),
            FilesError::InvalidPath(msg) => CoreError::InvalidPath(msg),
            FilesError::Io(e) => CoreError::Internal(e.to_string()),
        }
    }
}

impl From<ImagingError> for CoreError {
    fn from(err: ImagingError) -> Self {
        match err {
            ImagingError::InvalidDimensions(msg) => CoreError::InvalidDimensions(msg),
            ImagingError::Decode(e) => CoreError::Transform(e.to_string()),
            ImagingError::Encode(e) => CoreError::Internal(e.to_string()),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
