//! # Zenpic Core
//!
//! Core logic for the Zenpic media library.
//!
//! This crate contains pure storage, retrieval and transform operations:
//! - Collection and entry listings under a storage root
//! - Raw file retrieval, with optional fit-inside image resizing
//! - Single- and multi-file upload ingestion
//! - Weather condition to collection mapping
//!
//! **No API concerns**: HTTP routing, logging and response shaping belong in `api-rest`.
//! Core functions never log; they return typed results and errors for the caller to report.
//!
//! All operations are synchronous filesystem code. Async callers should run them on a
//! blocking thread.

pub mod collections;
pub mod conditions;
pub mod config;
pub mod constants;
pub mod error;
pub mod upload;

pub use collections::ConditionListing;
pub use conditions::WeatherCondition;
pub use config::{CoreConfig, Library};
pub use error::{CoreError, CoreResult, UploadError};
pub use upload::{UploadFailure, UploadPayload, UploadSummary, UploadedFile};
pub use zenpic_files::{Entry, EntryKind};
pub use zenpic_imaging::ResizeSpec;

use constants::FALLBACK_MEDIA_TYPE;
use std::path::Path;
use zenpic_files::{detect_media_type, FilesService};

/// Bytes returned by a fetch, with the media type to report for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Operations on one media library (one storage root).
#[derive(Debug, Clone)]
pub struct LibraryService {
    files: FilesService,
}

impl LibraryService {
    /// Creates a service rooted at `storage_root`.
    pub fn new(storage_root: &Path) -> Self {
        Self {
            files: FilesService::new(storage_root),
        }
    }

    /// Creates a service for one of the configured libraries.
    pub fn for_library(cfg: &CoreConfig, library: Library) -> Self {
        Self::new(cfg.root(library))
    }

    pub fn storage_root(&self) -> &Path {
        self.files.root_directory()
    }

    pub fn list_collections(&self) -> CoreResult<Vec<Entry>> {
        collections::list_collections(&self.files)
    }

    pub fn list_entries(&self, collection: &str) -> CoreResult<Vec<Entry>> {
        collections::list_entries(&self.files, collection)
    }

    pub fn list_by_condition(&self, condition: Option<&str>) -> CoreResult<ConditionListing> {
        collections::list_by_condition(&self.files, condition)
    }

    /// Fetches a file, resizing it when both `width` and `height` are given.
    ///
    /// Dimensions are validated before the file is read.
    ///
    /// # Errors
    ///
    /// Returns a `CoreError` if:
    /// - an identifier is unsafe (`InvalidPath`)
    /// - the dimensions are malformed or only one is given (`InvalidDimensions`)
    /// - the file does not exist (`NotFound`)
    /// - a resize was requested and the file is not a decodable image (`Transform`)
    pub fn fetch(
        &self,
        collection: &str,
        file: &str,
        width: Option<&str>,
        height: Option<&str>,
    ) -> CoreResult<FetchedFile> {
        let spec = ResizeSpec::parse(width, height)?;
        let bytes = self.files.read(collection, file)?;

        match spec {
            None => {
                let media_type = detect_media_type(&bytes)
                    .unwrap_or(FALLBACK_MEDIA_TYPE)
                    .to_string();
                Ok(FetchedFile { bytes, media_type })
            }
            Some(spec) => {
                let resized = zenpic_imaging::resize(&bytes, spec)?;
                Ok(FetchedFile {
                    bytes: resized.bytes,
                    media_type: resized.media_type.to_string(),
                })
            }
        }
    }

    /// Stores the uploaded files in `collection`; see [`upload::ingest`].
    pub fn upload(
        &self,
        collection: &str,
        payload: Option<UploadPayload>,
    ) -> CoreResult<Vec<UploadSummary>> {
        upload::ingest(&self.files, collection, payload)
    }
}
