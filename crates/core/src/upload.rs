//! Upload ingestion.
//!
//! Clients may send one file or several. The boundary wraps whatever it received in an
//! [`UploadPayload`]; ingestion flattens it into a plain list first and never looks at
//! the shape again.
//!
//! Identifiers are validated for the whole request before anything touches the disk. After
//! that every file is attempted independently; failures are collected and reported together
//! with the files that did land. There is no rollback.

use crate::constants::FALLBACK_MEDIA_TYPE;
use crate::error::UploadError;
use crate::{CoreError, CoreResult};
use zenpic_files::{detect_media_type, FilesService};

/// A file received from a client, alive only for the duration of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mimetype: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mimetype: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mimetype: mimetype.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The client-declared media type, or one sniffed from the payload when none was sent.
    fn effective_mimetype(&self) -> String {
        let declared = self.mimetype.trim();
        if !declared.is_empty() {
            return declared.to_string();
        }
        detect_media_type(&self.bytes)
            .unwrap_or(FALLBACK_MEDIA_TYPE)
            .to_string()
    }
}

/// The files field of an upload request, in either of the shapes clients send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPayload {
    Single(UploadedFile),
    Multiple(Vec<UploadedFile>),
}

impl UploadPayload {
    /// Wraps the received files, or returns `None` when there are none.
    pub fn from_files(mut files: Vec<UploadedFile>) -> Option<Self> {
        match files.len() {
            0 => None,
            1 => files.pop().map(UploadPayload::Single),
            _ => Some(UploadPayload::Multiple(files)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            UploadPayload::Single(_) => 1,
            UploadPayload::Multiple(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_files(self) -> Vec<UploadedFile> {
        match self {
            UploadPayload::Single(file) => vec![file],
            UploadPayload::Multiple(files) => files,
        }
    }
}

impl From<UploadedFile> for UploadPayload {
    fn from(file: UploadedFile) -> Self {
        UploadPayload::Single(file)
    }
}

/// What was stored for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UploadSummary {
    pub name: String,
    pub mimetype: String,
    pub size: u64,
}

/// A file that could not be stored, and why.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UploadFailure {
    pub name: String,
    pub reason: String,
}

/// Stores every file in `payload` under `collection`, creating the collection if needed.
///
/// # Errors
///
/// Returns a `CoreError` if:
/// - the collection or any file name is unsafe (`InvalidPath`, nothing is written)
/// - no files were supplied (`UploadError::NoFiles`)
/// - any write fails (`UploadError::Partial`, listing stored and failed files)
pub fn ingest(
    files: &FilesService,
    collection: &str,
    payload: Option<UploadPayload>,
) -> CoreResult<Vec<UploadSummary>> {
    files.collection_dir(collection)?;

    let uploads = payload.map(UploadPayload::into_files).unwrap_or_default();
    if uploads.is_empty() {
        return Err(UploadError::NoFiles.into());
    }

    for upload in &uploads {
        files.file_path(collection, &upload.name)?;
    }

    let mut stored = Vec::with_capacity(uploads.len());
    let mut failed = Vec::new();

    for upload in uploads {
        match files.write(collection, &upload.name, &upload.bytes) {
            Ok(_) => stored.push(UploadSummary {
                mimetype: upload.effective_mimetype(),
                size: upload.size(),
                name: upload.name,
            }),
            Err(e) => failed.push(UploadFailure {
                name: upload.name,
                reason: e.to_string(),
            }),
        }
    }

    if failed.is_empty() {
        Ok(stored)
    } else {
        Err(CoreError::Upload(UploadError::Partial { stored, failed }))
    }
}
