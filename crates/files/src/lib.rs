//! Zenpic File Storage
//!
//! This crate owns every filesystem touch point of the Zenpic media library:
//! resolving client-supplied identifiers into paths, enumerating directories,
//! reading files and writing uploads.
//!
//! ## Storage Layout
//!
//! A storage root holds one directory per collection; files live directly under
//! their collection directory. The layout is the only schema there is:
//!
//! ```text
//! <storage_root>/
//! ├── Sunny Day/
//! │   ├── beach.jpg
//! │   └── park.png
//! └── Snow Day/
//!     └── sledge.jpg
//! ```
//!
//! ## Path Safety
//!
//! Every identifier goes through [`paths::resolve`]: it must be a single path
//! component and the joined path must stay beneath the storage root, both
//! lexically and, when the path exists, after symlinks are resolved.
//!
//! ## Example Usage
//!
//! ```no_run
//! use zenpic_files::FilesService;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FilesService::new(Path::new("/srv/uploads"));
//! let bytes = service.read("Sunny Day", "beach.jpg")?;
//! # Ok(())
//! # }
//! ```

mod files;
pub mod paths;

pub use files::{detect_media_type, list_dir, Entry, EntryKind, FilesService};
pub use zenpic_types::{IdentifierError, PathComponent};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Directory or file does not exist, or has the wrong type
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identifier validation failed (directory traversal or malformed name)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IdentifierError> for FilesError {
    fn from(err: IdentifierError) -> Self {
        FilesError::InvalidPath(err.to_string())
    }
}
