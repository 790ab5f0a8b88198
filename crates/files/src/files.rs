//! Storage-root scoped file service implementation
//!
//! This module provides [`FilesService`], the read/write half of Zenpic's storage layer,
//! together with the [`list_dir`] enumeration primitive used for collection listings.
//!
//! # Write Semantics
//!
//! Uploads replace any existing file of the same name. Every write goes to a temporary
//! file created in the destination directory and is then renamed over the target, so a
//! concurrent reader sees either the previous file or the new one, never a mixture:
//!
//! ```text
//! <storage_root>/<collection>/.upload-XXXXXX   # written and synced
//!                            └─ rename ─▶ <file>
//! ```
//!
//! There is no locking: two concurrent writers of the same name both succeed and the
//! last rename wins.
//!
//! # Security Model
//!
//! All identifiers pass through [`crate::paths::resolve`] before any filesystem call.

use crate::paths::resolve;
use crate::FilesError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Prefix for in-flight upload files inside a collection directory.
const TEMP_FILE_PREFIX: &str = ".upload-";

/// Type tag of a listed directory member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// One member of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// Lists the direct children of `dir` in enumeration order.
///
/// Subdirectories are reported as [`EntryKind::Directory`] and not descended into;
/// everything else (regular files, symlinks, special files) is reported as
/// [`EntryKind::File`].
///
/// # Errors
///
/// Returns `FilesError::NotFound` if `dir` does not exist or is not a directory, and
/// `FilesError::Io` for any other read failure.
pub fn list_dir(dir: &Path) -> Result<Vec<Entry>, FilesError> {
    if !dir.is_dir() {
        return Err(FilesError::NotFound(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }

    let iter = fs::read_dir(dir).map_err(|e| not_found_or_io(e, dir))?;

    let mut entries = Vec::new();
    for entry in iter {
        let entry = entry?;
        let kind = match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
            Ok(_) => EntryKind::File,
            // The entry vanished between enumeration and stat.
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(FilesError::Io(e)),
        };
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
        });
    }

    Ok(entries)
}

/// Best-effort media type detection from leading magic bytes.
pub fn detect_media_type(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Service for reading and writing files under one storage root
///
/// The service holds nothing but the root path; every call resolves its identifiers afresh
/// and reflects the filesystem at call time.
#[derive(Debug, Clone)]
pub struct FilesService {
    /// Root directory containing all collections
    root_directory: PathBuf,
}

impl FilesService {
    /// Creates a new `FilesService` for `root_directory`.
    ///
    /// The root does not have to exist yet: listings report it as not found and the first
    /// upload creates it.
    pub fn new(root_directory: &Path) -> Self {
        Self {
            root_directory: root_directory.to_path_buf(),
        }
    }

    /// Returns the storage root this service is bound to.
    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Resolves a collection identifier to its directory path.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if the identifier is unsafe.
    pub fn collection_dir(&self, collection: &str) -> Result<PathBuf, FilesError> {
        resolve(&self.root_directory, collection, None)
    }

    /// Resolves a file identifier inside a collection to its path.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if either identifier is unsafe.
    pub fn file_path(&self, collection: &str, file: &str) -> Result<PathBuf, FilesError> {
        resolve(&self.root_directory, collection, Some(file))
    }

    /// Reads a whole file from a collection.
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection (directory) name under the storage root
    /// * `file` - File name inside the collection
    ///
    /// # Returns
    ///
    /// The complete file contents.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - either identifier is unsafe (`InvalidPath`)
    /// - the path does not exist or is not a regular file (`NotFound`)
    /// - the file cannot be read (`Io`)
    pub fn read(&self, collection: &str, file: &str) -> Result<Vec<u8>, FilesError> {
        let path = resolve(&self.root_directory, collection, Some(file))?;

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                return Err(FilesError::NotFound(format!(
                    "Not a regular file: {}",
                    path.display()
                )))
            }
            Err(e) => return Err(not_found_or_io(e, &path)),
        }

        fs::read(&path).map_err(|e| not_found_or_io(e, &path))
    }

    /// Writes `bytes` to `<collection>/<file>`, replacing any existing file atomically.
    ///
    /// The collection directory (and the storage root, if needed) is created first.
    ///
    /// # Returns
    ///
    /// The path of the written file.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - either identifier is unsafe (`InvalidPath`)
    /// - the collection directory cannot be created (`Io`)
    /// - the temporary file cannot be written, synced or renamed into place (`Io`)
    pub fn write(&self, collection: &str, file: &str, bytes: &[u8]) -> Result<PathBuf, FilesError> {
        let path = resolve(&self.root_directory, collection, Some(file))?;
        let dir = path.parent().ok_or_else(|| {
            FilesError::InvalidPath(format!("{} has no parent directory", path.display()))
        })?;

        fs::create_dir_all(dir).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create collection directory {}: {}", dir.display(), e),
            ))
        })?;

        // The collection may have appeared since the first check.
        resolve(&self.root_directory, collection, Some(file))?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }

        temp.persist(&path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.error.kind(),
                format!("Failed to move upload into {}: {}", path.display(), e.error),
            ))
        })?;

        Ok(path)
    }
}

fn not_found_or_io(err: std::io::Error, path: &Path) -> FilesError {
    if err.kind() == ErrorKind::NotFound {
        FilesError::NotFound(path.display().to_string())
    } else {
        FilesError::Io(err)
    }
}
