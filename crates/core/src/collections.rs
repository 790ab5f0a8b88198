//! Collection and entry listings.
//!
//! Listings are read straight from the filesystem on every call, in whatever order the
//! directory enumeration yields.

use crate::conditions;
use crate::CoreResult;
use zenpic_files::{list_dir, Entry, FilesService};

/// Lists every direct child of the storage root.
///
/// # Errors
///
/// Returns `CoreError::NotFound` if the storage root does not exist or is not a directory.
pub fn list_collections(files: &FilesService) -> CoreResult<Vec<Entry>> {
    Ok(list_dir(files.root_directory())?)
}

/// Lists every direct child of one collection.
///
/// # Errors
///
/// Returns `CoreError::InvalidPath` for an unsafe identifier and `CoreError::NotFound` if
/// the collection directory does not exist.
pub fn list_entries(files: &FilesService, collection: &str) -> CoreResult<Vec<Entry>> {
    let dir = files.collection_dir(collection)?;
    Ok(list_dir(&dir)?)
}

/// A listing of the collection a weather condition maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionListing {
    pub collection: &'static str,
    pub entries: Vec<Entry>,
}

/// Resolves `condition` to its collection and lists that collection.
pub fn list_by_condition(
    files: &FilesService,
    condition: Option<&str>,
) -> CoreResult<ConditionListing> {
    let collection = conditions::resolve(condition)?;
    let entries = list_entries(files, collection)?;
    Ok(ConditionListing {
        collection,
        entries,
    })
}
