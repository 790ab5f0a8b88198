//! Identifier to path resolution.
//!
//! Client-supplied collection and file names are only ever turned into paths here.

use crate::FilesError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use zenpic_types::PathComponent;

/// Resolves `collection` (and optionally `file`) beneath `root`.
///
/// Each identifier must be a single, normal path component (see [`PathComponent`]). The
/// joined path must stay under `root`. Its deepest existing ancestor (the path itself when it
/// exists) is canonicalised and checked again against the canonical root, so a symlink
/// cannot lead outside the storage root, even for a file that is about to be created.
///
/// # Errors
///
/// Returns `FilesError::InvalidPath` if any identifier is malformed or the resolved path
/// escapes `root`.
pub fn resolve(root: &Path, collection: &str, file: Option<&str>) -> Result<PathBuf, FilesError> {
    let collection = component(collection)?;
    let mut path = root.join(collection.as_str());

    if let Some(file) = file {
        let file = component(file)?;
        path.push(file.as_str());
    }

    ensure_within_root(root, &path)?;
    Ok(path)
}

fn component(input: &str) -> Result<PathComponent, FilesError> {
    let component = PathComponent::new(input)?;

    // Platform prefixes such as `C:` parse as something other than a normal component.
    let mut parts = Path::new(component.as_str()).components();
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(_)), None) => Ok(component),
        _ => Err(FilesError::InvalidPath(format!(
            "identifier is not a single path component: {:?}",
            input
        ))),
    }
}

fn ensure_within_root(root: &Path, path: &Path) -> Result<(), FilesError> {
    if !path.starts_with(root) {
        return Err(FilesError::InvalidPath(format!(
            "{} is outside the storage root",
            path.display()
        )));
    }

    // Nothing under a missing root can be a link yet.
    let Ok(canonical_root) = root.canonicalize() else {
        return Ok(());
    };

    // The deepest existing ancestor decides where a not-yet-created path will land.
    let existing = path
        .ancestors()
        .take_while(|ancestor| ancestor.starts_with(root))
        .find(|ancestor| fs::symlink_metadata(ancestor).is_ok());

    if let Some(existing) = existing {
        let escapes = match existing.canonicalize() {
            Ok(canonical) => !canonical.starts_with(&canonical_root),
            // Dangling link.
            Err(_) => true,
        };
        if escapes {
            return Err(FilesError::InvalidPath(format!(
                "{} resolves outside the storage root",
                path.display()
            )));
        }
    }

    Ok(())
}
