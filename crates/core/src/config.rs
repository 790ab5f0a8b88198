//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. The
//! parsing helpers take the raw environment value as an `Option<String>` so that callers read
//! the environment exactly once and tests never have to mutate process state.

use crate::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MUSIC_STORAGE_PATH, DEFAULT_PORT, DEFAULT_STORAGE_PATH,
};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// The independent media libraries served by one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    Photos,
    Music,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage_root: PathBuf,
    music_storage_root: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// Both roots must be absolute; use [`storage_root_from_env_value`] to resolve
    /// relative values.
    pub fn new(storage_root: PathBuf, music_storage_root: PathBuf) -> CoreResult<Self> {
        for root in [&storage_root, &music_storage_root] {
            if !root.is_absolute() {
                return Err(CoreError::InvalidConfig(format!(
                    "storage root must be absolute: {}",
                    root.display()
                )));
            }
        }

        Ok(Self {
            storage_root,
            music_storage_root,
        })
    }

    pub fn root(&self, library: Library) -> &Path {
        match library {
            Library::Photos => &self.storage_root,
            Library::Music => &self.music_storage_root,
        }
    }
}

/// Resolve a storage root from an optional environment value.
///
/// Empty or missing values fall back to `default`. Relative paths are made absolute
/// against `cwd`.
pub fn storage_root_from_env_value(
    value: Option<String>,
    default: &str,
    cwd: &Path,
) -> PathBuf {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());

    let path = PathBuf::from(value);
    let path = if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    };

    // Strip `.` components so roots compare cleanly against resolved paths.
    path.components().collect()
}

/// Resolve both library roots from their optional environment values.
pub fn config_from_env_values(
    storage_path: Option<String>,
    music_storage_path: Option<String>,
    cwd: &Path,
) -> CoreResult<CoreConfig> {
    CoreConfig::new(
        storage_root_from_env_value(storage_path, DEFAULT_STORAGE_PATH, cwd),
        storage_root_from_env_value(music_storage_path, DEFAULT_MUSIC_STORAGE_PATH, cwd),
    )
}

/// Parse the listening port from an optional string value.
pub fn port_from_env_value(value: Option<String>) -> CoreResult<u16> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_PORT),
        Some(v) => v
            .parse::<u16>()
            .map_err(|_| CoreError::InvalidConfig(format!("PORT is not a valid port: {}", v))),
    }
}

/// Parse the upload body limit (bytes) from an optional string value.
pub fn max_upload_bytes_from_env_value(value: Option<String>) -> CoreResult<usize> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_MAX_UPLOAD_BYTES),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(CoreError::InvalidConfig(format!(
                "ZENPIC_MAX_UPLOAD_BYTES must be a positive integer: {}",
                v
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> PathBuf {
        std::env::temp_dir().join("zenpic-cwd")
    }

    #[test]
    fn storage_root_defaults_relative_to_cwd() {
        let root = storage_root_from_env_value(None, DEFAULT_STORAGE_PATH, &cwd());
        assert_eq!(root, cwd().join("uploads"));
        assert!(root.is_absolute());
    }

    #[test]
    fn storage_root_blank_value_uses_default() {
        let root = storage_root_from_env_value(Some("  ".into()), DEFAULT_STORAGE_PATH, &cwd());
        assert_eq!(root, cwd().join("uploads"));
    }

    #[test]
    fn storage_root_keeps_absolute_value() {
        let absolute = std::env::temp_dir().join("media");
        let root = storage_root_from_env_value(
            Some(absolute.display().to_string()),
            DEFAULT_STORAGE_PATH,
            &cwd(),
        );
        assert_eq!(root, absolute);
    }

    #[test]
    fn config_resolves_both_libraries() {
        let cfg = config_from_env_values(None, Some("music".into()), &cwd()).unwrap();
        assert_eq!(cfg.root(Library::Photos), cwd().join("uploads"));
        assert_eq!(cfg.root(Library::Music), cwd().join("music"));
    }

    #[test]
    fn config_rejects_relative_roots() {
        let result = CoreConfig::new(PathBuf::from("rel"), cwd());
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn port_parsing() {
        assert_eq!(port_from_env_value(None).unwrap(), DEFAULT_PORT);
        assert_eq!(port_from_env_value(Some("8080".into())).unwrap(), 8080);
        assert!(port_from_env_value(Some("http".into())).is_err());
        assert!(port_from_env_value(Some("70000".into())).is_err());
    }

    #[test]
    fn max_upload_bytes_parsing() {
        assert_eq!(
            max_upload_bytes_from_env_value(None).unwrap(),
            DEFAULT_MAX_UPLOAD_BYTES
        );
        assert_eq!(max_upload_bytes_from_env_value(Some("1024".into())).unwrap(), 1024);
        assert!(max_upload_bytes_from_env_value(Some("0".into())).is_err());
    }
}
