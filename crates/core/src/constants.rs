//! Constants used throughout the Zenpic core crate.

/// Default photo library root when `STORAGE_PATH` is not set.
pub const DEFAULT_STORAGE_PATH: &str = "./uploads";

/// Default music library root when `MUSIC_STORAGE_PATH` is not set.
pub const DEFAULT_MUSIC_STORAGE_PATH: &str = "./uploads-music";

/// Default listening port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 9090;

/// Default request body limit for uploads (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Media type reported when neither the client nor content sniffing supplies one.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
