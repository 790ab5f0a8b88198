//! # Zenpic Imaging
//!
//! On-demand image resizing. Images are scaled to fit inside a requested box with their
//! aspect ratio preserved: never cropped, never larger than either bound.
//!
//! Decoding, resampling and encoding are CPU-bound; callers on an async runtime should run
//! [`resize`] on a blocking thread.

use image::imageops::FilterType;
use image::ImageFormat;
use std::io::Cursor;
use std::num::NonZeroU32;

/// Largest width or height a client may request.
pub const MAX_DIMENSION: u32 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

pub type ImagingResult<T> = std::result::Result<T, ImagingError>;

/// Bounding box for a fit-inside resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl ResizeSpec {
    /// Creates a spec from already-validated dimensions.
    ///
    /// # Errors
    ///
    /// Returns `ImagingError::InvalidDimensions` if either side is zero or above
    /// [`MAX_DIMENSION`].
    pub fn new(width: u32, height: u32) -> ImagingResult<Self> {
        Ok(Self {
            width: checked_dimension("width", width)?,
            height: checked_dimension("height", height)?,
        })
    }

    /// Parses optional `width` / `height` request parameters.
    ///
    /// Both absent means no transform (`Ok(None)`). Supplying only one, or a value that is
    /// not a positive integer, is an error.
    pub fn parse(width: Option<&str>, height: Option<&str>) -> ImagingResult<Option<Self>> {
        match (width, height) {
            (None, None) => Ok(None),
            (Some(width), Some(height)) => {
                let width = parse_dimension("width", width)?;
                let height = parse_dimension("height", height)?;
                Self::new(width, height).map(Some)
            }
            _ => Err(ImagingError::InvalidDimensions(
                "width and height must be given together".into(),
            )),
        }
    }
}

fn parse_dimension(name: &str, value: &str) -> ImagingResult<u32> {
    value.parse::<u32>().map_err(|_| {
        ImagingError::InvalidDimensions(format!("{} must be a positive integer, got {:?}", name, value))
    })
}

fn checked_dimension(name: &str, value: u32) -> ImagingResult<NonZeroU32> {
    if value > MAX_DIMENSION {
        return Err(ImagingError::InvalidDimensions(format!(
            "{} exceeds maximum of {}",
            name, MAX_DIMENSION
        )));
    }
    NonZeroU32::new(value)
        .ok_or_else(|| ImagingError::InvalidDimensions(format!("{} must be positive", name)))
}

/// Re-encoded image bytes with their media type.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Computes the largest size with the aspect ratio of `source` that fits inside `bounds`.
///
/// Each side of the result is at least one pixel and never exceeds the matching bound.
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (max_w, max_h) = (bounds.0.max(1), bounds.1.max(1));

    let scale = (max_w as f64 / src_w).min(max_h as f64 / src_h);
    let width = ((src_w * scale).round() as u32).clamp(1, max_w);
    let height = ((src_h * scale).round() as u32).clamp(1, max_h);
    (width, height)
}

/// Resizes `bytes` to fit inside `spec`, re-encoding the result.
///
/// JPEG input is re-encoded as JPEG; every other format is written as PNG.
///
/// # Errors
///
/// Returns `ImagingError::Decode` when `bytes` is not a decodable image and
/// `ImagingError::Encode` if the resized image cannot be written.
pub fn resize(bytes: &[u8], spec: ResizeSpec) -> ImagingResult<TransformedImage> {
    let source_format = image::guess_format(bytes).map_err(ImagingError::Decode)?;
    let img = image::load_from_memory_with_format(bytes, source_format)
        .map_err(ImagingError::Decode)?;

    let (width, height) = fit_within(
        (img.width(), img.height()),
        (spec.width.get(), spec.height.get()),
    );
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let (format, media_type) = match source_format {
        ImageFormat::Jpeg => (ImageFormat::Jpeg, "image/jpeg"),
        _ => (ImageFormat::Png, "image/png"),
    };

    let mut buf = Cursor::new(Vec::new());
    resized
        .write_to(&mut buf, format)
        .map_err(ImagingError::Encode)?;

    Ok(TransformedImage {
        bytes: buf.into_inner(),
        media_type,
    })
}
