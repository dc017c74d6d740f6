//! Image validation and resolution selection.
//!
//! Uploads are validated locally before any bytes go over the wire: the
//! extension must be supported, the file must fit the size cap, and the
//! content must carry a recognized image magic number.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum image file size (50MB).
pub const MAX_IMAGE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Supported image file extensions (lowercase).
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// File-size threshold below which low resolution is selected.
const LOW_RESOLUTION_MAX_BYTES: u64 = 100_000;
/// File-size threshold below which medium resolution is selected.
const MEDIUM_RESOLUTION_MAX_BYTES: u64 = 500_000;

/// Image magic number prefixes.
const MAGIC_NUMBERS: [&[u8]; 4] = [
    b"\xff\xd8\xff",        // JPEG
    b"\x89PNG\r\n\x1a\n",   // PNG
    b"GIF87a",              // GIF
    b"GIF89a",              // GIF
];

/// Errors from image validation.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The image file does not exist.
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The image exceeds the size cap.
    #[error("Image file is too large ({}MB). Maximum allowed size is {}MB.", .0 / 1024 / 1024, MAX_IMAGE_SIZE_BYTES / 1024 / 1024)]
    TooLarge(u64),

    /// The file is not a valid image.
    #[error("Invalid image: {0}")]
    Invalid(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image analysis resolution requested from the server.
///
/// Passed through to each upload; the batch executor does not interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Fast and cheap analysis.
    Low,
    /// Balanced analysis.
    Medium,
    /// Detailed analysis.
    High,
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "Invalid resolution: '{}'. Must be one of: high, low, medium",
                other
            )),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Select a resolution from the image's file size.
///
/// Thresholds: under 100KB low, under 500KB medium, otherwise high. This is
/// a caller-side policy; pass an explicit resolution to skip it.
pub fn auto_select_resolution(path: &Path) -> Result<Resolution, ImageError> {
    let metadata = fs::metadata(path).map_err(|_| ImageError::NotFound(path.to_path_buf()))?;
    let size = metadata.len();
    if size < LOW_RESOLUTION_MAX_BYTES {
        Ok(Resolution::Low)
    } else if size < MEDIUM_RESOLUTION_MAX_BYTES {
        Ok(Resolution::Medium)
    } else {
        Ok(Resolution::High)
    }
}

/// Validate an image file's path, extension, size, and magic numbers.
pub fn validate_image(path: &Path) -> Result<(), ImageError> {
    if !path.exists() {
        return Err(ImageError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ImageError::Invalid(format!(
            "Path is not a regular file: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImageError::Invalid(format!(
            "Unsupported file extension: '{}'. Allowed: {}",
            extension,
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    let size = fs::metadata(path)?.len();
    if size > MAX_IMAGE_SIZE_BYTES {
        return Err(ImageError::TooLarge(size));
    }

    let mut header = [0u8; 12];
    let mut file = fs::File::open(path)?;
    let read = file.read(&mut header)?;
    if read == 0 {
        return Err(ImageError::Invalid("File is empty".to_string()));
    }

    let header = &header[..read];
    let valid = MAGIC_NUMBERS.iter().any(|magic| header.starts_with(magic))
        // WEBP is RIFF<4-byte size>WEBP.
        || (header.len() >= 12 && &header[..4] == b"RIFF" && &header[8..12] == b"WEBP");
    if !valid {
        return Err(ImageError::Invalid(
            "File content does not match any supported image format.".to_string(),
        ));
    }

    Ok(())
}

/// Validate an image and return its content base64-encoded.
pub fn read_image_as_base64(path: &Path) -> Result<String, ImageError> {
    validate_image(path)?;
    let bytes = fs::read(path)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Whether a directory entry looks like a supported image by extension.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}
