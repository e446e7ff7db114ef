//! Errors raised while resolving image dimensions.

use thiserror::Error;

/// Why an image's natural size could not be determined.
///
/// None of these are fatal for layout: a cell whose image failed keeps the
/// estimated card height.
#[derive(Debug, Error)]
pub enum DimensionError {
    /// The image file could not be read.
    #[error("failed to read image `{url}`: {source}")]
    Io {
        /// URL that was requested.
        url: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file was read but its header could not be decoded.
    #[error("failed to decode image `{url}`: {source}")]
    Decode {
        /// URL that was requested.
        url: String,
        /// Underlying decoder failure.
        #[source]
        source: image::ImageError,
    },
    /// The URL does not map onto anything the loader can open.
    #[error("unsupported image url `{0}`")]
    UnsupportedUrl(String),
    /// The image reported a zero width or height.
    #[error("image `{0}` has no area")]
    EmptyImage(String),
}

impl DimensionError {
    /// The URL the failed request was for.
    pub fn url(&self) -> &str {
        match self {
            Self::Io { url, .. } | Self::Decode { url, .. } => url,
            Self::UnsupportedUrl(url) | Self::EmptyImage(url) => url,
        }
    }
}
