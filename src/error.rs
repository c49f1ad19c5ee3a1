//! Error types.

use std::{io, path::PathBuf};

/// A background asset could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("asset '{0}' does not exist")]
    Missing(PathBuf),
    #[error("failed to decode image '{path}'")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image '{0}' has no pixels")]
    Empty(PathBuf),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to parse font as TTF/OTF font data")]
pub struct MalformedFont;

/// A render surface could not be created.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface dimensions {width}x{height} are empty")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("surface dimensions {width}x{height} exceed the supported size")]
    TooLarge { width: u32, height: u32 },
    #[error("invalid DPI scale factor {0}")]
    InvalidScaleFactor(f32),
    #[error("render surface no longer exists")]
    MissingLayer,
}

/// A variant definition could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    #[error("failed to read variant file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed variant definition")]
    Toml(#[from] toml::de::Error),
    #[error("invalid variant: {0}")]
    Invalid(String),
}

/// The surface could not be exported.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode PNG: {0}")]
    Encode(String),
    #[error("failed to write '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
