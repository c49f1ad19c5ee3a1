//! Loading and decoding of background images.
//!
//! Assets are addressed by a path relative to the loader's root,
//! the way a bundled static file is addressed by its public URL.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::AssetError;

/// A source of asset bytes.
///
/// Loaders are called from worker threads.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, path: &Path) -> Result<Vec<u8>, AssetError>;
}

/// Loads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsAssets {
    fn load(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        let full_path = self.root.join(path);
        fs::read(&full_path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => AssetError::Missing(full_path),
            _ => AssetError::Io {
                path: full_path,
                source,
            },
        })
    }
}

/// Serves assets from memory, e.g. data compiled into the binary.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), data.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.write().remove(path.as_ref())
    }
}

impl AssetLoader for MemoryAssets {
    fn load(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::Missing(path.to_owned()))
    }
}

/// A decoded image in unpremultiplied RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl DecodedImage {
    /// Wraps raw RGBA8 data. Returns `None` if the image is empty or
    /// `rgba` does not hold exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && rgba.len() == expected).then(|| Self {
            width,
            height,
            rgba,
        })
    }

    /// Decodes a JPEG or PNG file. `path` is only used in errors.
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)
            .map_err(|source| AssetError::Decode {
                path: path.to_owned(),
                source,
            })?
            .into_rgba8();
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw()).ok_or_else(|| AssetError::Empty(path.to_owned()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Loads and decodes an image in one step.
pub fn load_image(loader: &dyn AssetLoader, path: &Path) -> Result<DecodedImage, AssetError> {
    let bytes = loader.load(path)?;
    DecodedImage::decode(path, &bytes)
}
