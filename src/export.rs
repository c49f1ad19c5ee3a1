//! Exporting the rendered surface.

use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ExportError;

/// A PNG-encoded snapshot of the render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngExport {
    filename: String,
    bytes: Vec<u8>,
}

impl PngExport {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// The fixed filename the download is saved under.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encodes the PNG as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.bytes))
    }

    /// Writes the PNG into `dir` under its filename.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.filename);
        fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Receives exported images, standing in for a browser download.
pub trait DownloadSink {
    fn deliver(&mut self, export: &PngExport) -> Result<(), ExportError>;
}

/// Saves downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, export: &PngExport) -> Result<(), ExportError> {
        let path = export.save_to(&self.dir)?;
        log::info!("Saved {}", path.display());
        self.saved.push(path);
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub downloads: Vec<PngExport>,
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, export: &PngExport) -> Result<(), ExportError> {
        self.downloads.push(export.clone());
        Ok(())
    }
}
