//! Reader layer for loading reference tables

mod csv;
mod json;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;

pub use self::csv::CsvReader;
pub use self::json::JsonReader;

/// Trait for reading tabular reference files
pub trait Reader: Send + Sync {
    /// Read a file into a columnar Table
    fn read(&self, path: &Path) -> Result<Table>;

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating readers based on file extension
pub struct ReaderFactory {
    readers: Vec<Box<dyn Reader>>,
}

impl Default for ReaderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderFactory {
    /// Create a new reader factory with all supported readers
    pub fn new() -> Self {
        Self {
            readers: vec![Box::new(CsvReader), Box::new(JsonReader)],
        }
    }

    /// Get a reader for the given file path
    pub fn get_reader(&self, path: &Path) -> Result<&dyn Reader> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for reader in &self.readers {
            if reader.supports_extension(&ext) {
                return Ok(reader.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    /// Read a file using the appropriate reader
    pub fn read(&self, path: &Path) -> Result<Table> {
        let reader = self.get_reader(path)?;
        reader.read(path)
    }
}
