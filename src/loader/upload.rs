use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::loader::workbook::decode_workbook;
use crate::table::SheetCollection;
use crate::utils::short_cause;

/// A file handed over by an upload widget: its original name and raw bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadedFile {
            name: name.into(),
            bytes,
        }
    }

    /// Read a local file into an upload handle
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.xlsx")
            .to_string();
        Ok(UploadedFile { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Decodes an uploaded file into sheets.
///
/// Callers reject a missing file before calling; implementations never cache.
pub trait UploadLoader: Send + Sync {
    fn load_from_handle(&self, file: &UploadedFile) -> Result<SheetCollection, LoadError>;
}

/// Upload loader for `.xlsx` workbooks
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxUploadLoader;

impl UploadLoader for XlsxUploadLoader {
    fn load_from_handle(&self, file: &UploadedFile) -> Result<SheetCollection, LoadError> {
        debug!(file = file.name(), bytes = file.bytes().len(), "Decoding upload");

        decode_workbook(Cursor::new(file.bytes())).map_err(|e| {
            warn!(file = file.name(), error = %e, "Uploaded file is not a readable workbook");
            LoadError::Decode {
                cause: short_cause(&e),
            }
        })
    }
}
