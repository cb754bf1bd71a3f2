//! Where statement text comes from. Parsing starts from a text blob; these
//! sources produce it from a PDF (via `pdf-extract`) or a pre-extracted file.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF is password protected, a password is required")]
    PasswordRequired,
    #[error("incorrect password for protected PDF")]
    IncorrectPassword,
    #[error("not a valid PDF document: {0}")]
    InvalidPdf(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text: {0}")]
    Backend(String),
}

/// A collaborator that hands over the full statement text.
pub trait TextSource {
    fn read_text(&self, password: Option<&str>) -> Result<String, ExtractError>;

    fn path(&self) -> &Path;
}

pub struct PdfFile {
    path: PathBuf,
}

pub struct PlainTextFile {
    path: PathBuf,
}

impl PdfFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlainTextFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ExtractError> {
    fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Sorts a backend failure into the password / invalid-document cases.
fn classify_backend_error(message: String, password: Option<&str>) -> ExtractError {
    let lower = message.to_lowercase();
    if ["password", "encrypt", "decrypt"].iter().any(|w| lower.contains(w)) {
        return match password {
            None => ExtractError::PasswordRequired,
            Some(_) => ExtractError::IncorrectPassword,
        };
    }
    if lower.contains("invalid") || lower.contains("header") || lower.contains("xref") {
        return ExtractError::InvalidPdf(message);
    }
    ExtractError::Backend(message)
}

impl TextSource for PdfFile {
    fn read_text(&self, password: Option<&str>) -> Result<String, ExtractError> {
        let bytes = read_bytes(&self.path)?;
        let extracted = match password {
            Some(pw) => pdf_extract::extract_text_from_mem_encrypted(&bytes, pw),
            None => pdf_extract::extract_text_from_mem(&bytes),
        };
        let text = extracted.map_err(|e| classify_backend_error(e.to_string(), password))?;
        log::info!("extracted {} characters from {:?}", text.len(), self.path);
        Ok(text)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for PlainTextFile {
    fn read_text(&self, _password: Option<&str>) -> Result<String, ExtractError> {
        let bytes = read_bytes(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Picks a source by extension: `.pdf` or `.txt`, anything else is not a statement.
pub fn source_for(path: &Path) -> Option<Box<dyn TextSource>> {
    let ext = path.extension().and_then(OsStr::to_str)?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(Box::new(PdfFile::new(path))),
        "txt" => Some(Box::new(PlainTextFile::new(path))),
        _ => None,
    }
}
