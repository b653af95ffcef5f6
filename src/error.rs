// src/error.rs
//! Error types for the GPS log merger

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, MergeError>;

#[derive(Debug)]
pub enum MergeError {
    Io(std::io::Error),
    Archive(zip::result::ZipError),
    Json(serde_json::Error),
    Pattern(glob::PatternError),
    Parse(String),
    Usage(String),
    InputNotFound(PathBuf),
    /// Failure while merging a single file of a batch
    InFile {
        name: String,
        source: Box<MergeError>,
    },
    Other(String),
}

impl MergeError {
    /// Attach the name of the batch entry being processed
    pub fn in_file(self, name: &str) -> Self {
        MergeError::InFile {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::Io(e) => write!(f, "IO error: {}", e),
            MergeError::Archive(e) => write!(f, "Archive error: {}", e),
            MergeError::Json(e) => write!(f, "JSON error: {}", e),
            MergeError::Pattern(e) => write!(f, "Pattern error: {}", e),
            MergeError::Parse(msg) => write!(f, "Parse error: {}", msg),
            MergeError::Usage(msg) => write!(f, "{}", msg),
            MergeError::InputNotFound(path) => {
                write!(f, "Invalid input path {}. Please try again.", path.display())
            }
            MergeError::InFile { name, source } => write!(f, "{}: {}", name, source),
            MergeError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::Io(e) => Some(e),
            MergeError::Archive(e) => Some(e),
            MergeError::Json(e) => Some(e),
            MergeError::Pattern(e) => Some(e),
            MergeError::InFile { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MergeError {
    fn from(error: std::io::Error) -> Self {
        MergeError::Io(error)
    }
}

impl From<zip::result::ZipError> for MergeError {
    fn from(error: zip::result::ZipError) -> Self {
        MergeError::Archive(error)
    }
}

impl From<serde_json::Error> for MergeError {
    fn from(error: serde_json::Error) -> Self {
        MergeError::Json(error)
    }
}

impl From<glob::PatternError> for MergeError {
    fn from(error: glob::PatternError) -> Self {
        MergeError::Pattern(error)
    }
}
