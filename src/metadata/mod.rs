//! Keyword metadata access
//!
//! The session never touches image files directly. It goes through a
//! `MetadataGateway`, which owns reading and writing the raw `XPKeywords`
//! string of a file:
//! - `exiftool.rs` - production gateway backed by a long-running exiftool
//! - `memory.rs` - in-memory gateway used by the tests

pub mod exiftool;
#[cfg(test)]
pub mod memory;

pub use exiftool::ExifTool;

use std::io;
use std::path::Path;
use thiserror::Error;

/// Name of the metadata field holding the `;`-joined tag list
pub const KEYWORD_TAG: &str = "XPKeywords";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The file has no keyword field yet
    #[error("no XPKeywords field")]
    NotFound,
    #[error("exiftool I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("exiftool: {0}")]
    Tool(String),
    #[error("unreadable exiftool output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("exiftool has already been closed")]
    Closed,
}

/// Reads and writes the raw keyword string of a file
pub trait MetadataGateway: Send + Sync {
    /// Raw keyword string of `path`, or `GatewayError::NotFound` if the file
    /// has none
    fn read_keywords(&self, path: &Path) -> Result<String, GatewayError>;

    /// Replace the raw keyword string of `path`
    fn write_keywords(&self, path: &Path, raw: &str) -> Result<(), GatewayError>;

    /// Like `read_keywords`, but a missing field reads as no tags
    fn read_keywords_or_empty(&self, path: &Path) -> Result<String, GatewayError> {
        match self.read_keywords(path) {
            Err(GatewayError::NotFound) => Ok(String::new()),
            other => other,
        }
    }
}
