//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the session layer and the UI layer.
use std::path::PathBuf;

use super::vocabulary::Rgb;

/// A single entry of the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Position in the catalog
    pub index: usize,
}

impl ImageFile {
    /// Filename only (e.g., "DSC_0001.JPG")
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// One vocabulary tag as seen from the current file
#[derive(Debug, Clone, PartialEq)]
pub struct TagState {
    pub name: String,
    pub color: Rgb,
    /// Whether the current file carries this tag
    pub checked: bool,
}

/// Snapshot handed to the UI after every operation
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// The file being tagged
    pub file: ImageFile,
    /// Number of files in the catalog
    pub total: usize,
    /// Every known tag, in vocabulary order
    pub tags: Vec<TagState>,
}

impl SessionView {
    /// Membership of a tag on the current file, None if the tag is unknown
    #[cfg(test)]
    pub fn is_checked(&self, name: &str) -> Option<bool> {
        self.tags
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.checked)
    }
}
