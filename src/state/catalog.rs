use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::data::ImageFile;

/// Errors raised while building the catalog at startup
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} contains no files", .0.display())]
    Empty(PathBuf),
}

/// Outcome of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Cursor moved to the given position
    Moved(usize),
    /// Cursor was on the last entry and went back to the first
    Wrapped,
}

/// The ordered snapshot of the source directory plus a cursor into it.
///
/// The catalog is never empty, so the cursor always points at a real entry.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    files: Vec<ImageFile>,
    cursor: usize,
}

impl FileCatalog {
    /// List the immediate entries of `dir`, ordered by file name.
    ///
    /// Every entry is accepted as-is: no filtering by extension or kind.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        // WalkDir yields nothing for a plain file instead of failing
        fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| CatalogError::Io {
                path: dir.to_path_buf(),
                source: err.into(),
            })?;
            paths.push(entry.into_path());
        }

        let catalog =
            Self::from_paths(paths).ok_or_else(|| CatalogError::Empty(dir.to_path_buf()))?;

        tracing::info!("📁 Loaded {} entries from {}", catalog.len(), dir.display());

        Ok(catalog)
    }

    /// Wrap an explicit listing. Returns None for an empty listing.
    pub fn from_paths(paths: Vec<PathBuf>) -> Option<Self> {
        if paths.is_empty() {
            return None;
        }

        let files = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| ImageFile { path, index })
            .collect();

        Some(Self { files, cursor: 0 })
    }

    /// The entry under the cursor
    pub fn current(&self) -> &ImageFile {
        &self.files[self.cursor]
    }

    /// Move to the next entry, wrapping to the first one past the end
    pub fn advance(&mut self) -> Advance {
        if self.cursor + 1 < self.files.len() {
            self.cursor += 1;
            Advance::Moved(self.cursor)
        } else {
            self.cursor = 0;
            Advance::Wrapped
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[cfg(test)]
    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> FileCatalog {
        FileCatalog::from_paths(names.iter().map(PathBuf::from).collect()).unwrap()
    }

    #[test]
    fn test_empty_listing_is_rejected() {
        assert!(FileCatalog::from_paths(Vec::new()).is_none());
    }

    #[test]
    fn test_advance_stays_in_bounds() {
        let mut catalog = catalog(&["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(catalog.current().path, PathBuf::from("a.jpg"));

        assert_eq!(catalog.advance(), Advance::Moved(1));
        assert_eq!(catalog.current().path, PathBuf::from("b.jpg"));
        assert_eq!(catalog.advance(), Advance::Moved(2));
        assert_eq!(catalog.current().path, PathBuf::from("c.jpg"));

        // Past the end goes back to the start
        assert_eq!(catalog.advance(), Advance::Wrapped);
        assert_eq!(catalog.position(), 0);
        assert_eq!(catalog.current().path, PathBuf::from("a.jpg"));
    }

    #[test]
    fn test_advance_n_times_returns_to_start() {
        let mut catalog = catalog(&["1", "2", "3", "4", "5"]);
        for _ in 0..catalog.len() {
            catalog.advance();
            assert!(catalog.position() < catalog.len());
            assert_eq!(catalog.current().index, catalog.position());
        }
        assert_eq!(catalog.position(), 0);
    }

    #[test]
    fn test_single_entry_wraps_onto_itself() {
        let mut catalog = catalog(&["only.png"]);
        assert_eq!(catalog.advance(), Advance::Wrapped);
        assert_eq!(catalog.current().path, PathBuf::from("only.png"));
    }

    #[test]
    fn test_load_lists_every_entry_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.jpg"), b"deep").unwrap();

        let catalog = FileCatalog::load(dir.path()).unwrap();
        let names: Vec<_> = catalog
            .files()
            .iter()
            .map(|file| file.file_name())
            .collect();

        assert_eq!(names, ["a.jpg", "b.jpg", "nested", "notes.txt"]);
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCatalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Empty(_)));
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCatalog::load(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_load_plain_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("photo.jpg");
        fs::write(&file, b"jpeg").unwrap();

        let err = FileCatalog::load(&file).unwrap_err();
        assert!(matches!(err, CatalogError::Io { ref path, .. } if *path == file));
    }
}
