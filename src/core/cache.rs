/// Story-count cache: remembers how many stories each library holds.
///
/// The file is a flat run of little-endian `u32`s, one per library file in
/// enumeration order. It lets the game pick a story without parsing every
/// library first.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::library::{count_stories, read_library, LibraryError};

/// Default cache file name, kept in the library directory.
pub const CACHE_FILE_NAME: &str = "strche.dat";

const ENTRY_SIZE: usize = std::mem::size_of::<u32>();

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error on cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} holds {found} bytes, expected {expected}")]
    Corrupt {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Read the cached story counts for `file_count` libraries.
pub fn read_cache(path: &Path, file_count: usize) -> Result<Vec<u32>, CacheError> {
    let bytes = std::fs::read(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let expected = file_count * ENTRY_SIZE;
    if bytes.len() != expected {
        return Err(CacheError::Corrupt {
            path: path.to_path_buf(),
            expected,
            found: bytes.len(),
        });
    }

    let counts: Vec<u32> = bytes
        .chunks_exact(ENTRY_SIZE)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    debug!(path = %path.display(), ?counts, "read story cache");
    Ok(counts)
}

/// Write story counts to the cache file, replacing any existing one.
pub fn write_cache(path: &Path, counts: &[u32]) -> Result<(), CacheError> {
    let bytes: Vec<u8> = counts.iter().flat_map(|c| c.to_le_bytes()).collect();
    std::fs::write(path, bytes).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Count the stories in every library file.
pub fn build_counts(files: &[PathBuf]) -> Result<Vec<u32>, LibraryError> {
    files
        .iter()
        .map(|file| read_library(file).map(|text| count_stories(&text)))
        .collect()
}

/// Recount every library and rewrite the cache. Returns the new counts.
pub fn regenerate_cache(path: &Path, files: &[PathBuf]) -> Result<Vec<u32>, RegenerateError> {
    let counts = build_counts(files)?;
    write_cache(path, &counts)?;
    info!(path = %path.display(), libraries = files.len(), "regenerated story cache");
    Ok(counts)
}

#[derive(Debug, Error)]
pub enum RegenerateError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        write_cache(&path, &[3, 0, 2]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 12);
        assert_eq!(read_cache(&path, 3).unwrap(), vec![3, 0, 2]);
    }

    #[test]
    fn little_endian_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        write_cache(&path, &[258]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![2, 1, 0, 0]);
    }

    #[test]
    fn missing_cache_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_cache(&dir.path().join(CACHE_FILE_NAME), 1).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn wrong_length_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        write_cache(&path, &[1, 2]).unwrap();
        let err = read_cache(&path, 3).unwrap_err();
        assert!(matches!(
            err,
            CacheError::Corrupt {
                expected: 12,
                found: 8,
                ..
            }
        ));
    }

    #[test]
    fn regenerate_counts_end_tags() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mlb");
        let b = dir.path().join("b.mlb");
        std::fs::write(&a, "One\n\nx\n\nEND STORY\n\nTwo\n\ny\n\nEND STORY\n").unwrap();
        std::fs::write(&b, "Three\r\n\r\nz\r\n\r\nEND STORY\r\n").unwrap();

        let path = dir.path().join(CACHE_FILE_NAME);
        let counts = regenerate_cache(&path, &[a, b]).unwrap();
        assert_eq!(counts, vec![2, 1]);
        assert_eq!(read_cache(&path, 2).unwrap(), vec![2, 1]);
    }

    #[test]
    fn regenerate_fails_on_unreadable_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILE_NAME);
        let result = regenerate_cache(&path, &[dir.path().join("missing.mlb")]);
        assert!(matches!(result, Err(RegenerateError::Library(_))));
        assert!(!path.exists());
    }
}
