/// Story library files: discovery, loading and end-tag counting.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::parser::END_TAG;

/// File extension of story libraries.
pub const LIBRARY_EXTENSION: &str = "mlb";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("could not read story library {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no .{extension} story files found in {dir}")]
    NoLibraryFiles { dir: PathBuf, extension: String },
}

/// List every `*.{extension}` file in `dir`, sorted by name.
pub fn find_library_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LibraryError> {
    let no_files = || LibraryError::NoLibraryFiles {
        dir: dir.to_path_buf(),
        extension: extension.to_string(),
    };

    // An unreadable directory is reported the same way as an empty one
    let entries = std::fs::read_dir(dir).map_err(|_| no_files())?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(extension))
        .collect();

    if files.is_empty() {
        return Err(no_files());
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(count = files.len(), dir = %dir.display(), "found story libraries");
    Ok(files)
}

/// Convert CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read a whole library file, ready for the parser.
///
/// Invalid UTF-8 is replaced rather than rejected; libraries are
/// hand-written text files.
pub fn read_library(path: &Path) -> Result<String, LibraryError> {
    let bytes = std::fs::read(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(normalize_line_endings(&text))
}

/// Count the stories in a library by its end tags, without parsing it.
pub fn count_stories(text: &str) -> u32 {
    text.matches(END_TAG).count() as u32
}
