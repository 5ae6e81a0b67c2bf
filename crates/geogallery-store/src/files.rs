//! Backing photo files on the local filesystem.

use std::io;
use std::path::PathBuf;

use reqwest::Url;
use tracing::debug;

/// Outcome of removing a photo's backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRemoval {
    /// The file existed and was deleted.
    Removed,
    /// Nothing was at the path.
    AlreadyAbsent,
    /// The URI does not point into the local filesystem.
    NotLocal,
}

/// Resolve a stored file URI to a local path.
///
/// Plain paths and `file:` URIs are local; the latter are percent-decoded
/// (`my%20photo.jpg` is `my photo.jpg` on disk). Any other `scheme://` URI
/// (`content://`, `https://`) is not, and yields `None`.
pub fn local_path(uri: &str) -> Option<PathBuf> {
    if uri.trim().is_empty() {
        return None;
    }

    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .ok()
            .filter(|path| path.file_name().is_some()),
        Ok(_) if uri.contains("://") => None,
        // Plain paths, including ones with a colon such as `C:\photos`
        _ => Some(PathBuf::from(uri)),
    }
}

/// Delete the file behind `uri`. Idempotent.
///
/// Returns an error only when a local file exists but cannot be removed.
pub fn remove_photo_file(uri: &str) -> io::Result<FileRemoval> {
    let Some(path) = local_path(uri) else {
        debug!("Skipping removal of non-local file {}", uri);
        return Ok(FileRemoval::NotLocal);
    };

    match std::fs::remove_file(&path) {
        Ok(()) => {
            debug!("Removed photo file {}", path.display());
            Ok(FileRemoval::Removed)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileRemoval::AlreadyAbsent),
        Err(e) => Err(e),
    }
}
