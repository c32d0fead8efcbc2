//! Temporary staging of uploaded images.
//!
//! The CLIP preprocessor reads images from disk, so an upload is written under
//! `<media_root>/temp/` for the duration of one search. [`StagedUpload`] owns
//! that file and removes it when dropped, whichever way the request ends.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Name of the staging directory under the media root
pub const TEMP_DIR_NAME: &str = "temp";

const MAX_NAME_LENGTH: usize = 100;

/// An uploaded file on disk, deleted on drop
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
}

impl StagedUpload {
    /// Writes `bytes` to `<media_root>/temp/<uuid>-<sanitized name>`,
    /// creating the directory if needed.
    pub fn write(media_root: &Path, original_name: &str, bytes: &[u8]) -> io::Result<Self> {
        let dir = media_root.join(TEMP_DIR_NAME);
        fs::create_dir_all(&dir)?;

        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
        let path = dir.join(file_name);
        fs::write(&path, bytes)?;

        debug!(path = %path.display(), size = bytes.len(), "Staged uploaded image");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload"),
        }
    }
}

/// Keeps the last path segment of a client-supplied file name and replaces
/// anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LENGTH)
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
