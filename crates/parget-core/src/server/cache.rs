//! Per-connection cache of the most recently opened file.

use std::io;
use tokio::fs::File;

struct CachedFile {
    path: String,
    file: File,
}

/// Holds at most one open, read-only file for a single connection.
///
/// The cached path is always the most recently *successfully* opened one.
/// Asking for a different path closes the old handle before opening the new
/// one; a failed open leaves the cache empty.
#[derive(Default)]
pub struct FileCache {
    current: Option<CachedFile>,
}

impl FileCache {
    /// Returns the handle for `path`, opening it if it is not the cached one.
    pub async fn resolve(&mut self, path: &str) -> io::Result<&mut File> {
        let hit = matches!(&self.current, Some(cached) if cached.path == path);
        if !hit {
            if let Some(previous) = self.cached_path() {
                tracing::debug!(previous, path, "closing cached file for new path");
            }
            self.current = None;
            let file = File::open(path).await?;
            tracing::debug!(path, "opened file");
            self.current = Some(CachedFile {
                path: path.to_string(),
                file,
            });
        }
        match self.current.as_mut() {
            Some(cached) => Ok(&mut cached.file),
            None => Err(io::Error::other("no file cached")),
        }
    }

    /// Path of the cached handle, if any.
    pub fn cached_path(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.path.as_str())
    }

    /// Closes the cached handle.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
