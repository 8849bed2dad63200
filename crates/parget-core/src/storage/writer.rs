//! Offset writer for the destination file.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::fs::FileExt;

/// Writes chunks into the preallocated destination file.
///
/// Deliberately not `Clone`: exactly one owner (the merge writer) touches the
/// file for the whole transfer.
pub struct StorageWriter {
    file: File,
    path: PathBuf,
}

impl StorageWriter {
    pub(crate) fn from_file_and_path(file: File, path: PathBuf) -> Self {
        Self { file, path }
    }

    /// Write all of `data` at `offset`.
    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.file
            .write_all_at(data, offset)
            .with_context(|| format!("write of {} bytes at offset {} failed", data.len(), offset))
    }

    /// Seek + write for platforms without positional writes.
    #[cfg(not(unix))]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        let mut f = &self.file;
        f.seek(SeekFrom::Start(offset))
            .with_context(|| format!("seek to offset {} failed", offset))?;
        f.write_all(data)
            .with_context(|| format!("write of {} bytes at offset {} failed", data.len(), offset))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush file data to disk and close the file.
    pub fn finish(self) -> Result<()> {
        self.file
            .sync_all()
            .with_context(|| format!("failed to sync {}", self.path.display()))?;
        Ok(())
    }
}
