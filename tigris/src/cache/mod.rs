//! Disk cache for downloaded Census archives.
//!
//! Archives are stored by their URL basename under a per-user cache
//! directory (`~/.cache/tigris` on Linux). A cached archive is reused on
//! subsequent requests for the same file; nothing is evicted automatically,
//! since TIGER releases are immutable once published. The CLI exposes
//! `clear` and `stats` for manual housekeeping.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::http::HttpClient;

/// Result of clearing the disk cache.
#[derive(Debug, Clone, Default)]
pub struct ClearResult {
    /// Number of files removed.
    pub files_deleted: usize,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

/// Disk cache rooted at a single directory of downloaded archives.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at the given directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the default cache root for the current user.
    pub fn default_root() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|d| d.join("tigris"))
            .ok_or(Error::NoCacheDir)
    }

    /// Opens a cache at the default per-user location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_root()?))
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the on-disk path an archive URL maps to.
    ///
    /// Archives are keyed by URL basename, matching the layout of the
    /// Census download tree where every file name is globally unique.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        let basename = url.rsplit('/').next().unwrap_or(url);
        self.root.join(basename)
    }

    /// Returns the cached archive for `url`, downloading it first if needed.
    pub fn fetch(&self, url: &str, http: &dyn HttpClient) -> Result<Vec<u8>> {
        let path = self.entry_path(url);

        if path.is_file() {
            debug!(path = %path.display(), "cache hit");
            return Ok(fs::read(&path)?);
        }

        debug!(url, "cache miss, downloading");
        let bytes = http.get(url)?;

        fs::create_dir_all(&self.root)?;
        fs::write(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "archive cached");

        Ok(bytes)
    }

    /// Removes every cached archive.
    pub fn clear(&self) -> Result<ClearResult> {
        let mut result = ClearResult::default();

        if !self.root.is_dir() {
            return Ok(result);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                result.bytes_freed += metadata.len();
                result.files_deleted += 1;
                fs::remove_file(entry.path())?;
            }
        }

        Ok(result)
    }

    /// Returns the number of cached files and their total size in bytes.
    pub fn stats(&self) -> Result<(usize, u64)> {
        let mut files = 0;
        let mut bytes = 0;

        if !self.root.is_dir() {
            return Ok((files, bytes));
        }

        for entry in fs::read_dir(&self.root)? {
            let metadata = entry?.metadata()?;
            if metadata.is_file() {
                files += 1;
                bytes += metadata.len();
            }
        }

        Ok((files, bytes))
    }
}

/// Formats a byte count for human consumption.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
