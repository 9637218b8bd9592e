//! Line-oriented watchlist file writer.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Strips characters that are unsafe in file names on common
/// platforms. Category names regularly contain `/` and friends.
pub fn sanitize_filename(name: &str) -> String {
    name.chars().filter(|c| !r"\/:*?<>|".contains(*c)).collect()
}

pub struct Writer {
    dir: PathBuf,
}

impl Writer {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Writes one watchlist, overwriting any previous run's file. The
    /// lines are fully assembled before this is called, so an
    /// interrupted run never leaves a partial file behind.
    pub fn write(&self, filename: &str, lines: &[String]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating output dir {}", self.dir.display()))?;
        let path = self.dir.join(sanitize_filename(filename));
        let mut body = lines.join("\n");
        body.push('\n');
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        log::info!("writer.saved path={} lines={}", path.display(), lines.len());
        Ok(path)
    }
}
