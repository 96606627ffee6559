//! On-disk PNG cache keyed by FEN text and orientation.
//! No locking: two identical requests may both render and write the same
//! file. Output is deterministic, so the loser only wastes work. Entries are
//! written to a private sibling file and renamed into place, so readers only
//! ever see complete PNGs.

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::Orientation;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `rnbqkbnr/pppppppp/... w KQkq - 0 1` + flipped -> `rnbqkbnr-pppppppp-... w KQkq - 0 1-1.png`
pub fn cache_filename(fen: &str, orientation: Orientation) -> String {
    format!("{}-{}.png", fen.replace('/', "-"), orientation.flag())
}

#[derive(Clone, Debug)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    /// Opens the cache, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, fen: &str, orientation: Orientation) -> PathBuf {
        self.dir.join(cache_filename(fen, orientation))
    }

    /// Returns the PNG bytes for `fen`, calling `render` and saving its result
    /// first when the file is not cached yet.
    pub fn get_or_render<F>(&self, fen: &str, orientation: Orientation, render: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Result<RgbaImage>,
    {
        let path = self.path_for(fen, orientation);

        if path.exists() {
            return fs::read(&path)
                .with_context(|| format!("Failed to read cached image {}", path.display()));
        }

        let mut png = Vec::new();
        render()?
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("Failed to encode PNG")?;
        self.store(&path, &png)?;
        Ok(png)
    }

    /// Writes `png` next to `path` under a name unique to this process and
    /// call, then renames it over `path`.
    fn store(&self, path: &Path, png: &[u8]) -> Result<()> {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp = self.dir.join(format!(".{}.{}.tmp", std::process::id(), n));

        fs::write(&temp, png).with_context(|| format!("Failed to write {}", temp.display()))?;
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(e).with_context(|| format!("Failed to move image into {}", path.display()));
        }
        Ok(())
    }
}
