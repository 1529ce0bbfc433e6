//! Directory-backed animation frames.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name fragment that marks a frame image.
pub const FRAME_EXTENSION: &str = ".bmp";

#[derive(Error, Debug)]
pub enum FrameStoreError {
    #[error("failed to read frame directory {}: {1}", .0.display())]
    ReadDir(PathBuf, std::io::Error),
    #[error("no .bmp files found in {}", .0.display())]
    Empty(PathBuf),
}

/// The frames of one animation in playback order.
///
/// Frames are ordered by plain string comparison of their paths, so `10.bmp`
/// sorts before `2.bmp`. Animations are expected to zero-pad their names.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<PathBuf>,
}

impl FrameSequence {
    /// Scan `dir` for frame files. Fails if none are found.
    pub fn scan(dir: &Path) -> Result<Self, FrameStoreError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| FrameStoreError::ReadDir(dir.to_owned(), e))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(FRAME_EXTENSION))
            .map(|entry| entry.path())
            .collect();

        if frames.is_empty() {
            return Err(FrameStoreError::Empty(dir.to_owned()));
        }
        frames.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.frames.iter().map(PathBuf::as_path)
    }
}

/// List the immediate subdirectories of an animations root, sorted by name.
pub fn list_animations(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    Ok(dirs)
}
