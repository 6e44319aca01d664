//! Copying static files and unprocessed content into the output directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;
use yugo_core::ContentKind;

/// Asset copying errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error on a specific path.
    #[error("failed to copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk error.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Symlinks are never followed or copied.
    #[error("symlinks not handled: {0}")]
    Symlink(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Copy every file under `src` to the same relative path under `dst`.
///
/// With `overwrite` false, files already present in `dst` are left alone, so
/// rendered pages win over static files of the same name. A missing `src`
/// copies nothing. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, overwrite: bool) -> Result<usize> {
    if !src.exists() {
        debug!(dir = %src.display(), "source directory does not exist, skipping");
        return Ok(0);
    }

    copy_matching(src, dst, |path| {
        let out_path = dst.join(rel_of(src, path));
        overwrite || !out_path.exists()
    })
}

/// Copy files under `content_dir` that are not rendered as pages (anything
/// but Markdown and HTML) into `out_dir`, overwriting.
pub fn copy_content(content_dir: &Path, out_dir: &Path) -> Result<usize> {
    if !content_dir.exists() {
        return Ok(0);
    }

    copy_matching(content_dir, out_dir, |path| ContentKind::from_path(path).is_none())
}

fn copy_matching(src: &Path, dst: &Path, mut should_copy: impl FnMut(&Path) -> bool) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();

        if entry.path_is_symlink() {
            return Err(AssetError::Symlink(path.to_path_buf()));
        }
        if !entry.file_type().is_file() || !should_copy(path) {
            continue;
        }

        let out_path = dst.join(rel_of(src, path));
        copy_file(path, &out_path)?;
        copied += 1;
    }

    debug!(src = %src.display(), copied, "copied files");
    Ok(copied)
}

fn rel_of<'a>(base: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(base).unwrap_or(path)
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|source| AssetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::copy(src, dst).map_err(|source| AssetError::Io {
        path: src.to_path_buf(),
        source,
    })?;
    Ok(())
}
