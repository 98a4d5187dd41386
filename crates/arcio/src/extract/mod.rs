//! Archive extraction for ZIP and TAR formats.
//!
//! Each format exposes an [`EntrySource`] that walks its entries in archive
//! order; [`extract`] sanitizes every entry path against the destination and
//! writes it to disk.
//!
//! # Platform Behavior
//!
//! **Unix**: file mode bits recorded in the archive are restored, with the
//! owner always granted read and write access.
//!
//! **Windows (non-Unix)**: mode bits are ignored.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::sanitize::{ensure_confined, sanitize_path, sanitize_symlink_target};

mod tar;
mod zip;

pub use self::tar::TarSource;
pub use self::zip::ZipSource;

/// An entry read from an archive but not yet written to disk.
pub struct PendingEntry<'a> {
    pub original_path: PathBuf,
    pub mode: Option<u32>,
    pub kind: PendingKind<'a>,
}

pub enum PendingKind<'a> {
    File(&'a mut dyn Read),
    Directory,
    Symlink { target: PathBuf },
}

/// Archive-specific entry source.
///
/// Entries of a streaming format can only be read while the archive cursor
/// sits on them, so sources drive a visitor instead of handing out an iterator.
pub trait EntrySource {
    fn visit(&mut self, visitor: &mut dyn FnMut(PendingEntry<'_>) -> Result<()>) -> Result<()>;
    fn format(&self) -> ArchiveFormat;
}

/// Write every entry of `source` below `destination`.
///
/// Returns the extracted paths in archive order.
pub fn extract<S: EntrySource + ?Sized>(source: &mut S, destination: &Path) -> Result<Vec<PathBuf>> {
    ensure_directory(destination)?;
    let mut extracted = Vec::new();

    source.visit(&mut |mut pending| {
        let resolved = sanitize_path(&pending.original_path, destination)?;
        write_entry(&mut pending, &resolved, destination)?;
        extracted.push(resolved);
        Ok(())
    })?;

    tracing::debug!(
        format = source.format().extension(),
        entries = extracted.len(),
        destination = %destination.display(),
        "extracted archive"
    );
    Ok(extracted)
}

fn write_entry(pending: &mut PendingEntry<'_>, target_path: &Path, base: &Path) -> Result<()> {
    tracing::trace!(entry = %pending.original_path.display(), "extracting entry");
    // Links written by earlier entries may redirect any path below `base`.
    match &pending.kind {
        PendingKind::Symlink { .. } => ensure_confined(target_path.parent().unwrap_or(base), base)?,
        _ => ensure_confined(target_path, base)?,
    }

    match &mut pending.kind {
        PendingKind::File(reader) => {
            write_file(&mut **reader, target_path)?;
            if let Some(mode) = pending.mode {
                apply_mode(target_path, mode)?;
            }
            Ok(())
        }
        PendingKind::Directory => ensure_directory(target_path),
        PendingKind::Symlink { target } => {
            sanitize_symlink_target(&*target, target_path, base)?;
            ensure_parent(target_path)?;
            write_symlink(target, target_path)
        }
    }
}

fn write_file(reader: &mut dyn Read, target_path: &Path) -> Result<()> {
    ensure_parent(target_path)?;
    let extraction_failed = |source| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(target_path).map_err(extraction_failed)?;
    std::io::copy(reader, &mut file).map_err(extraction_failed)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => ensure_directory(parent),
        None => Ok(()),
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
            path:   path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode((mode & 0o7777) | 0o600);
    std::fs::set_permissions(path, perms).map_err(|e| Error::ExtractionFailed {
        path:   path.to_path_buf(),
        source: e,
    })
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<()> { Ok(()) }

#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::unix::fs::symlink;
    symlink(target, link).map_err(|e| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link:   link.to_path_buf(),
        source: e,
    })
}

#[cfg(windows)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::windows::fs;
    let resolved = link.parent().map(|p| p.join(target)).unwrap_or_else(|| target.to_path_buf());
    let created = if resolved.is_dir() {
        fs::symlink_dir(target, link)
    } else {
        fs::symlink_file(target, link)
    };
    created.map_err(|e| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link:   link.to_path_buf(),
        source: e,
    })
}
