use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// What an archive entry represents on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// A filesystem path paired with the name it will carry inside an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedEntry {
    pub source: PathBuf,
    pub name:   String,
    pub kind:   EntryKind,
}

impl StagedEntry {
    pub fn is_dir(&self) -> bool { self.kind == EntryKind::Directory }
}

/// Expand files and directories into a deduplicated list of archive entries.
///
/// Directories are walked recursively in file-name order. Only directories
/// without children become entries of their own; every other directory is
/// implied by the files below it. Symlinks are reported as such and never
/// followed.
///
/// Names are computed against `base`. Without a base, a plain file is named
/// after its file name and a directory's contents are named relative to the
/// directory's parent, so the directory itself is the top-level component.
pub fn expand_paths<I, P>(paths: I, base: Option<&Path>) -> Result<Vec<StagedEntry>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let metadata = std::fs::symlink_metadata(path).map_err(|source| Error::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

        if !metadata.is_dir() {
            let kind = if metadata.file_type().is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };
            push_entry(&mut entries, &mut seen, path, base, kind);
            continue;
        }

        let walk_base = base.or_else(|| path.parent());
        for entry in WalkDir::new(path).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|source| Error::Walk {
                path: path.to_path_buf(),
                source,
            })?;
            let file_type = entry.file_type();

            let kind = if file_type.is_dir() {
                if !is_empty_dir(entry.path())? {
                    continue;
                }
                EntryKind::Directory
            } else if file_type.is_symlink() {
                EntryKind::Symlink
            } else {
                EntryKind::File
            };
            push_entry(&mut entries, &mut seen, entry.path(), walk_base, kind);
        }
    }

    tracing::trace!(count = entries.len(), "expanded paths");
    Ok(entries)
}

fn push_entry(
    entries: &mut Vec<StagedEntry>,
    seen: &mut HashSet<PathBuf>,
    path: &Path,
    base: Option<&Path>,
    kind: EntryKind,
) {
    let name = relative_name(path, base);
    if name.is_empty() || !seen.insert(path.to_path_buf()) {
        return;
    }
    entries.push(StagedEntry {
        source: path.to_path_buf(),
        name,
        kind,
    });
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut children = std::fs::read_dir(path).map_err(|source| Error::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(children.next().is_none())
}

/// Name of `path` inside an archive: `base` stripped, components joined with `/`.
///
/// Falls back to the file name when no base is given or `path` lies outside it.
pub fn relative_name(path: &Path, base: Option<&Path>) -> String {
    let relative = match base.and_then(|base| path.strip_prefix(base).ok()) {
        Some(relative) => relative,
        None => path.file_name().map(Path::new).unwrap_or(Path::new("")),
    };

    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
