use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Symlink hops followed while resolving one path, as on Linux.
const MAX_SYMLINK_FOLLOWS: usize = 40;

/// Resolve an entry path under `base`, rejecting anything that would land outside it.
///
/// This is a lexical check only; see [`ensure_confined`] for links already on disk.
pub fn sanitize_path<P: AsRef<Path>, B: AsRef<Path>>(entry_path: P, base: B) -> Result<PathBuf> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();
    let normalized = normalize_path(entry_path);

    // Reject absolute paths (zip-slip protection)
    if normalized.is_absolute() || normalized.has_root() {
        return Err(Error::ZipSlip {
            entry:    entry_path.to_path_buf(),
            resolved: normalized,
        });
    }

    let resolved = normalize_path(&base.join(&normalized));
    if !resolved.starts_with(normalize_path(base)) {
        return Err(Error::ZipSlip {
            entry: entry_path.to_path_buf(),
            resolved,
        });
    }

    Ok(resolved)
}

/// Check that `path`, with every symlink already on disk followed, stays under `base`.
pub fn ensure_confined<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> Result<()> {
    let path = path.as_ref();
    let resolved = resolve_on_disk(path);
    if !resolved.starts_with(resolve_on_disk(base.as_ref())) {
        return Err(Error::ZipSlip {
            entry: path.to_path_buf(),
            resolved,
        });
    }
    Ok(())
}

/// Validate a symlink target: it must be relative and stay under `base`
/// once resolved against the link's own directory, following any links
/// that directory or the target already pass through.
pub fn sanitize_symlink_target<P: AsRef<Path>, L: AsRef<Path>, B: AsRef<Path>>(
    target: P,
    symlink_location: L,
    base: B,
) -> Result<PathBuf> {
    let target = target.as_ref();
    let symlink_location = symlink_location.as_ref();
    let base = resolve_on_disk(base.as_ref());

    if target.is_absolute() || target.has_root() {
        return Err(Error::AbsoluteSymlinkTarget {
            target:  target.to_path_buf(),
            symlink: symlink_location.to_path_buf(),
        });
    }

    let joined = symlink_location
        .parent()
        .map(|p| p.join(target))
        .unwrap_or_else(|| target.to_path_buf());
    let final_path = resolve_on_disk(&joined);

    if !final_path.starts_with(&base) {
        return Err(Error::SymlinkEscape {
            target:   target.to_path_buf(),
            resolved: final_path,
        });
    }

    Ok(final_path)
}

/// Resolve `path` the way the filesystem would.
///
/// Symlinks that exist are followed, dangling ones included; components
/// that do not exist yet are taken as written. The result is absolute.
fn resolve_on_disk(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut follows = 0;
    resolve_components(&absolute, &mut follows)
}

fn resolve_components(path: &Path, follows: &mut usize) -> PathBuf {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            Component::Normal(part) => {
                resolved.push(part);
                if *follows >= MAX_SYMLINK_FOLLOWS {
                    continue;
                }
                if let Ok(link) = std::fs::read_link(&resolved) {
                    *follows += 1;
                    let parent = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
                    resolved = resolve_components(&parent.join(link), follows);
                }
            }
            Component::RootDir | Component::Prefix(_) => resolved.push(component.as_os_str()),
        }
    }

    resolved
}

/// Resolve `.` and `..` lexically.
///
/// A `..` that would climb above a relative path's start is kept so callers
/// can detect the escape.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                let popped = matches!(result.components().next_back(), Some(Component::Normal(_)))
                    && result.pop();
                if !popped && !result.has_root() {
                    result.push("..");
                }
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(Component::RootDir.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
