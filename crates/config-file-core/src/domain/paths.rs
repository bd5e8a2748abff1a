//! Lexical path helpers for rendering file paths in log events.
//!
//! These never touch the file system: symlinks are not resolved and the
//! paths need not exist.

use std::path::{Component, Path, PathBuf};

/// Joins `path` onto `base` when it is relative, then normalises `.` and
/// `..` components.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Removes `.` components and folds `..` into the preceding normal component.
///
/// A `..` that would climb above the root is dropped for absolute paths and
/// kept for relative ones.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Expresses `path` relative to `root`, the way `path.relative` would.
///
/// Both arguments should already be absolute.  When they share no common
/// prefix (different Windows drives) `path` is returned unchanged.
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    let path = normalize(path);
    let root = normalize(root);

    let path_parts: Vec<_> = path.components().collect();
    let root_parts: Vec<_> = root.components().collect();

    let common = path_parts
        .iter()
        .zip(root_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && path.has_root() {
        return path;
    }

    let mut relative = PathBuf::new();
    for _ in common..root_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}
