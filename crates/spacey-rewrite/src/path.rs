// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Path algebra used by the rewriter.
//!
//! Everything here is lexical: paths are made absolute against the process
//! working directory and `.`/`..` are collapsed, but the file system is never
//! consulted. Three coordinate systems meet in this module: the source tree,
//! the target tree, and each specifier's own relative resolution.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without touching the file system.
///
/// `..` never climbs above a root; a relative path keeps its leading `..`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

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
            c => out.push(c),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Resolve `path` against `base`, producing a normalized absolute path.
///
/// Relative bases are anchored at the current working directory, the way
/// `path.resolve` behaves in Node.js.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    let joined = base.join(path);
    if joined.is_absolute() {
        return normalize(&joined);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(joined)),
        Err(_) => normalize(&joined),
    }
}

/// Relative path leading from directory `from` to `to`.
///
/// Returns an empty path when both are the same location, and `to` itself
/// (absolute) when the two share no common prefix such as a drive letter.
pub fn relative(from: &Path, to: &Path) -> PathBuf {
    let from = resolve(Path::new(""), from);
    let to = resolve(Path::new(""), to);

    if from.components().next() != to.components().next() {
        return to;
    }
    pathdiff::diff_paths(&to, &from).unwrap_or(to)
}

/// Location of `path` (resolved against `root`) relative to `root`, if it
/// does not escape the root. The root itself maps to an empty path.
fn relative_within(root: &Path, path: &Path) -> Option<PathBuf> {
    let rel = relative(root, &resolve(root, path));
    match rel.components().next() {
        None | Some(Component::Normal(_)) => Some(rel),
        _ => None,
    }
}

/// Check if `path` is strictly below `root`.
///
/// `path` is resolved relative to `root`, so both `"lib/a.js"` style and
/// absolute paths are accepted. The root itself is not contained in itself.
pub fn contains(root: &Path, path: &Path) -> bool {
    relative_within(root, path).is_some_and(|rel| rel.components().next().is_some())
}

/// Check if a specifier starts with `./` or `../` (either separator).
pub fn is_relative_specifier(text: &str) -> bool {
    ["./", "../", ".\\", "..\\"]
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

/// Move `path` from under `from_root` to the same relative place under `to_root`.
///
/// Paths that cannot be expressed relative to `from_root` without escaping
/// it are returned unchanged.
pub fn rebase(path: &Path, from_root: &Path, to_root: &Path) -> PathBuf {
    match relative_within(from_root, path) {
        Some(rel) => resolve(to_root, &rel),
        None => path.to_path_buf(),
    }
}

/// Canonical form of a relative specifier: forward slashes, `.`/`..`
/// collapsed, and a leading `./` unless the path climbs with `../`.
pub fn renormalize_specifier(rel: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in rel.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(&last) if last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            p => parts.push(p),
        }
    }

    let mut joined = if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    };
    if !parts.is_empty() && rel.ends_with(['/', '\\']) {
        joined.push('/');
    }

    format!("./{joined}").replacen("./../", "../", 1)
}

/// Render a path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), p("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), p("/a"));
        assert_eq!(normalize(Path::new("../a/../../b")), p("../../b"));
        assert_eq!(normalize(Path::new("a/..")), p("."));
    }

    #[test]
    fn test_resolve_relative_to_base() {
        assert_eq!(resolve(Path::new("/proj/lib"), Path::new("a/b.js")), p("/proj/lib/a/b.js"));
        assert_eq!(resolve(Path::new("/proj/lib"), Path::new("../b.js")), p("/proj/b.js"));
        assert_eq!(resolve(Path::new("/proj/lib"), Path::new("/other/c.js")), p("/other/c.js"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative(Path::new("/proj/lib"), Path::new("/proj/lib/a/b.js")), p("a/b.js"));
        assert_eq!(relative(Path::new("/proj/lib/a"), Path::new("/proj/types.js")), p("../../types.js"));
        assert_eq!(relative(Path::new("/proj/lib"), Path::new("/proj/lib")), p(""));
    }

    #[test]
    fn test_contains() {
        let root = Path::new("/proj/lib");
        assert!(contains(root, Path::new("/proj/lib/index.js")));
        assert!(contains(root, Path::new("util/index.js")));
        assert!(contains(root, Path::new("/proj/lib/a/../b.js")));
        assert!(!contains(root, Path::new("/proj/lib")));
        assert!(!contains(root, Path::new("/proj/src/index.js")));
        assert!(!contains(root, Path::new("../types.js")));
        assert!(!contains(root, Path::new("..")));
        // A sibling whose name merely starts with the root's name
        assert!(!contains(root, Path::new("/proj/library/index.js")));
        // Names beginning with dots are still descendants
        assert!(contains(root, Path::new("..hidden.js")));
    }

    #[test]
    fn test_is_relative_specifier() {
        assert!(is_relative_specifier("./a.js"));
        assert!(is_relative_specifier("../a.js"));
        assert!(is_relative_specifier(".\\a.js"));
        assert!(is_relative_specifier("..\\a.js"));
        assert!(!is_relative_specifier("lodash"));
        assert!(!is_relative_specifier("/abs/a.js"));
        assert!(!is_relative_specifier(".hidden"));
        assert!(!is_relative_specifier("..a"));
    }

    #[test]
    fn test_rebase() {
        let from = Path::new("/proj/src");
        let to = Path::new("/proj/dest");
        assert_eq!(rebase(Path::new("/proj/src/a/file.txt"), from, to), p("/proj/dest/a/file.txt"));
        assert_eq!(rebase(Path::new("file.txt"), from, to), p("/proj/dest/file.txt"));
        assert_eq!(rebase(Path::new("/proj/src/file.txt"), from, from), p("/proj/src/file.txt"));
        // Out of root: unchanged
        assert_eq!(rebase(Path::new("../file.txt"), from, to), p("../file.txt"));
        assert_eq!(rebase(Path::new("/elsewhere/x.js"), from, to), p("/elsewhere/x.js"));
    }

    #[test]
    fn test_renormalize_specifier() {
        assert_eq!(renormalize_specifier("types.js"), "./types.js");
        assert_eq!(renormalize_specifier("../types.js"), "../types.js");
        assert_eq!(renormalize_specifier("./../types.js"), "../types.js");
        assert_eq!(renormalize_specifier("a\\b\\c.js"), "./a/b/c.js");
        assert_eq!(renormalize_specifier("a/./b/../c.js"), "./a/c.js");
        assert_eq!(renormalize_specifier("../../x/y.js"), "../../x/y.js");
        assert_eq!(renormalize_specifier("dir/"), "./dir/");
    }
}
