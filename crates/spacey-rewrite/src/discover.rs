// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Expand file globs into the list of files to process

use crate::error::{Result, RewriteError};
use crate::path::{normalize, relative, resolve};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Patterns excluded from every search
pub const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Options for [`find_files`]
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Directory globs are relative to
    pub cwd: PathBuf,
    /// Extra exclusion globs, relative to `cwd`
    pub exclude: Vec<String>,
    /// Drop directories from the results
    pub only_files: bool,
    /// Fail when nothing matches
    pub must_find_files: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            exclude: Vec::new(),
            only_files: true,
            must_find_files: true,
        }
    }
}

impl FindOptions {
    /// Search from `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    /// Add exclusion globs
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Set whether an empty result is an error
    pub fn with_must_find_files(mut self, must: bool) -> Self {
        self.must_find_files = must;
        self
    }
}

/// Expand `globs` into a sorted, de-duplicated list of absolute file paths.
///
/// A glob naming a directory expands to every file below it. Fails with a
/// usage error when nothing matches, unless `must_find_files` is off.
///
/// Walks the file system synchronously; async callers should run it on
/// a blocking thread.
pub fn find_files(globs: &[String], options: &FindOptions) -> Result<Vec<PathBuf>> {
    let cwd = resolve(Path::new(""), &options.cwd);

    let excludes = DEFAULT_EXCLUDES
        .iter()
        .map(|s| s.to_string())
        .chain(options.exclude.iter().cloned())
        .map(|p| Pattern::new(p.trim()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut found = BTreeSet::new();

    for glob in globs.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        let pattern = anchor_pattern(&cwd, glob);
        debug!("Searching {}", pattern);

        for entry in glob::glob_with(&pattern, MATCH_OPTIONS)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if options.only_files && !path.is_file() {
                continue;
            }
            if is_excluded(&cwd, &path, &excludes) {
                continue;
            }
            found.insert(normalize(&path));
        }
    }

    if found.is_empty() && options.must_find_files {
        return Err(RewriteError::usage("No files found."));
    }

    Ok(found.into_iter().collect())
}

/// Absolute pattern for `glob`. A directory becomes a recursive search.
fn anchor_pattern(cwd: &Path, glob: &str) -> String {
    let literal = normalize(&cwd.join(glob));
    if literal.is_dir() {
        let dir = Pattern::escape(&literal.to_string_lossy());
        return format!("{}/**/*", dir.trim_end_matches('/'));
    }

    if Path::new(glob).is_absolute() {
        glob.to_string()
    } else {
        let base = Pattern::escape(&cwd.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), glob.trim_start_matches("./"))
    }
}

/// A path is excluded when it, or any directory above it, matches
fn is_excluded(cwd: &Path, path: &Path, excludes: &[Pattern]) -> bool {
    let rel = relative(cwd, path);
    rel.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .any(|p| excludes.iter().any(|ex| ex.matches_path_with(p, MATCH_OPTIONS)))
}
