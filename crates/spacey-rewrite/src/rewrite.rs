// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The rewrite engine.
//!
//! Given a loaded [`SourceFile`] and a [`RewritePolicy`], the engine checks
//! that the file may be rewritten, computes its destination, rewrites every
//! relative `import`/`export`/`require` specifier and relocates the companion
//! source map. It performs no I/O: the caller decides what to write.

use crate::error::{Result, RewriteError};
use crate::family::ModuleFamily;
use crate::patch::TextPatch;
use crate::path::{contains, rebase, relative, renormalize_specifier, resolve};
use crate::scan::{SpecifierReference, scan_import_export, scan_require};
use crate::source::{SOURCE_MAP_URL_MARKER, SourceFile, SourceMapRef};
use crate::sourcemap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Callback receiving warnings about tolerated out-of-root references
pub type WarningHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// How files are rewritten. Read-only during a rewrite.
#[derive(Clone)]
pub struct RewritePolicy {
    /// Directory whose files may be rewritten
    pub source_root: PathBuf,
    /// Directory the rewritten files are placed in
    pub target_root: PathBuf,
    /// Module system to convert to
    pub family: ModuleFamily,
    /// Warn instead of failing on specifiers that leave the source root
    pub allow_references_outside_root: bool,
    /// Leave every TypeScript input out of scope
    pub skip_typescript_sources: bool,
    on_warning: WarningHandler,
}

impl fmt::Debug for RewritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewritePolicy")
            .field("source_root", &self.source_root)
            .field("target_root", &self.target_root)
            .field("family", &self.family)
            .field("allow_references_outside_root", &self.allow_references_outside_root)
            .field("skip_typescript_sources", &self.skip_typescript_sources)
            .finish_non_exhaustive()
    }
}

impl RewritePolicy {
    /// Create a policy that enforces the root and converts TypeScript inputs.
    ///
    /// Warnings go to `tracing` until a handler is set with [`Self::with_warning`].
    pub fn new(
        source_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        family: ModuleFamily,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            family,
            allow_references_outside_root: false,
            skip_typescript_sources: false,
            on_warning: Arc::new(|msg| tracing::warn!("{}", msg)),
        }
    }

    /// Allow (with a warning) specifiers that leave the source root
    pub fn with_outside_root_references(mut self, allow: bool) -> Self {
        self.allow_references_outside_root = allow;
        self
    }

    /// Exclude TypeScript inputs
    pub fn with_skip_typescript(mut self, skip: bool) -> Self {
        self.skip_typescript_sources = skip;
        self
    }

    /// Set the warning callback
    pub fn with_warning(mut self, handler: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_warning = Arc::new(handler);
        self
    }

    /// Deliver a warning
    pub fn warn(&self, msg: &str) {
        (self.on_warning)(msg);
    }

    /// Whether `path` is in scope for this policy's family
    pub fn is_supported(&self, path: &Path) -> bool {
        self.family.is_supported(path, self.skip_typescript_sources)
    }

    /// Renamed and rebased location of `path`
    pub fn destination_name(&self, path: &Path) -> PathBuf {
        rebase(&self.family.rename(path), &self.source_root, &self.target_root)
    }
}

/// A recomputed companion source map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedSourceMap {
    /// Where the map is to be written
    pub new_url: Url,
    /// Where the original map was read from
    pub old_url: Url,
    /// New map text
    pub map_content: String,
}

/// Outcome of a rewrite that produced content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    /// Destination path
    pub new_path: PathBuf,
    /// Source path
    pub old_path: PathBuf,
    /// New content, with a source map marker when a map is present
    pub content: String,
    /// Number of specifiers rewritten, `None` when there were none
    pub lines_changed: Option<usize>,
    /// Relocated companion map
    pub adjusted_source_map: Option<AdjustedSourceMap>,
}

/// Outcome of [`rewrite_source_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// New content was produced
    Rewritten(RewriteResult),
    /// The destination is the source itself; nothing to do
    Skipped,
}

/// A single file the caller has to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    /// Destination path
    pub path: PathBuf,
    /// Path the content came from
    pub old_path: PathBuf,
    /// Content to write
    pub content: String,
    /// Number of edits made, zero for a plain rename
    pub lines_changed: usize,
}

impl RewriteResult {
    /// Write instructions: the rewritten file, then its map if there is one
    pub fn outputs(&self) -> Result<Vec<FileOutput>> {
        let mut outputs = vec![FileOutput {
            path: self.new_path.clone(),
            old_path: self.old_path.clone(),
            content: self.content.clone(),
            lines_changed: self.lines_changed.unwrap_or(0),
        }];

        if let Some(map) = &self.adjusted_source_map {
            outputs.push(FileOutput {
                path: url_to_path(&map.new_url)?,
                old_path: url_to_path(&map.old_url)?,
                content: map.map_content.clone(),
                lines_changed: 1,
            });
        }

        Ok(outputs)
    }
}

fn url_to_path(url: &Url) -> Result<PathBuf> {
    url.to_file_path()
        .map_err(|_| RewriteError::InvalidPath(PathBuf::from(url.as_str())))
}

/// Rewrite one file according to `policy`.
///
/// Fails with a usage error when the file is outside the source root, has
/// an unsupported extension, or (unless allowed) references a file outside
/// the root. Returns [`Rewrite::Skipped`] when the file already sits at its
/// destination.
pub fn rewrite_source_file(src: &SourceFile, policy: &RewritePolicy) -> Result<Rewrite> {
    let source_path = resolve(&policy.source_root, &src.source_path);

    if !contains(&policy.source_root, &source_path) {
        return Err(RewriteError::usage("Must be under root."));
    }
    if !policy.is_supported(&source_path) {
        return Err(RewriteError::usage(
            policy.family.unsupported_message(policy.skip_typescript_sources),
        ));
    }

    let new_path = policy.destination_name(&source_path);
    if new_path == source_path {
        debug!("{} is already at its destination", source_path.display());
        return Ok(Rewrite::Skipped);
    }

    let mut references = scan_import_export(&src.content);
    references.extend(scan_require(&src.content));

    let mut patch = TextPatch::new();
    for reference in &references {
        let span = reference.byte_start..reference.byte_end;
        if patch.overlaps(&span) {
            debug!("Ignoring overlapping specifier {}", reference.raw_text);
            continue;
        }
        let replacement = relocate_specifier(reference, &source_path, policy)?;
        debug!(
            "{} {} -> {} in {}",
            reference.kind,
            reference.raw_text,
            replacement,
            source_path.display()
        );
        patch.replace(span, replacement);
    }

    let content = if patch.is_empty() {
        src.content.clone()
    } else {
        patch.apply(&src.content)
    };

    let adjusted_source_map = match &src.source_map {
        Some(map) => Some(relocate_source_map(map, &patch, &src.content, &new_path, policy)?),
        None => None,
    };

    let content = match &adjusted_source_map {
        Some(_) => append_source_map_marker(content, &new_path),
        None => content,
    };

    Ok(Rewrite::Rewritten(RewriteResult {
        new_path,
        old_path: source_path,
        content,
        lines_changed: (!patch.is_empty()).then_some(patch.len()),
        adjusted_source_map,
    }))
}

/// New text for a specifier once its file has moved.
///
/// Specifiers inside the source root move along with the file and get the
/// family's extension. Specifiers leaving the root keep pointing at the
/// original location and keep their extension, since the type of the file
/// they name is unknown here.
pub fn relocate_specifier(
    reference: &SpecifierReference,
    source_path: &Path,
    policy: &RewritePolicy,
) -> Result<String> {
    let current_dir = source_path.parent().unwrap_or(source_path);
    let raw = reference.raw_text.replace('\\', "/");
    let target = resolve(current_dir, Path::new(&raw));
    let inside = contains(&policy.source_root, &target);

    if !inside {
        let message = format!(
            "Import of a file outside of the root. {}: ({}) Source: ({})",
            reference.kind,
            reference.raw_text,
            relative(&policy.source_root, source_path).display()
        );
        if !policy.allow_references_outside_root {
            return Err(RewriteError::Usage(message));
        }
        policy.warn(&message);
    }

    let rel = if inside {
        relative(current_dir, &target)
    } else {
        let moved = rebase(source_path, &policy.source_root, &policy.target_root);
        let new_dir = moved.parent().unwrap_or(&moved);
        relative(new_dir, &target)
    };
    if rel.is_absolute() {
        return Ok(reference.raw_text.clone());
    }

    let specifier = renormalize_specifier(&rel.to_string_lossy());
    Ok(if inside {
        policy.family.convert_specifier(&specifier)
    } else {
        specifier
    })
}

fn relocate_source_map(
    map: &SourceMapRef,
    patch: &TextPatch,
    original: &str,
    new_path: &Path,
    policy: &RewritePolicy,
) -> Result<AdjustedSourceMap> {
    let mut map_path = new_path.as_os_str().to_owned();
    map_path.push(".map");
    let new_map_path = PathBuf::from(map_path);
    let new_url = Url::from_file_path(&new_map_path)
        .map_err(|_| RewriteError::InvalidPath(new_map_path.clone()))?;

    let old_map_path = map.url.to_file_path().ok();
    let old_dir = old_map_path.as_deref().and_then(Path::parent);
    let new_dir = new_map_path.parent().unwrap_or(&new_map_path);
    let file_name = new_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let shifts = patch.column_shifts(original);
    let map_content = match sourcemap::relocate(&map.map_content, old_dir, new_dir, &file_name, &shifts) {
        Ok(content) => content,
        Err(e) => {
            policy.warn(&format!("Unable to update source map ({}): {}", map.url, e));
            map.map_content.clone()
        }
    };

    Ok(AdjustedSourceMap {
        new_url,
        old_url: map.url.clone(),
        map_content,
    })
}

fn append_source_map_marker(mut content: String, new_path: &Path) -> String {
    let name = new_path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(SOURCE_MAP_URL_MARKER);
    content.push_str(&name);
    content.push_str(".map");
    content
}
