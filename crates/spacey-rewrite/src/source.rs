// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loading source files and their companion source maps

use crate::error::{Result, RewriteError};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Marker comment that links a compiled file to its source map
pub const SOURCE_MAP_URL_MARKER: &str = "//# sourceMappingURL=";

/// A loaded source file. Never mutated once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the file
    pub source_path: PathBuf,
    /// File content without its trailing source map marker
    pub content: String,
    /// Companion source map, if the marker pointed at a loadable file
    pub source_map: Option<SourceMapRef>,
}

impl SourceFile {
    /// Build a source file from in-memory content
    pub fn new(source_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            content: content.into(),
            source_map: None,
        }
    }

    /// Attach a companion source map
    pub fn with_source_map(mut self, source_map: SourceMapRef) -> Self {
        self.source_map = Some(source_map);
        self
    }
}

/// Location and raw text of a companion source map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapRef {
    /// Location of the map file
    pub url: Url,
    /// Raw map text
    pub map_content: String,
}

/// Marker found at the end of a file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRef {
    /// Byte offset of the marker in the content
    pub index: usize,
    /// Map location, resolved against the file's own location
    pub url: Url,
}

/// Locate the trailing `//# sourceMappingURL=` marker.
///
/// Only the last marker counts, and only when it starts the final line.
/// URLs that do not resolve to a local file (remote or `data:` URLs) are
/// ignored.
pub fn source_map_marker(filename: &Path, content: &str) -> Option<MarkerRef> {
    let index = content.rfind(SOURCE_MAP_URL_MARKER)?;
    if index > 0 && !content[..index].ends_with('\n') {
        return None;
    }
    let rest = &content[index + SOURCE_MAP_URL_MARKER.len()..];
    let reference = rest.trim_end();
    if reference.is_empty() || reference.contains(['\n', '\r']) {
        return None;
    }

    let base = Url::from_file_path(filename).ok()?;
    let url = base.join(reference).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    Some(MarkerRef { index, url })
}

/// Read a source map, treating a missing or unreadable map as absent
pub async fn read_source_map(url: &Url) -> Option<SourceMapRef> {
    let path = url.to_file_path().ok()?;
    match tokio::fs::read_to_string(&path).await {
        Ok(map_content) => Some(SourceMapRef {
            url: url.clone(),
            map_content,
        }),
        Err(e) => {
            debug!("Source map {} not loaded: {}", path.display(), e);
            None
        }
    }
}

/// Load a file and its companion source map.
///
/// Fails only when the file itself cannot be read. A recognised marker is
/// stripped from the content whether or not its map could be loaded.
pub async fn read_source_file(filename: &Path) -> Result<SourceFile> {
    let content = tokio::fs::read_to_string(filename)
        .await
        .map_err(|e| RewriteError::io(filename, e))?;

    let marker = source_map_marker(filename, &content);
    let source_map = match &marker {
        Some(marker) => read_source_map(&marker.url).await,
        None => None,
    };

    let content = match marker {
        Some(marker) => content[..marker.index].to_string(),
        None => content,
    };

    Ok(SourceFile {
        source_path: filename.to_path_buf(),
        content,
        source_map,
    })
}
