// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Async file system primitives used by the batch runner

use crate::error::{Result, RewriteError};
use std::path::Path;

/// Create a directory and its parents
pub async fn make_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| RewriteError::io(dir, e))
}

async fn make_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => make_dir(parent).await,
        _ => Ok(()),
    }
}

/// Write a file, creating its directory first
pub async fn write_file(path: &Path, content: &str) -> Result<()> {
    make_parent_dir(path).await?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| RewriteError::io(path, e))
}

/// Copy a file, creating the destination directory first
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    make_parent_dir(to).await?;
    tokio::fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| RewriteError::io(from, e))
}

/// Remove a file. A file that is already gone is not an error.
pub async fn remove_file(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RewriteError::io(path, e)),
    }
}
