// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module rewriter

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for rewrite operations
pub type Result<T> = std::result::Result<T, RewriteError>;

/// Errors that can occur while rewriting a batch of files
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Caller or input misuse (file outside the root, unsupported type, ...)
    #[error("{0}")]
    Usage(String),

    /// File system error
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid discovery glob
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Path that cannot be turned into a `file:` URL
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

impl RewriteError {
    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error should be reported to the user as a usage error
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::Glob(_))
    }

    /// Whether this is a missing-file error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
