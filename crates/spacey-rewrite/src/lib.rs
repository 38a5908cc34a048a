// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-rewrite
//!
//! Turns compiled JavaScript/TypeScript output into explicit ES module
//! (`.mjs`/`.mts`) or CommonJS (`.cjs`/`.cts`) files.
//!
//! For every file in scope the rewriter:
//!
//! - renames it to the family's extension, optionally moving it from a
//!   source root into an output directory
//! - rewrites relative `import`/`export ... from` and `require()`
//!   specifiers so they still resolve from the new location
//! - relocates the companion source map and points the
//!   `//# sourceMappingURL=` marker at it
//!
//! Files that are not in scope are copied to the output directory as-is.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacey_rewrite::{BatchOptions, FindOptions, TracingReporter, find_files, process_files};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> spacey_rewrite::Result<()> {
//!     let files = find_files(&["lib".into()], &FindOptions::new("."))?;
//!     let options = BatchOptions::new(".").with_root("lib").with_output("out/esm");
//!     process_files(&files, &options, Arc::new(TracingReporter)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod discover;
pub mod error;
pub mod family;
pub mod fs;
pub mod latch;
pub mod patch;
pub mod path;
pub mod rewrite;
pub mod scan;
pub mod source;
pub mod sourcemap;

// Re-exports
pub use batch::{BatchOptions, BatchSummary, Reporter, TracingReporter, process_files};
pub use discover::{FindOptions, find_files};
pub use error::{Result, RewriteError};
pub use family::ModuleFamily;
pub use rewrite::{Rewrite, RewritePolicy, RewriteResult, rewrite_source_file};
pub use source::{SourceFile, read_source_file};

/// Version of the rewriter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
