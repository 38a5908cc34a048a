// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Batch processing of discovered files.
//!
//! Files in scope are rewritten, everything else under the root is copied
//! to the output directory. Tasks run concurrently and share a
//! [`WriteLatch`], so a copy never clobbers a rewritten file that lands on
//! the same destination.

use crate::error::{Result, RewriteError};
use crate::family::ModuleFamily;
use crate::fs;
use crate::latch::WriteLatch;
use crate::path::{contains, rebase, relative, resolve};
use crate::rewrite::{Rewrite, RewritePolicy, rewrite_source_file};
use crate::source::read_source_file;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, instrument};

/// Receives user-facing progress lines and warnings
pub trait Reporter: Send + Sync {
    /// One line of progress, e.g. `lib/a.js -> lib/a.mjs Updated`
    fn progress(&self, message: &str);

    /// A tolerated problem
    fn warning(&self, message: &str);
}

/// Reporter that forwards everything to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn progress(&self, message: &str) {
        info!("{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Batch configuration
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory relative paths are resolved against
    pub cwd: PathBuf,
    /// Source root, defaults to `cwd`
    pub root: Option<PathBuf>,
    /// Output directory, defaults to the source root
    pub output: Option<PathBuf>,
    /// Module system to convert to
    pub family: ModuleFamily,
    /// Report what would happen without touching the file system
    pub dry_run: bool,
    /// Remove originals once rewritten
    pub remove_source: bool,
    /// Warn instead of failing on specifiers that leave the root
    pub allow_references_outside_root: bool,
    /// Leave TypeScript inputs alone
    pub skip_ts: bool,
    /// Maximum number of files processed at once
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            root: None,
            output: None,
            family: ModuleFamily::default(),
            dry_run: false,
            remove_source: false,
            allow_references_outside_root: false,
            skip_ts: false,
            concurrency: num_cpus::get() * 2,
        }
    }
}

impl BatchOptions {
    /// Options resolving against `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    /// Set the source root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the output directory
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the target module system
    pub fn with_family(mut self, family: ModuleFamily) -> Self {
        self.family = family;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable removal of rewritten originals
    pub fn with_remove_source(mut self, remove: bool) -> Self {
        self.remove_source = remove;
        self
    }

    /// Tolerate specifiers that leave the root
    pub fn with_outside_root_references(mut self, allow: bool) -> Self {
        self.allow_references_outside_root = allow;
        self
    }

    /// Leave TypeScript inputs alone
    pub fn with_skip_ts(mut self, skip: bool) -> Self {
        self.skip_ts = skip;
        self
    }

    /// Set the concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Absolute source root
    pub fn source_root(&self) -> PathBuf {
        let cwd = resolve(Path::new(""), &self.cwd);
        match &self.root {
            Some(root) => resolve(&cwd, root),
            None => cwd,
        }
    }

    /// Absolute output directory
    pub fn target_root(&self) -> PathBuf {
        let cwd = resolve(Path::new(""), &self.cwd);
        match &self.output {
            Some(output) => resolve(&cwd, output),
            None => self.source_root(),
        }
    }
}

/// What a batch did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files rewritten to a new location
    pub rewritten: usize,
    /// Files copied unchanged
    pub copied: usize,
    /// Files left alone
    pub skipped: usize,
    /// Originals removed
    pub removed: usize,
}

#[derive(Debug, Default)]
struct BatchStats {
    rewritten: AtomicUsize,
    copied: AtomicUsize,
    skipped: AtomicUsize,
    removed: AtomicUsize,
}

impl BatchStats {
    fn inc(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BatchSummary {
        BatchSummary {
            rewritten: self.rewritten.load(Ordering::Relaxed),
            copied: self.copied.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
        }
    }
}

enum Task {
    Rewrite(PathBuf),
    Copy(PathBuf),
}

impl Task {
    fn path(&self) -> &Path {
        match self {
            Task::Rewrite(path) | Task::Copy(path) => path,
        }
    }
}

struct Batch<'a> {
    options: &'a BatchOptions,
    cwd: PathBuf,
    from_dir: PathBuf,
    to_dir: PathBuf,
    policy: RewritePolicy,
    reporter: Arc<dyn Reporter>,
    latch: WriteLatch,
    stats: BatchStats,
    removals: Mutex<Vec<PathBuf>>,
}

/// Rewrite or copy every file in `files`.
///
/// Files outside the source root are ignored. Every task runs to completion
/// even when some fail; the first usage error (or else the first error) is
/// returned and the others are logged. Originals are removed only after all
/// tasks succeeded.
#[instrument(skip_all, fields(files = files.len()))]
pub async fn process_files(
    files: &[PathBuf],
    options: &BatchOptions,
    reporter: Arc<dyn Reporter>,
) -> Result<BatchSummary> {
    let cwd = resolve(Path::new(""), &options.cwd);
    let from_dir = options.source_root();
    let to_dir = options.target_root();

    let warnings = reporter.clone();
    let policy = RewritePolicy::new(&from_dir, &to_dir, options.family)
        .with_outside_root_references(options.allow_references_outside_root)
        .with_skip_typescript(options.skip_ts)
        .with_warning(move |msg| warnings.warning(msg));

    let batch = Batch {
        options,
        cwd: cwd.clone(),
        from_dir,
        to_dir,
        policy,
        reporter,
        latch: WriteLatch::new(),
        stats: BatchStats::default(),
        removals: Mutex::new(Vec::new()),
    };

    let mut rewrites = Vec::new();
    let mut copies = Vec::new();
    for file in files {
        let file = resolve(&cwd, file);
        if !contains(&batch.from_dir, &file) {
            debug!("Ignoring {} outside of {}", file.display(), batch.from_dir.display());
            BatchStats::inc(&batch.stats.skipped);
            continue;
        }
        if batch.policy.is_supported(&file) {
            rewrites.push(Task::Rewrite(file));
        } else {
            copies.push(Task::Copy(file));
        }
    }

    info!(
        "Processing {} files ({} to rewrite) from {} to {}",
        rewrites.len() + copies.len(),
        rewrites.len(),
        batch.from_dir.display(),
        batch.to_dir.display()
    );

    let batch = &batch;
    let results: Vec<(PathBuf, Result<()>)> = stream::iter(rewrites.into_iter().chain(copies))
        .map(|task| async move {
            let path = task.path().to_path_buf();
            let result = match &task {
                Task::Rewrite(file) => batch.rewrite(file).await,
                Task::Copy(file) => batch.copy(file).await,
            };
            (path, result)
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let mut errors: Vec<(PathBuf, RewriteError)> = results
        .into_iter()
        .filter_map(|(path, result)| result.err().map(|e| (path, e)))
        .collect();

    if !errors.is_empty() {
        let index = errors.iter().position(|(_, e)| e.is_usage()).unwrap_or(0);
        let (_, first) = errors.remove(index);
        for (path, e) in &errors {
            error!("{}: {}", batch.display(path), e);
        }
        if batch.options.remove_source {
            info!("Not removing sources after failures");
        }
        return Err(first);
    }

    batch.remove_sources().await?;

    let summary = batch.stats.snapshot();
    info!(
        "Rewritten: {}, Copied: {}, Skipped: {}, Removed: {}",
        summary.rewritten, summary.copied, summary.skipped, summary.removed
    );
    Ok(summary)
}

impl Batch<'_> {
    fn display(&self, path: &Path) -> String {
        relative(&self.cwd, path).display().to_string()
    }

    async fn rewrite(&self, file: &Path) -> Result<()> {
        let src = read_source_file(file).await?;
        let result = match rewrite_source_file(&src, &self.policy)? {
            Rewrite::Rewritten(result) => result,
            Rewrite::Skipped => {
                BatchStats::inc(&self.stats.skipped);
                return Ok(());
            }
        };

        let outputs = result.outputs()?;
        for (i, output) in outputs.iter().enumerate() {
            let label = if i == 0 && result.lines_changed.is_some() {
                "Updated"
            } else {
                "Generated"
            };
            self.reporter.progress(&format!(
                "{} -> {} {}",
                self.display(&output.old_path),
                self.display(&output.path),
                label
            ));
            self.write(&output.path, &output.content).await?;
        }
        BatchStats::inc(&self.stats.rewritten);

        if self.options.remove_source {
            self.removals.lock().extend(
                outputs
                    .into_iter()
                    .filter(|output| output.old_path != output.path)
                    .map(|output| output.old_path),
            );
        }
        Ok(())
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }
        let _claim = self.latch.claim(path).await;
        fs::write_file(path, content).await
    }

    async fn copy(&self, file: &Path) -> Result<()> {
        if self.from_dir == self.to_dir {
            BatchStats::inc(&self.stats.skipped);
            return Ok(());
        }
        let target = rebase(file, &self.from_dir, &self.to_dir);
        if target == file {
            BatchStats::inc(&self.stats.skipped);
            return Ok(());
        }

        self.reporter.progress(&format!("{} - copy", self.display(file)));
        if self.options.dry_run {
            BatchStats::inc(&self.stats.copied);
            return Ok(());
        }

        match self.latch.try_claim(&target) {
            Some(_claim) => {
                fs::copy_file(file, &target).await?;
                BatchStats::inc(&self.stats.copied);
            }
            None => {
                debug!("{} already written, not copying", self.display(&target));
                BatchStats::inc(&self.stats.skipped);
            }
        }
        Ok(())
    }

    async fn remove_sources(&self) -> Result<()> {
        let removals = std::mem::take(&mut *self.removals.lock());
        for path in removals {
            self.reporter
                .progress(&format!("{} - removed", self.display(&path)));
            if !self.options.dry_run {
                fs::remove_file(&path).await?;
            }
            BatchStats::inc(&self.stats.removed);
        }
        Ok(())
    }
}
