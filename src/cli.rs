// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Command line arguments for spacey-mjs

use clap::{ArgAction, Parser};
use spacey_rewrite::path::resolve;
use spacey_rewrite::{BatchOptions, FindOptions, ModuleFamily, VERSION};
use std::path::{Path, PathBuf};

/// Rename ESM .js files to .mjs (or .cjs if the --cjs option is used)
#[derive(Parser, Debug)]
#[command(name = "spacey-mjs")]
#[command(author, version = VERSION, about, long_about = None)]
pub struct Cli {
    /// Globs matching files to rename
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Use .cjs extension instead of .mjs extension
    #[arg(long)]
    pub cjs: bool,

    /// The output directory
    #[arg(short, long, value_name = "DIR", env = "SPACEY_MJS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// The current working directory
    #[arg(long, value_name = "DIR", env = "SPACEY_MJS_CWD")]
    pub cwd: Option<PathBuf>,

    /// The root directory
    #[arg(long, value_name = "DIR", env = "SPACEY_MJS_ROOT")]
    pub root: Option<PathBuf>,

    /// Exclude a glob from the files
    #[arg(short = 'x', long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Dry run, do not update files
    #[arg(long)]
    pub dry_run: bool,

    /// Remove the original files after successful conversion
    #[arg(long)]
    pub remove_source: bool,

    /// Skip all TypeScript files (.ts and .d.ts) instead of converting them
    #[arg(long)]
    pub skip_ts: bool,

    /// No error if files are not found
    #[arg(long = "no-must-find-files", action = ArgAction::SetFalse)]
    pub must_find_files: bool,

    /// Do not fail if relative `.js` files outside of the root are imported
    #[arg(long = "no-enforce-root", action = ArgAction::SetFalse)]
    pub enforce_root: bool,

    /// Force color
    #[arg(long, overrides_with = "no_color")]
    pub color: bool,

    /// Do not use color
    #[arg(long, overrides_with = "color")]
    pub no_color: bool,

    /// Verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of files processed at once (default: CPU count * 2)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

impl Cli {
    /// Explicit color choice, `None` to detect
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Target module system
    pub fn family(&self) -> ModuleFamily {
        if self.cjs {
            ModuleFamily::Cjs
        } else {
            ModuleFamily::Esm
        }
    }

    /// Whether progress lines are shown
    pub fn show_progress(&self) -> bool {
        self.dry_run || self.verbose
    }

    /// Absolute working directory
    pub fn working_dir(&self) -> PathBuf {
        resolve(Path::new(""), self.cwd.as_deref().unwrap_or(Path::new("")))
    }

    /// Discovery options
    pub fn find_options(&self) -> FindOptions {
        FindOptions::new(self.working_dir())
            .with_exclude(self.exclude.iter().cloned())
            .with_must_find_files(self.must_find_files)
    }

    /// Batch options, with root and output resolved against the working directory
    pub fn batch_options(&self) -> BatchOptions {
        let mut options = BatchOptions::new(self.working_dir())
            .with_family(self.family())
            .with_dry_run(self.dry_run)
            .with_remove_source(self.remove_source)
            .with_skip_ts(self.skip_ts)
            .with_outside_root_references(!self.enforce_root);
        if let Some(root) = &self.root {
            options = options.with_root(root);
        }
        if let Some(output) = &self.output {
            options = options.with_output(output);
        }
        if let Some(concurrency) = self.concurrency {
            options = options.with_concurrency(concurrency);
        }
        options
    }
}
