// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-mjs - rename compiled output to .mjs/.cjs
//!
//! This is the main entry point for the spacey-mjs CLI.
//!
//! ```bash
//! # Rename lib/**/*.js to .mjs in place
//! spacey-mjs lib
//!
//! # Write CommonJS copies of lib into out/cjs
//! spacey-mjs --cjs --root lib -o out/cjs lib
//!
//! # Show what would happen
//! spacey-mjs --dry-run lib
//! ```

mod cli;
mod console;

use clap::Parser;
use cli::Cli;
use console::Console;
use spacey_rewrite::{RewriteError, find_files, process_files};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entry point - uses tokio runtime for async file operations.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let color = Console::detect_color(cli.color_choice());
    init_tracing(cli.verbose, color);

    let console = Console::new(color, cli.show_progress());

    match run(&cli, console).await {
        Ok(()) => {
            console.done();
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<RewriteError>() {
                Some(err) if err.is_usage() => console.error(&err.to_string()),
                _ => console.error(&format!("{e:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging. `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: bool, color: bool) {
    let default = if verbose {
        "spacey_rewrite=debug,spacey_mjs=debug"
    } else {
        "spacey_rewrite=warn,spacey_mjs=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .init();
}

async fn run(cli: &Cli, console: Console) -> anyhow::Result<()> {
    let globs = cli.files.clone();
    let find_options = cli.find_options();
    let files = tokio::task::spawn_blocking(move || find_files(&globs, &find_options)).await??;
    if files.is_empty() {
        debug!("No files to process");
        return Ok(());
    }

    let options = cli.batch_options();
    debug!(
        "Rewriting {} files as {} from {} to {}",
        files.len(),
        options.family,
        options.source_root().display(),
        options.target_root().display()
    );

    process_files(&files, &options, Arc::new(console)).await?;
    Ok(())
}
