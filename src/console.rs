// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Terminal output: progress on stdout, warnings and errors on stderr

use owo_colors::OwoColorize;
use spacey_rewrite::Reporter;

/// Console reporter for the CLI
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
    show_progress: bool,
}

impl Console {
    /// `color` enables ANSI styling; progress lines are printed only when
    /// `show_progress` is set.
    pub fn new(color: bool, show_progress: bool) -> Self {
        Self {
            color,
            show_progress,
        }
    }

    /// Resolve the color setting: an explicit choice wins, otherwise color
    /// is used when stderr is a terminal.
    pub fn detect_color(choice: Option<bool>) -> bool {
        choice.unwrap_or_else(|| atty::is(atty::Stream::Stderr))
    }

    fn warning_line(&self, message: &str) -> String {
        if self.color {
            format!("{}{}", "Warning: ".bright_yellow(), message)
        } else {
            format!("Warning: {message}")
        }
    }

    fn error_line(&self, message: &str) -> String {
        if self.color {
            format!("{}{}", "Error: ".red(), message)
        } else {
            format!("Error: {message}")
        }
    }

    fn done_line(&self) -> String {
        if self.color {
            "done.".green().to_string()
        } else {
            "done.".to_string()
        }
    }

    /// Report a usage error
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_line(message));
    }

    /// Report the end of a successful run
    pub fn done(&self) {
        if self.show_progress {
            println!("{}", self.done_line());
        }
    }
}

impl Reporter for Console {
    fn progress(&self, message: &str) {
        if self.show_progress {
            println!("{message}");
        }
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", self.warning_line(message));
    }
}
