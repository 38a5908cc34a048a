// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Target module families and their file extension rules

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static SUPPORTED_ESM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(m?js|m?ts|d\.m?ts)$").expect("valid regex"));

static SUPPORTED_CJS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(c?js|c?ts|d\.c?ts)$").expect("valid regex"));

static TYPESCRIPT_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[cm]?ts$").expect("valid regex"));

static JS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.js(\.map)?$").expect("valid regex"));

static TS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.ts(\.map)?$").expect("valid regex"));

/// Module system the output files are converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleFamily {
    /// ECMAScript modules (`.mjs` / `.mts`)
    #[default]
    Esm,
    /// CommonJS modules (`.cjs` / `.cts`)
    Cjs,
}

impl ModuleFamily {
    /// Extension given to converted JavaScript files and specifiers
    pub fn output_ext(self) -> &'static str {
        match self {
            ModuleFamily::Esm => ".mjs",
            ModuleFamily::Cjs => ".cjs",
        }
    }

    /// Extension given to converted TypeScript files
    pub fn output_ts_ext(self) -> &'static str {
        match self {
            ModuleFamily::Esm => ".mts",
            ModuleFamily::Cjs => ".cts",
        }
    }

    /// Suffixes accepted as input for this family
    pub fn supported_suffixes(self, skip_ts: bool) -> &'static [&'static str] {
        match (self, skip_ts) {
            (ModuleFamily::Esm, false) => &[".js", ".mjs", ".ts", ".mts", ".d.ts", ".d.mts"],
            (ModuleFamily::Cjs, false) => &[".js", ".cjs", ".ts", ".cts", ".d.ts", ".d.cts"],
            (ModuleFamily::Esm, true) => &[".js", ".mjs"],
            (ModuleFamily::Cjs, true) => &[".js", ".cjs"],
        }
    }

    /// Message used when a file falls outside [`Self::supported_suffixes`]
    pub fn unsupported_message(self, skip_ts: bool) -> String {
        format!(
            "Must be a supported file type ({}).",
            self.supported_suffixes(skip_ts).join(", ")
        )
    }

    /// Check whether a file can be rewritten for this family.
    ///
    /// With `skip_ts`, every TypeScript input (`.ts`, `.d.ts`, `.mts`,
    /// `.cts`) is excluded regardless of family.
    pub fn is_supported(self, path: &Path, skip_ts: bool) -> bool {
        let name = path.to_string_lossy();
        if skip_ts && TYPESCRIPT_SOURCE.is_match(&name) {
            return false;
        }
        match self {
            ModuleFamily::Esm => SUPPORTED_ESM.is_match(&name),
            ModuleFamily::Cjs => SUPPORTED_CJS.is_match(&name),
        }
    }

    /// Rename a file for this family, keeping a trailing `.map` suffix.
    ///
    /// `.js` becomes `.mjs`/`.cjs`, `.ts` (including `.d.ts`) becomes
    /// `.mts`/`.cts`. Any other name is returned unchanged.
    pub fn rename(self, path: &Path) -> PathBuf {
        let name = path.to_string_lossy();
        let js = format!("{}$1", self.output_ext());
        let ts = format!("{}$1", self.output_ts_ext());
        let renamed = JS_SUFFIX.replace(&name, js.as_str());
        let renamed = TS_SUFFIX.replace(&renamed, ts.as_str());
        PathBuf::from(renamed.into_owned())
    }

    /// Swap a trailing `.js` on a specifier for the family's output extension
    pub fn convert_specifier(self, specifier: &str) -> String {
        match specifier.strip_suffix(".js") {
            Some(stem) => format!("{stem}{}", self.output_ext()),
            None => specifier.to_string(),
        }
    }
}

impl fmt::Display for ModuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFamily::Esm => write!(f, "esm"),
            ModuleFamily::Cjs => write!(f, "cjs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_table() {
        let cases = [
            ("lib/index.js", "lib/index.mjs", "lib/index.cjs"),
            ("lib/index.js.map", "lib/index.mjs.map", "lib/index.cjs.map"),
            ("lib/index.ts", "lib/index.mts", "lib/index.cts"),
            ("lib/index.d.ts", "lib/index.d.mts", "lib/index.d.cts"),
            ("lib/index.d.ts.map", "lib/index.d.mts.map", "lib/index.d.cts.map"),
            ("lib/index.mjs", "lib/index.mjs", "lib/index.mjs"),
            ("lib/index.cjs", "lib/index.cjs", "lib/index.cjs"),
            ("lib/style.css", "lib/style.css", "lib/style.css"),
        ];
        for (input, esm, cjs) in cases {
            assert_eq!(ModuleFamily::Esm.rename(Path::new(input)), PathBuf::from(esm), "{input}");
            assert_eq!(ModuleFamily::Cjs.rename(Path::new(input)), PathBuf::from(cjs), "{input}");
        }
    }

    #[test]
    fn test_is_supported() {
        let esm = ModuleFamily::Esm;
        let cjs = ModuleFamily::Cjs;
        for name in ["a.js", "a.mjs", "a.ts", "a.mts", "a.d.ts", "a.d.mts"] {
            assert!(esm.is_supported(Path::new(name), false), "{name}");
        }
        for name in ["a.js", "a.cjs", "a.ts", "a.cts", "a.d.ts", "a.d.cts"] {
            assert!(cjs.is_supported(Path::new(name), false), "{name}");
        }
        assert!(!esm.is_supported(Path::new("a.cjs"), false));
        assert!(!cjs.is_supported(Path::new("a.mjs"), false));
        assert!(!esm.is_supported(Path::new("a.js.map"), false));
        assert!(!esm.is_supported(Path::new("a.css"), false));
    }

    #[test]
    fn test_skip_ts_excludes_typescript() {
        for name in ["a.ts", "a.d.ts", "a.mts", "a.d.mts"] {
            assert!(!ModuleFamily::Esm.is_supported(Path::new(name), true), "{name}");
        }
        assert!(!ModuleFamily::Cjs.is_supported(Path::new("a.cts"), true));
        assert!(ModuleFamily::Esm.is_supported(Path::new("a.js"), true));
        assert!(ModuleFamily::Cjs.is_supported(Path::new("a.cjs"), true));
    }

    #[test]
    fn test_unsupported_message() {
        assert_eq!(
            ModuleFamily::Esm.unsupported_message(false),
            "Must be a supported file type (.js, .mjs, .ts, .mts, .d.ts, .d.mts)."
        );
        assert_eq!(
            ModuleFamily::Cjs.unsupported_message(false),
            "Must be a supported file type (.js, .cjs, .ts, .cts, .d.ts, .d.cts)."
        );
    }

    #[test]
    fn test_convert_specifier() {
        assert_eq!(ModuleFamily::Esm.convert_specifier("./helper.js"), "./helper.mjs");
        assert_eq!(ModuleFamily::Cjs.convert_specifier("../types.js"), "../types.cjs");
        assert_eq!(ModuleFamily::Esm.convert_specifier("./data.json"), "./data.json");
        assert_eq!(ModuleFamily::Esm.convert_specifier("./already.mjs"), "./already.mjs");
    }
}
