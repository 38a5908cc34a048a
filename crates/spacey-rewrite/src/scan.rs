// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Text-level scanning for relative module specifiers.
//!
//! This does not parse JavaScript. Two independent passes look for
//! `import ... from '<path>';` / `export ... from '<path>';` lines and for
//! `require('<path>')` calls, and report the byte span of every relative
//! specifier found in the original text.

use crate::path::is_relative_specifier;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static IMPORT_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:import|export).*? from (?:'(?P<single>\.[^'\n]*?)'|"(?P<double>\.[^"\n]*?)");"#)
        .expect("valid regex")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"require\((?:'(?P<single>\.[^'\n]*?)'|"(?P<double>\.[^"\n]*?)")\)"#)
        .expect("valid regex")
});

/// Construct a specifier was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `import`/`export ... from`
    Import,
    /// `require(...)`
    Require,
}

impl fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecifierKind::Import => write!(f, "Import"),
            SpecifierKind::Require => write!(f, "Require"),
        }
    }
}

/// A relative specifier occurrence in the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierReference {
    /// Construct the specifier belongs to
    pub kind: SpecifierKind,
    /// Specifier text, without quotes
    pub raw_text: String,
    /// Byte offset of the first specifier character
    pub byte_start: usize,
    /// Byte offset one past the last specifier character
    pub byte_end: usize,
}

fn collect(re: &Regex, kind: SpecifierKind, content: &str) -> Vec<SpecifierReference> {
    re.captures_iter(content)
        .filter_map(|caps: Captures<'_>| caps.name("single").or_else(|| caps.name("double")))
        .filter(|m| is_relative_specifier(m.as_str()))
        .map(|m| SpecifierReference {
            kind,
            raw_text: m.as_str().to_string(),
            byte_start: m.start(),
            byte_end: m.end(),
        })
        .collect()
}

/// Find relative specifiers in `import`/`export ... from` statements
pub fn scan_import_export(content: &str) -> Vec<SpecifierReference> {
    collect(&IMPORT_EXPORT, SpecifierKind::Import, content)
}

/// Find relative specifiers in `require(...)` calls
pub fn scan_require(content: &str) -> Vec<SpecifierReference> {
    collect(&REQUIRE, SpecifierKind::Require, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_import_export() {
        let content = "import { a } from './a.js';\nexport * from \"../b.js\";\nimport x from 'lodash';\n";
        let refs = scan_import_export(content);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].raw_text, "./a.js");
        assert_eq!(&content[refs[0].byte_start..refs[0].byte_end], "./a.js");
        assert_eq!(refs[1].raw_text, "../b.js");
        assert_eq!(&content[refs[1].byte_start..refs[1].byte_end], "../b.js");
        assert!(refs.iter().all(|r| r.kind == SpecifierKind::Import));
    }

    #[test]
    fn test_scan_two_statements_on_one_line() {
        let content = "import { a } from './a.js'; import { b } from './b.js';";
        let refs = scan_import_export(content);
        let texts: Vec<_> = refs.iter().map(|r| r.raw_text.as_str()).collect();
        assert_eq!(texts, ["./a.js", "./b.js"]);
    }

    #[test]
    fn test_scan_requires_semicolon() {
        assert!(scan_import_export("import { a } from './a.js'\n").is_empty());
    }

    #[test]
    fn test_scan_require() {
        let content = "const a = require('./a.js');\nconst b = require(\"../lib/b.js\");\nconst c = require('chalk');\n";
        let refs = scan_require(content);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, SpecifierKind::Require);
        assert_eq!(&content[refs[0].byte_start..refs[0].byte_end], "./a.js");
        assert_eq!(&content[refs[1].byte_start..refs[1].byte_end], "../lib/b.js");
    }

    #[test]
    fn test_scan_ignores_dot_names() {
        assert!(scan_require("require('.hidden')").is_empty());
        assert!(scan_import_export("import x from '.config';").is_empty());
    }

    #[test]
    fn test_mismatched_quotes_not_matched() {
        assert!(scan_require("require('./a.js\")").is_empty());
    }
}
