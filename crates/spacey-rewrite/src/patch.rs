// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Span replacement over an immutable original buffer

use std::ops::Range;

/// A replacement of one span of the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte span in the original text
    pub span: Range<usize>,
    /// Replacement text
    pub replacement: String,
}

/// Where an edit lands in line/column terms, for source map adjustment.
///
/// Columns are UTF-16 code units, the unit source maps use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnShift {
    /// Zero-based line of the edit
    pub line: usize,
    /// Column where the replaced span starts
    pub column: u32,
    /// Length of the replaced span
    pub old_len: u32,
    /// Length of the replacement
    pub new_len: u32,
}

/// Ordered set of non-overlapping edits against one original text
#[derive(Debug, Clone, Default)]
pub struct TextPatch {
    edits: Vec<Edit>,
}

impl TextPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a replacement. Spans are offsets into the original text.
    pub fn replace(&mut self, span: Range<usize>, replacement: impl Into<String>) {
        self.edits.push(Edit {
            span,
            replacement: replacement.into(),
        });
    }

    /// Whether `span` intersects an edit already recorded
    pub fn overlaps(&self, span: &Range<usize>) -> bool {
        self.edits
            .iter()
            .any(|e| span.start < e.span.end && e.span.start < span.end)
    }

    /// Number of recorded edits
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether no edit was recorded
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn sorted(&self) -> Vec<&Edit> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|e| e.span.start);
        edits
    }

    /// Apply every edit to `original`, working right to left so earlier
    /// offsets stay valid.
    pub fn apply(&self, original: &str) -> String {
        let mut out = original.to_string();
        for edit in self.sorted().into_iter().rev() {
            out.replace_range(edit.span.clone(), &edit.replacement);
        }
        out
    }

    /// Line/column position of each edit in `original`, in text order
    pub fn column_shifts(&self, original: &str) -> Vec<ColumnShift> {
        let mut shifts = Vec::with_capacity(self.edits.len());
        for edit in self.sorted() {
            let before = &original[..edit.span.start];
            let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
            shifts.push(ColumnShift {
                line: before.matches('\n').count(),
                column: utf16_len(&original[line_start..edit.span.start]),
                old_len: utf16_len(&original[edit.span.clone()]),
                new_len: utf16_len(&edit.replacement),
            });
        }
        shifts
    }
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}
