// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source map (v3) relocation.
//!
//! A rewritten file keeps its line structure: specifier edits never span
//! lines, so the only change to `mappings` is a per-line shift of generated
//! columns that follow an edit. Moving the map to another directory also
//! means its relative `sources` (or `sourceRoot`) must be rebased.

use crate::patch::ColumnShift;
use crate::path::{relative, resolve, to_slash};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Errors raised while relocating a source map
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// Map text is not valid JSON for a v3 map
    #[error("invalid source map JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `mappings` could not be decoded
    #[error("invalid mappings: {0}")]
    Mappings(String),
}

/// Source map v3 document. Fields this crate does not touch are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMapV3 {
    /// Format version
    pub version: serde_json::Value,
    /// Name of the generated file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Prefix applied to every entry of `sources`
    #[serde(rename = "sourceRoot", default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    /// Original sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Option<String>>>,
    /// Everything else (`names`, `sourcesContent`, extensions)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Base64-VLQ encoded mappings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<String>,
}

/// Relocate a map for a renamed and possibly moved file.
///
/// `old_dir`/`new_dir` are the directories of the old and new map files,
/// `file_name` the new generated file's base name, and `shifts` the column
/// changes made to the generated file (empty when its text is unchanged,
/// in which case `mappings` is preserved verbatim).
pub fn relocate(
    map_content: &str,
    old_dir: Option<&Path>,
    new_dir: &Path,
    file_name: &str,
    shifts: &[ColumnShift],
) -> Result<String, SourceMapError> {
    let mut map: SourceMapV3 = serde_json::from_str(map_content)?;

    map.file = Some(file_name.to_string());

    if let Some(old_dir) = old_dir {
        if old_dir != new_dir {
            rebase_sources(&mut map, old_dir, new_dir);
        }
    }

    if !shifts.is_empty() {
        if let Some(mappings) = &map.mappings {
            map.mappings = Some(shift_mappings(mappings, shifts)?);
        }
    }

    Ok(serde_json::to_string(&map)?)
}

fn rebase_sources(map: &mut SourceMapV3, old_dir: &Path, new_dir: &Path) {
    match map.source_root.as_deref() {
        Some(root) if !root.is_empty() => {
            map.source_root = Some(rebase_reference(root, old_dir, new_dir));
        }
        _ => {
            if let Some(sources) = map.sources.as_mut() {
                for source in sources.iter_mut().flatten() {
                    *source = rebase_reference(source, old_dir, new_dir);
                }
            }
        }
    }
}

fn is_url_or_absolute(reference: &str) -> bool {
    reference.starts_with('/') || Path::new(reference).is_absolute() || url::Url::parse(reference).is_ok()
}

/// Re-express a map-relative reference from `new_dir`
fn rebase_reference(reference: &str, old_dir: &Path, new_dir: &Path) -> String {
    if is_url_or_absolute(reference) {
        return reference.to_string();
    }
    let target = resolve(old_dir, Path::new(reference));
    let rel = relative(new_dir, &target);
    if rel.is_absolute() {
        return reference.to_string();
    }
    let mut rebased = to_slash(&rel);
    if reference.ends_with('/') && !rebased.ends_with('/') {
        rebased.push('/');
    }
    rebased
}

/// Apply column shifts to the generated columns of `mappings`
pub fn shift_mappings(mappings: &str, shifts: &[ColumnShift]) -> Result<String, SourceMapError> {
    let mut out = String::with_capacity(mappings.len() + shifts.len() * 2);

    for (line_no, line) in mappings.split(';').enumerate() {
        if line_no > 0 {
            out.push(';');
        }

        let line_shifts: Vec<&ColumnShift> = shifts.iter().filter(|s| s.line == line_no).collect();
        if line_shifts.is_empty() {
            out.push_str(line);
            continue;
        }

        let mut prev_old = 0i64;
        let mut prev_new = 0i64;
        for (i, segment) in line.split(',').enumerate() {
            if i > 0 {
                out.push(',');
            }
            if segment.is_empty() {
                continue;
            }
            let mut fields = decode_vlq(segment)?;
            let old_col = prev_old + fields[0];
            let new_col = shift_column(old_col, &line_shifts);
            fields[0] = new_col - prev_new;
            prev_old = old_col;
            prev_new = new_col;
            for field in fields {
                encode_vlq(field, &mut out);
            }
        }
    }

    Ok(out)
}

/// New position of a generated column. Columns inside a replaced span
/// collapse onto the span's start.
fn shift_column(column: i64, shifts: &[&ColumnShift]) -> i64 {
    let mut delta = 0i64;
    for shift in shifts {
        let start = i64::from(shift.column);
        let end = start + i64::from(shift.old_len);
        if column >= end {
            delta += i64::from(shift.new_len) - i64::from(shift.old_len);
        } else if column > start {
            return start + delta;
        } else {
            break;
        }
    }
    column + delta
}

fn base64_value(byte: u8) -> Option<i64> {
    BASE64.iter().position(|&c| c == byte).map(|v| v as i64)
}

/// Decode one Base64-VLQ segment into its signed fields
pub fn decode_vlq(segment: &str) -> Result<Vec<i64>, SourceMapError> {
    let mut values = Vec::with_capacity(5);
    let mut value = 0i64;
    let mut shift = 0u32;

    for byte in segment.bytes() {
        let digit = base64_value(byte).ok_or_else(|| {
            SourceMapError::Mappings(format!("invalid character '{}'", byte as char))
        })?;
        value += (digit & 0x1f) << shift;
        if digit & 0x20 != 0 {
            shift += 5;
            if shift > 55 {
                return Err(SourceMapError::Mappings(format!("value too large in '{segment}'")));
            }
        } else {
            let magnitude = value >> 1;
            values.push(if value & 1 == 1 { -magnitude } else { magnitude });
            value = 0;
            shift = 0;
        }
    }

    if shift != 0 || values.is_empty() {
        return Err(SourceMapError::Mappings(format!("truncated segment '{segment}'")));
    }
    Ok(values)
}

/// Append the Base64-VLQ encoding of `value` to `out`
pub fn encode_vlq(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (vlq & 0x1f) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0x20;
        }
        out.push(BASE64[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_segments(segments: &[&[i64]]) -> String {
        let mut out = String::new();
        for (i, fields) in segments.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            for &f in fields.iter() {
                encode_vlq(f, &mut out);
            }
        }
        out
    }

    fn generated_columns(line: &str) -> Vec<i64> {
        let mut col = 0;
        line.split(',')
            .map(|seg| {
                col += decode_vlq(seg).unwrap()[0];
                col
            })
            .collect()
    }

    #[test]
    fn test_vlq_known_values() {
        assert_eq!(decode_vlq("AAAA").unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(decode_vlq("SAAS").unwrap(), vec![9, 0, 0, 9]);
        assert_eq!(decode_vlq("D").unwrap(), vec![-1]);
        assert_eq!(decode_vlq("gB").unwrap(), vec![16]);

        let mut out = String::new();
        encode_vlq(16, &mut out);
        encode_vlq(-1, &mut out);
        encode_vlq(0, &mut out);
        assert_eq!(out, "gBDA");
    }

    #[test]
    fn test_vlq_rejects_garbage() {
        assert!(decode_vlq("A!").is_err());
        assert!(decode_vlq("g").is_err());
    }

    #[test]
    fn test_shift_mappings_moves_columns_after_edit() {
        // Segments at columns 0, 18 (opening quote) and 26 (semicolon)
        let line0 = encode_segments(&[&[0, 0, 0, 0], &[18, 0, 0, 18], &[8, 0, 0, 8]]);
        let mappings = format!("{line0};AAAA");
        let shifts = [ColumnShift {
            line: 0,
            column: 19,
            old_len: 6,
            new_len: 7,
        }];

        let shifted = shift_mappings(&mappings, &shifts).unwrap();
        let lines: Vec<&str> = shifted.split(';').collect();
        assert_eq!(generated_columns(lines[0]), vec![0, 18, 27]);
        assert_eq!(lines[1], "AAAA");
    }

    #[test]
    fn test_column_inside_edit_clamps_to_start() {
        let line0 = encode_segments(&[&[21, 0, 0, 0]]);
        let shifts = [ColumnShift {
            line: 0,
            column: 19,
            old_len: 6,
            new_len: 3,
        }];
        let shifted = shift_mappings(&line0, &shifts).unwrap();
        assert_eq!(generated_columns(&shifted), vec![19]);
    }

    #[test]
    fn test_relocate_updates_file_and_sources() {
        let map = r#"{"version":3,"file":"index.js","sourceRoot":"","sources":["../src/index.ts"],"names":[],"mappings":"AAAA"}"#;
        let out = relocate(
            map,
            Some(Path::new("/proj/lib")),
            Path::new("/proj/out/esm"),
            "index.mjs",
            &[],
        )
        .unwrap();
        let parsed: SourceMapV3 = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.file.as_deref(), Some("index.mjs"));
        assert_eq!(
            parsed.sources,
            Some(vec![Some("../../src/index.ts".to_string())])
        );
        assert_eq!(parsed.mappings.as_deref(), Some("AAAA"));
        assert!(parsed.extra.contains_key("names"));
    }

    #[test]
    fn test_relocate_keeps_url_sources() {
        let map = r#"{"version":3,"sources":["webpack://app/index.ts"],"mappings":""}"#;
        let out = relocate(map, Some(Path::new("/a")), Path::new("/b"), "x.mjs", &[]).unwrap();
        assert!(out.contains("webpack://app/index.ts"));
    }

    #[test]
    fn test_relocate_rejects_invalid_json() {
        assert!(matches!(
            relocate("not json", None, Path::new("/a"), "x.mjs", &[]),
            Err(SourceMapError::Json(_))
        ));
    }
}
