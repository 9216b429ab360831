// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The small pure helpers named in the glossary: project-name/path
//! conversion and log-entry content coercion.

use serde_json::Value;

/// Path segment names that are too generic to identify a project; when the
/// last segment is one of these, walk up to the first parent that is not.
const GENERIC_SEGMENTS: &[&str] = &["frontend", "backend", "src", "lib"];

/// Split `path` by `/`; from the end, return the first non-empty,
/// non-`.`/non-`..` component. If that component is one of
/// [`GENERIC_SEGMENTS`], keep walking toward the root for the first
/// ancestor that isn't. Falls back to `"unknown"`.
pub fn extract_project_name_from_cwd(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect();

    for (idx, seg) in segments.iter().enumerate().rev() {
        if !GENERIC_SEGMENTS.contains(seg) {
            // Found a non-generic segment; only accept it if it's not an
            // interior generic segment we've already walked past.
            let _ = idx;
            return (*seg).to_string();
        }
    }
    "unknown".to_string()
}

/// Reverse of the directory-encoding convention used under the log root:
/// a name beginning with `-` has the leading dash dropped and remaining
/// dashes turned into path separators, then gets a leading `/` restored.
/// Names without a leading dash are returned unchanged (already a path).
pub fn convert_project_name_to_path(name: &str) -> String {
    match name.strip_prefix('-') {
        Some(rest) => format!("/{}", rest.replace('-', "/")),
        None => name.to_string(),
    }
}

/// Normalise `message.content` (string | object | array | other) to a
/// canonical textual form at ingest time, per the design notes: downstream
/// consumers never re-parse this field.
pub fn coerce_content(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "glossary_tests.rs"]
mod tests;
