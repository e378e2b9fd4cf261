//! Tolerant JSON extraction from free-form generator output.
//!
//! Generators wrap JSON in prose or code fences. [`extract_json`] returns the
//! first balanced object or array, tracking string literals and escapes so
//! that braces inside strings do not affect nesting.

use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object or array found in response")]
    NoJson,

    #[error("JSON value starting at byte {start} is never closed")]
    Unbalanced { start: usize },

    #[error("failed to parse extracted JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ExtractError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoJson => "no_json",
            Self::Unbalanced { .. } => "unbalanced_json",
            Self::Parse(_) => "json_parse",
        }
    }
}

/// Slice of `text` holding the first balanced `{...}` or `[...]` that is
/// valid JSON.
///
/// Every `{` or `[` is a candidate start, so prose such as `[v2]` or a stray
/// brace before the payload is skipped. When no candidate parses, the error
/// from the earliest one is returned.
pub fn extract_json(text: &str) -> Result<&str, ExtractError> {
    let mut first_error = None;

    for (start, _) in text.match_indices(['{', '[']) {
        let candidate = balanced_at(text, start).and_then(|slice| {
            serde_json::from_str::<IgnoredAny>(slice)?;
            Ok(slice)
        });
        match candidate {
            Ok(slice) => return Ok(slice),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or(ExtractError::NoJson))
}

/// The balanced value opening at byte `start`, ignoring brackets inside
/// string literals.
fn balanced_at(text: &str, start: usize) -> Result<&str, ExtractError> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().copied().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(byte) {
                    return Err(ExtractError::Unbalanced { start });
                }
                if stack.is_empty() {
                    return Ok(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::Unbalanced { start })
}

/// Extract the first JSON value from `text` and deserialize it.
pub fn parse_embedded<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let json = extract_json(text)?;
    Ok(serde_json::from_str(json)?)
}
