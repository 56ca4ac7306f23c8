//! Frontmatter extraction.
//!
//! Content files start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Nonagon Infinity
//! index: 8
//! ---
//!
//! # Nonagon Infinity
//! ```
//!
//! Everything after the closing fence is the body and is returned untouched.

use serde::de::DeserializeOwned;
use thiserror::Error;

const FENCE: &str = "---";

/// Errors from splitting or decoding a frontmatter block
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("File does not start with a '---' frontmatter fence")]
    MissingOpeningDelimiter,

    #[error("Frontmatter block is never closed with '---'")]
    Unterminated,

    #[error("Invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Split raw file text into the YAML source of the frontmatter and the body.
pub fn split(raw: &str) -> Result<(&str, &str), FrontmatterError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = text.split_inclusive('\n');
    let first = lines.next().ok_or(FrontmatterError::MissingOpeningDelimiter)?;
    if first.trim_end() != FENCE {
        return Err(FrontmatterError::MissingOpeningDelimiter);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == FENCE {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Parse the frontmatter block into `T` and return it with the body.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<(T, String), FrontmatterError> {
    let (yaml, body) = split(raw)?;
    let data = serde_yaml::from_str(yaml)?;
    Ok((data, body.to_string()))
}
