//! Legacy frontmatter parsing
//!
//! A legacy document is `---\n<yaml header>\n---\n<body>`. The header is
//! deserialized into the entity's declared shape; the body is returned
//! trimmed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Frontmatter parse errors
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// No `---` delimited header, or the header is empty
    #[error("Invalid frontmatter format")]
    InvalidFormat,

    /// Header is not valid YAML or does not match the declared shape
    #[error("Invalid frontmatter: {0}")]
    Shape(#[from] serde_yaml::Error),

    /// `date` field cannot be interpreted as a timestamp
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Parsed document
#[derive(Debug, Clone)]
pub struct ParsedDocument<T> {
    pub frontmatter: T,
    pub body: String,
}

/// Split a legacy document into its typed header and trimmed body
pub fn parse_frontmatter<T: DeserializeOwned>(
    content: &str,
) -> Result<ParsedDocument<T>, FrontmatterError> {
    let normalized = content.replace("\r\n", "\n");

    let rest = normalized
        .strip_prefix("---\n")
        .ok_or(FrontmatterError::InvalidFormat)?;

    // Header ends at the first "\n---\n"; the closing delimiter may also be
    // the last line of the file.
    let (header, body) = match rest.find("\n---\n") {
        Some(end) => (&rest[..end], &rest[end + "\n---\n".len()..]),
        None => match rest.strip_suffix("\n---") {
            Some(header) => (header, ""),
            None => return Err(FrontmatterError::InvalidFormat),
        },
    };

    if header.trim().is_empty() {
        return Err(FrontmatterError::InvalidFormat);
    }

    let frontmatter = serde_yaml::from_str(header)?;

    Ok(ParsedDocument {
        frontmatter,
        body: body.trim().to_string(),
    })
}

/// Interpret a legacy `date` value
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DDTHH:MM[:SS]`
/// (taken as UTC) and bare `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_legacy_date(value: &str) -> Result<DateTime<Utc>, FrontmatterError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FrontmatterError::InvalidDate(value.to_string()))
}
