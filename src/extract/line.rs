use crate::error::ExtractError;

/// One `key: value` pair, with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
    pub line_no: u64,
}

/// Parse one raw line.
///
/// - blank (after trimming) → `Ok(None)`
/// - otherwise split at the first `:` and trim both halves
/// - no `:` at all → `MalformedLine`
pub fn parse_line(line_no: u64, raw: &str) -> Result<Option<Field>, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.split_once(':') {
        Some((key, value)) => Ok(Some(Field {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
            line_no,
        })),
        None => Err(ExtractError::MalformedLine {
            line_no,
            content: trimmed.to_string(),
        }),
    }
}
