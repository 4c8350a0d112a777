//! Recovery of the JSON body from a raw model reply.
//!
//! Replies routinely wrap the JSON in prose or code fences, so the span
//! between the first `{` and the last `}` is treated as the document. This
//! assumes no unbalanced braces outside the JSON body.

use serde_json::Value;

use crate::error::{AcordExtractError, Result};
use crate::normalize::normalize_response;
use crate::schema::Acord140Record;

/// Locate the JSON substring in a raw reply.
pub fn json_span(reply: &str) -> Result<&str> {
    let start = reply.find('{').ok_or(AcordExtractError::NoJsonFound)?;
    let end = reply.rfind('}').ok_or(AcordExtractError::NoJsonFound)?;
    if end <= start {
        return Err(AcordExtractError::NoJsonFound);
    }
    Ok(&reply[start..=end])
}

/// Parse a raw reply into a normalized record.
pub fn parse_reply(reply: &str) -> Result<Acord140Record> {
    let span = json_span(reply)?;
    let mut value: Value =
        serde_json::from_str(span).map_err(AcordExtractError::MalformedJson)?;
    normalize_response(&mut value);
    Acord140Record::from_value(value)
}
