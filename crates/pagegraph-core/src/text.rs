//! Rich-text flattening.
//!
//! Rich text is a list of segments, each `[text, decorations?]`:
//!
//! ```text
//! [["Hello ", [["b"]]], ["world"]]
//! ```
//!
//! Flattening concatenates the text of every segment and drops decorations.
//! Inline mentions (pages, users, dates) are stored as a placeholder
//! character with the target in the decorations; they flatten to nothing.

use serde_json::Value;

use crate::models::Block;

/// Segment texts standing in for an inline mention or equation.
const MENTION_PLACEHOLDERS: [&str; 2] = ["‣", "⁍"];

/// Flatten a rich-text value to plain text.
///
/// Any value that is not a list of segments flattens to an empty string.
///
/// ```
/// use pagegraph_core::text::text_content;
/// use serde_json::json;
///
/// assert_eq!(text_content(&json!([["Hello ", [["b"]]], ["world"]])), "Hello world");
/// assert_eq!(text_content(&json!("plain")), "");
/// ```
pub fn text_content(value: &Value) -> String {
    let Some(segments) = value.as_array() else {
        return String::new();
    };

    segments
        .iter()
        .filter_map(|segment| segment.as_array()?.first())
        .map(segment_text)
        .collect()
}

/// A block's `title` property as plain text.
pub fn block_title(block: &Block) -> String {
    block
        .property("title")
        .map(text_content)
        .unwrap_or_default()
}

fn segment_text(text: &Value) -> String {
    match text {
        Value::String(s) if MENTION_PLACEHOLDERS.contains(&s.as_str()) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
