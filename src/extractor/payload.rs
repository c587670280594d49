//! Embedded payload extraction.
//!
//! Item pages ship their canonical state as a single line inside an inline
//! `<script>` block: an HTML-escaped JSON object assigned to a well-known
//! variable. The line is located by marker prefix (not by offset, the
//! surrounding markup moves around), the quoted JSON is cut out, entities
//! are unescaped and the source's double-escaped backslashes collapsed
//! before decoding.

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::error::SyncError;

/// Start of the assignment line carrying the payload, including the
/// opening quote of the JSON string literal.
pub const PAYLOAD_MARKER: &str = "window.current_project = \"";

/// Statement tail after the closing quote.
const PAYLOAD_SUFFIX: &str = "\";";

/// Locate and decode the embedded payload of an item page.
///
/// Returns `Ok(None)` when no script line carries the marker; the caller
/// treats that as an item-fetch failure. When several lines match, the last
/// one wins. A matching line that does not decode to a JSON object fails
/// with an extraction error.
pub fn extract_payload(html: &str) -> Result<Option<Map<String, Value>>, SyncError> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR.get_or_init(|| Selector::parse("script").unwrap());

    let document = Html::parse_document(html);
    let mut encoded: Option<String> = None;

    for script in document.select(selector) {
        for chunk in script.text() {
            for line in chunk.lines() {
                if let Some(found) = cut_payload(line) {
                    // last match wins
                    encoded = Some(found.to_string());
                }
            }
        }
    }

    let Some(encoded) = encoded else {
        return Ok(None);
    };

    let unescaped = quick_xml::escape::unescape(&encoded)
        .map_err(|e| SyncError::extraction(format!("bad entity in payload: {e}")))?;
    // the source double-escapes backslashes inside the string literal
    let decoded = unescaped.replace("\\\\", "\\");

    let payload: Map<String, Value> = serde_json::from_str(&decoded)
        .map_err(|e| SyncError::extraction(format!("payload is not a JSON object: {e}")))?;
    Ok(Some(payload))
}

/// Cut the escaped JSON out of one script line, or `None` when the line
/// does not carry the marker.
fn cut_payload(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(PAYLOAD_MARKER)?;
    rest.trim_end().strip_suffix(PAYLOAD_SUFFIX)
}
