//! Page and block identifier helpers.
//!
//! The store keys records by dashed UUIDs (`0123abcd-…`). URLs and in-page
//! anchors use the compact 32-hex form. Raw page ids arriving from URLs may
//! also be slugs with the id at the end (`Getting-Started-0123abcd…`).

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static COMPACT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-f0-9]{32})\b").expect("valid compact id pattern"));

static DASHED_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})\b")
        .expect("valid dashed id pattern")
});

/// Compact form of a block id: dashes removed.
///
/// This is the anchor id the renderer puts on headings, so table of
/// contents entries and scroll-spy anchors agree on it.
///
/// ```
/// use pagegraph_core::ids::uuid_to_id;
///
/// assert_eq!(
///     uuid_to_id("2cc9acca-d7c6-814b-a67a-d32dbdd2ffce"),
///     "2cc9accad7c6814ba67ad32dbdd2ffce"
/// );
/// ```
pub fn uuid_to_id(id: &str) -> String {
    id.replace('-', "")
}

/// Extract a page id from a raw id, URL path segment or slug.
///
/// Returns the dashed lowercase UUID form, or `None` when the input holds
/// no recognizable id. A query string is ignored.
pub fn parse_page_id(raw: &str) -> Option<String> {
    let raw = raw.split('?').next().unwrap_or_default();
    if raw.is_empty() {
        return None;
    }

    let found = COMPACT_ID
        .captures(raw)
        .or_else(|| DASHED_ID.captures(raw))?
        .get(1)?
        .as_str();

    Uuid::parse_str(found)
        .ok()
        .map(|id| id.hyphenated().to_string())
}

/// Site-relative URL of a page: `/` for the root page, `/<compact id>`
/// otherwise.
pub fn map_page_url(root_page_id: Option<&str>, page_id: &str) -> String {
    let page_id = uuid_to_id(page_id);
    let is_root = root_page_id
        .and_then(parse_page_id)
        .is_some_and(|root| uuid_to_id(&root) == page_id);

    if is_root {
        "/".to_string()
    } else {
        format!("/{page_id}")
    }
}
