//! Collaborator traits.
//!
//! The derivation engine is pure; these traits are the seams to the outside
//! world: where record maps come from, and where heading positions are
//! measured.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RecordMap, SearchResults};
use crate::scroll_spy::HeadingAnchor;

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// Source of record map snapshots.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a page and everything needed to render it.
    ///
    /// `page_id` is a dashed UUID. Returns [`crate::Error::PageNotFound`]
    /// when the store has no such page.
    async fn fetch_page(&self, page_id: &str) -> Result<RecordMap>;

    /// Full-text search, optionally restricted to pages below `scope_id`.
    async fn search(&self, query: &str, scope_id: Option<&str>) -> Result<SearchResults>;
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// Heading anchors as currently laid out, in document order.
///
/// Positions are relative to the viewport: a negative `top` means the
/// heading has scrolled past the top edge.
pub trait AnchorSource: Send + Sync {
    fn anchors(&self) -> Vec<HeadingAnchor>;
}

impl<F> AnchorSource for F
where
    F: Fn() -> Vec<HeadingAnchor> + Send + Sync,
{
    fn anchors(&self) -> Vec<HeadingAnchor> {
        self()
    }
}
