//! Centralized default constants for pagegraph.
//!
//! Every crate references these instead of defining its own magic numbers.
//! Organized by domain area.

// =============================================================================
// TABLE OF CONTENTS
// =============================================================================

/// Minimum number of headings before a table of contents is shown.
pub const MIN_TOC_ITEMS: usize = 3;

// =============================================================================
// SCROLL SPY
// =============================================================================

/// At most one active-section recomputation per this many milliseconds.
pub const SCROLL_SPY_WINDOW_MS: u64 = 100;

/// Lower bound (pixels) of the activation offset applied to each heading.
pub const ACTIVATION_OFFSET_FLOOR_PX: f64 = 150.0;

/// The activation offset grows with the gap to the previous heading,
/// divided by this factor.
pub const ACTIVATION_GAP_DIVISOR: f64 = 4.0;

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Display name for a collection whose rich-text name is empty.
pub const UNTITLED_COLLECTION: &str = "Untitled";

/// Value placeholder used in synthetic bucket keys for columns without a value.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Value type assumed for board columns that do not declare one.
pub const BOARD_COLUMN_VALUE_TYPE: &str = "select";

/// `collection_group_results.type` marker for server-grouped results.
pub const GROUP_RESULTS_TYPE: &str = "results";

// =============================================================================
// COVERS
// =============================================================================

/// Cover position (0.0 = top, 1.0 = bottom) when a block sets none.
pub const COVER_POSITION: f64 = 0.5;

/// Cover position percentage when the block carries no format at all.
pub const COVER_POSITION_PERCENT: f64 = 50.0;

/// Origin prepended to store-relative image paths.
pub const STORE_ORIGIN: &str = "https://www.notion.so";

/// Unsplash images are served directly, never through the image proxy.
pub const UNSPLASH_ORIGIN: &str = "https://images.unsplash.com";

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// Default document store API base URL.
pub const API_BASE_URL: &str = "https://www.notion.so/api/v3";

/// Timeout for document store requests in seconds.
pub const API_TIMEOUT_SECS: u64 = 30;

/// Maximum blocks requested in a single page chunk.
pub const PAGE_CHUNK_LIMIT: u32 = 100;

/// Follow-up rounds fetching content blocks the page chunk left out.
pub const MISSING_BLOCK_ROUNDS: usize = 8;

/// Maximum hits requested from the search endpoint.
pub const SEARCH_LIMIT: u32 = 20;

/// Raw page id meaning "the site's root page".
pub const INDEX_PAGE: &str = "index";
