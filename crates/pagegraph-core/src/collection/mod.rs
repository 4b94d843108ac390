//! Collection view materialization.
//!
//! Turns a collection's schema, a view's format and the flat query-result
//! bag into member lists, groups and board columns.
//!
//! Buckets in the query result are addressed by synthetic keys of the form
//! `results:<valueType>:<value>`. Keys are built here and compared byte for
//! byte; a key that does not match yields an empty bucket, never an error.

pub mod board;
pub mod cover;
pub mod groups;
pub mod resolver;

pub use board::{board_columns, board_group_by, BoardColumn};
pub use cover::{
    cover_position, cover_url, default_map_image_url, view_card_cover, CardCoverInfo, MapImageUrl,
};
pub use groups::{collection_groups, is_grouped, ungrouped_block_ids, CollectionGroup};
pub use resolver::{member_ids, CollectionData, MemberSource};

use crate::defaults::UNCATEGORIZED;

/// Bucket holding relation-filtered members of a linked view.
pub const RELATION_BUCKET: &str = "results:relation:uncategorized";

/// Synthetic bucket key for a value type and value.
///
/// An empty or missing value addresses the `uncategorized` bucket.
pub fn results_key(value_type: &str, value: Option<&str>) -> String {
    let value = value.filter(|v| !v.is_empty()).unwrap_or(UNCATEGORIZED);
    format!("results:{value_type}:{value}")
}
