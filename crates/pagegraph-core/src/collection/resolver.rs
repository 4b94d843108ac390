//! Resolve the collection, view and query result behind a collection-view
//! block.

use serde::Serialize;
use tracing::{debug, trace};

use super::board::{self, BoardColumn};
use super::groups::{self, CollectionGroup};
use super::RELATION_BUCKET;
use crate::defaults::UNTITLED_COLLECTION;
use crate::models::{
    Block, Collection, CollectionQueryResult, CollectionView, RecordMap, Schema, ViewType,
};
use crate::text::text_content;

static EMPTY_SCHEMA: Schema = Schema::new();

/// Which source the flat member list was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSource {
    /// `collection_group_results.blockIds`
    GroupResults,
    /// The `results:relation:uncategorized` bucket
    RelationBucket,
    /// The query result's own `blockIds`
    QueryResult,
    Empty,
}

/// Flat member ids of a query result.
///
/// Sources are tried in a fixed order: pre-grouped results, then the
/// relation bucket, then the raw result set. The first one present wins,
/// even when it is empty.
pub fn member_ids(result: Option<&CollectionQueryResult>) -> (MemberSource, Vec<String>) {
    let Some(result) = result else {
        return (MemberSource::Empty, Vec::new());
    };

    if let Some(ids) = result.group_result_ids() {
        return (MemberSource::GroupResults, ids.to_vec());
    }

    if let Some(ids) = result.bucket(RELATION_BUCKET) {
        return (MemberSource::RelationBucket, ids);
    }

    match &result.block_ids {
        Some(ids) => (MemberSource::QueryResult, ids.clone()),
        None => (MemberSource::Empty, Vec::new()),
    }
}

/// Everything a collection-view block points at.
///
/// The block's first view id is the one displayed; other views are ignored.
/// Each reference may dangle, in which case the corresponding field is
/// `None` and the derived values fall back to empty.
#[derive(Debug, Clone, Copy)]
pub struct CollectionData<'a> {
    pub collection_id: Option<&'a str>,
    pub view_id: Option<&'a str>,
    pub collection: Option<&'a Collection>,
    pub view: Option<&'a CollectionView>,
    pub query_result: Option<&'a CollectionQueryResult>,
}

impl<'a> CollectionData<'a> {
    pub fn resolve(record_map: &'a RecordMap, block: &'a Block) -> Self {
        let collection_id = block.collection_id.as_deref().filter(|id| !id.is_empty());
        let view_id = block
            .view_ids
            .first()
            .map(String::as_str)
            .filter(|id| !id.is_empty());

        let collection = collection_id.and_then(|id| record_map.collection_by_id(id));
        let view = view_id.and_then(|id| record_map.view_by_id(id));
        let query_result = match (collection_id, view_id) {
            (Some(c), Some(v)) => record_map.query_result(c, v),
            _ => None,
        };

        trace!(
            subsystem = "core",
            component = "collection",
            block_id = %block.id,
            collection_id = collection_id.unwrap_or_default(),
            view_id = view_id.unwrap_or_default(),
            has_collection = collection.is_some(),
            has_view = view.is_some(),
            has_query_result = query_result.is_some(),
            "Resolved collection view block"
        );

        Self {
            collection_id,
            view_id,
            collection,
            view,
            query_result,
        }
    }

    /// Plain-text collection name: empty when the collection is missing,
    /// `"Untitled"` when its name flattens to nothing.
    pub fn collection_name(&self) -> String {
        let Some(collection) = self.collection else {
            return String::new();
        };
        let name = collection
            .name
            .as_ref()
            .map(text_content)
            .unwrap_or_default();
        if name.is_empty() {
            UNTITLED_COLLECTION.to_string()
        } else {
            name
        }
    }

    /// The collection's schema, or an empty one.
    pub fn schema(&self) -> &'a Schema {
        self.collection
            .map(|c| &c.schema)
            .unwrap_or(&EMPTY_SCHEMA)
    }

    /// Layout of the view, `table` when unknown.
    pub fn view_type(&self) -> ViewType {
        self.view.and_then(|v| v.view_type).unwrap_or_default()
    }

    /// Flat member ids (see [`member_ids`]).
    pub fn block_ids(&self) -> Vec<String> {
        let (source, ids) = member_ids(self.query_result);
        debug!(
            subsystem = "core",
            component = "collection",
            source = ?source,
            result_count = ids.len(),
            "Member ids resolved"
        );
        ids
    }

    pub fn is_grouped(&self) -> bool {
        groups::is_grouped(self.view)
    }

    pub fn groups(&self) -> Vec<CollectionGroup> {
        groups::collection_groups(self.collection, self.view, self.query_result)
    }

    pub fn ungrouped_block_ids(&self) -> Vec<String> {
        groups::ungrouped_block_ids(self.view, self.query_result)
    }

    pub fn board_columns(&self) -> Vec<BoardColumn> {
        board::board_columns(self.collection, self.view, self.query_result)
    }

    pub fn board_group_by(&self) -> Option<&'a str> {
        board::board_group_by(self.view)
    }
}
