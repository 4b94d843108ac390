//! Fail-soft lookups into a [`RecordMap`].
//!
//! Every accessor returns `None` for unknown ids, for entries whose value did
//! not parse, and for dangling cross references. Nothing here panics.

use serde_json::Value;

use crate::error::Result;
use crate::models::{Block, Collection, CollectionQueryResult, CollectionView, RecordMap};

impl RecordMap {
    /// Parse a record map from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a record map from an already decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn block_by_id(&self, id: &str) -> Option<&Block> {
        self.block.get(id)?.value.as_ref()
    }

    pub fn collection_by_id(&self, id: &str) -> Option<&Collection> {
        self.collection.get(id)?.value.as_ref()
    }

    pub fn view_by_id(&self, id: &str) -> Option<&CollectionView> {
        self.collection_view.get(id)?.value.as_ref()
    }

    /// Query result of one collection as seen through one view.
    pub fn query_result(
        &self,
        collection_id: &str,
        view_id: &str,
    ) -> Option<&CollectionQueryResult> {
        self.collection_query.get(collection_id)?.get(view_id)
    }

    /// Blocks among `ids` that exist, in order.
    pub fn blocks<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a Block> + 'a {
        ids.iter().filter_map(move |id| self.block_by_id(id))
    }

    /// Merge another snapshot into this one. Entries in `other` win.
    pub fn merge(&mut self, other: RecordMap) {
        self.block.extend(other.block);
        self.collection.extend(other.collection);
        self.collection_view.extend(other.collection_view);
        for (collection_id, views) in other.collection_query {
            self.collection_query
                .entry(collection_id)
                .or_default()
                .extend(views);
        }
    }
}
