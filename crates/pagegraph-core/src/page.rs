//! Everything derived for one page, ready to render.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::collection::{
    default_map_image_url, view_card_cover, BoardColumn, CardCoverInfo, CollectionData,
    CollectionGroup, MapImageUrl,
};
use crate::config::RenderConfig;
use crate::ids::{map_page_url, parse_page_id};
use crate::models::{Block, CoverType, RecordMap, ViewType};
use crate::text::block_title;
use crate::toc::TableOfContents;

/// Derived state of one collection-view block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionViewData {
    pub block_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    pub name: String,
    pub view_type: ViewType,
    pub is_grouped: bool,
    /// Flat member list; empty for grouped views.
    pub block_ids: Vec<String>,
    pub groups: Vec<CollectionGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_group_by: Option<String>,
    pub board_columns: Vec<BoardColumn>,
    /// Card covers of members that have one, keyed by member id.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub covers: BTreeMap<String, CardCoverInfo>,
}

impl CollectionViewData {
    pub fn derive(record_map: &RecordMap, block: &Block, map_image_url: MapImageUrl<'_>) -> Self {
        let data = CollectionData::resolve(record_map, block);
        let groups = data.groups();
        let board_columns = data.board_columns();
        let block_ids = data.ungrouped_block_ids();

        let mut covers = BTreeMap::new();
        if let Some(cover) = data
            .view
            .and_then(view_card_cover)
            .filter(|cover| cover.cover_type != CoverType::Empty)
        {
            let members = block_ids
                .iter()
                .chain(groups.iter().flat_map(|g| &g.block_ids))
                .chain(board_columns.iter().flat_map(|c| &c.block_ids));
            for member_id in members {
                let Some(member) = record_map.block_by_id(member_id) else {
                    continue;
                };
                let info =
                    CardCoverInfo::resolve(member, data.collection, cover, record_map, map_image_url);
                if info.has_cover() {
                    covers.insert(member_id.clone(), info);
                }
            }
        }

        Self {
            block_id: block.id.clone(),
            collection_id: data.collection_id.map(str::to_string),
            view_id: data.view_id.map(str::to_string),
            name: data.collection_name(),
            view_type: data.view_type(),
            is_grouped: data.is_grouped(),
            block_ids,
            groups,
            board_group_by: data.board_group_by().map(str::to_string),
            board_columns,
            covers,
        }
    }
}

/// A page with its table of contents and collection views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub page_id: String,
    pub title: String,
    /// Site-relative URL.
    pub url: String,
    pub toc: TableOfContents,
    pub collections: Vec<CollectionViewData>,
}

impl PageView {
    /// Derive the view of `page_id`, or `None` when the record map does not
    /// hold that page.
    pub fn derive(record_map: &RecordMap, page_id: &str, config: &RenderConfig) -> Option<Self> {
        Self::derive_with(record_map, page_id, config, &default_map_image_url)
    }

    pub fn derive_with(
        record_map: &RecordMap,
        page_id: &str,
        config: &RenderConfig,
        map_image_url: MapImageUrl<'_>,
    ) -> Option<Self> {
        let page = record_map.block_by_id(page_id).or_else(|| {
            parse_page_id(page_id).and_then(|id| record_map.block_by_id(&id))
        })?;

        let toc = TableOfContents::derive(page, record_map, config.min_toc_items);
        let collections: Vec<CollectionViewData> = collection_view_blocks(page, record_map)
            .into_iter()
            .map(|block| CollectionViewData::derive(record_map, block, map_image_url))
            .collect();

        debug!(
            subsystem = "core",
            component = "page",
            page_id = %page.id,
            toc_entries = toc.len(),
            has_toc = toc.has_toc,
            result_count = collections.len(),
            "Page view derived"
        );

        Some(Self {
            page_id: page.id.clone(),
            title: block_title(page),
            url: map_page_url(config.root_page_id.as_deref(), &page.id),
            toc,
            collections,
        })
    }
}

/// Collection-view blocks reachable from a page, in document order: the
/// page itself when it is a full-page collection, then its content,
/// descending into pass-through containers.
pub fn collection_view_blocks<'a>(page: &'a Block, record_map: &'a RecordMap) -> Vec<&'a Block> {
    let mut found = Vec::new();
    if page.block_type.is_collection_view() {
        found.push(page);
    }
    let mut path = HashSet::new();
    path.insert(page.id.as_str());
    collect_collection_views(&page.content, record_map, &mut path, &mut found);
    found
}

fn collect_collection_views<'a>(
    content: &'a [String],
    record_map: &'a RecordMap,
    path: &mut HashSet<&'a str>,
    found: &mut Vec<&'a Block>,
) {
    for block_id in content {
        let Some(block) = record_map.block_by_id(block_id) else {
            continue;
        };
        if block.block_type.is_collection_view() {
            found.push(block);
        } else if block.block_type.is_pass_through() && path.insert(block_id.as_str()) {
            collect_collection_views(&block.content, record_map, path, found);
            path.remove(block_id.as_str());
        }
    }
}
