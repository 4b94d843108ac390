//! End-to-end derivation over a realistic record map.
//!
//! Exercises a page holding a grouped gallery, a board inside a synced
//! block and a nested heading outline, the way the store sends it
//! (double-wrapped records, synthetic buckets, stray fields).

use pagegraph_core::{
    PageView, RecordMap, RenderConfig, TableOfContents, ViewType,
};
use serde_json::{json, Value};

const PAGE: &str = "0b6a2f1e-3c4d-4e5f-8a9b-0c1d2e3f4a5b";

fn fixture() -> Value {
    json!({
        "block": {
            PAGE: { "role": "reader", "value": { "id": PAGE, "type": "page",
                "properties": { "title": [["Roadmap"]] },
                "content": ["h-intro", "gallery", "h-plan", "synced", "h-detail", "h-close"] } },
            "h-intro": { "value": { "role": "reader", "value": { "id": "h-intro", "type": "header",
                "properties": { "title": [["Intro"]] } } } },
            "h-plan": { "value": { "id": "h-plan", "type": "sub_sub_header",
                "properties": { "title": [["Plan"]] } } },
            "synced": { "value": { "id": "synced", "type": "transclusion_container",
                "content": ["board", "h-synced"] } },
            "h-synced": { "value": { "id": "h-synced", "type": "sub_sub_header",
                "properties": { "title": [["Synced notes"]] } } },
            "h-detail": { "value": { "id": "h-detail", "type": "sub_header",
                "properties": { "title": [["Detail"]] } } },
            "h-close": { "value": { "id": "h-close", "type": "header",
                "properties": { "title": [["Close"]] } } },
            "gallery": { "value": { "id": "gallery", "type": "collection_view",
                "collection_id": "coll", "view_ids": ["v-gallery", "v-board"] } },
            "board": { "value": { "id": "board", "type": "collection_view",
                "collection_id": "coll", "view_ids": ["v-board"] } },
            "t1": { "value": { "id": "t1", "type": "page", "format": { "page_cover": "https://img.test/t1.png" } } },
            "t2": { "value": { "id": "t2", "type": "page" } },
            "t3": { "value": { "id": "t3", "type": "page" } }
        },
        "collection": {
            "coll": { "value": { "id": "coll", "name": [["Tasks"]],
                "schema": {
                    "title": { "name": "Name", "type": "title" },
                    "stat": { "name": "Status", "type": "status" }
                } } }
        },
        "collection_view": {
            "v-gallery": { "value": { "id": "v-gallery", "type": "gallery",
                "format": {
                    "collection_group_by": "stat",
                    "collection_groups": [
                        { "property": "stat", "hidden": false, "value": { "type": "status", "value": "Doing" } },
                        { "property": "stat", "hidden": true, "value": { "type": "status", "value": "Done" } }
                    ],
                    "gallery_cover": { "type": "page_cover" }
                } } },
            "v-board": { "value": { "id": "v-board", "type": "board",
                "format": {
                    "board_columns_by": { "groupBy": "stat" },
                    "board_columns": [
                        { "property": "stat", "value": { "type": "status", "value": "Doing" } },
                        { "property": "stat", "value": { "type": "status", "value": "Done" } },
                        { "property": "stat", "value": { "type": "status" } }
                    ]
                } } }
        },
        "collection_query": {
            "coll": {
                "v-gallery": {
                    "collection_group_results": { "type": "results", "blockIds": ["t1", "t2", "t3"], "hasMore": false },
                    "aggregationResults": [
                        { "type": "status", "value": "Doing" },
                        { "type": "status", "value": "Done" },
                        { "type": "status", "value": "Blocked" }
                    ],
                    "results:stat:Doing": { "blockIds": ["t1"] },
                    "results:stat:Done": { "blockIds": ["t2", "t3"] }
                },
                "v-board": {
                    "board_columns": { "results": [
                        { "value": { "value": { "stat": "In progress" } }, "total": 4 },
                        { "total": 2 }
                    ] },
                    "results:status:Doing": { "blockIds": ["t1"] },
                    "results:status:Done": { "blockIds": ["t2", "t3"] },
                    "results:status:uncategorized": { "blockIds": [] }
                }
            }
        }
    })
}

fn derive() -> PageView {
    let map = RecordMap::from_value(fixture()).unwrap();
    PageView::derive(&map, PAGE, &RenderConfig::default()).unwrap()
}

#[test]
fn test_table_of_contents_outline() {
    let view = derive();
    let outline: Vec<(&str, i32)> = view
        .toc
        .entries
        .iter()
        .map(|e| (e.text.as_str(), e.indent_level))
        .collect();

    assert_eq!(
        outline,
        vec![
            ("Intro", 0),
            ("Plan", 1),
            ("Synced notes", 1),
            ("Detail", 1),
            ("Close", 0),
        ]
    );
    assert_eq!(view.toc.entries[0].id, "hintro");
    assert!(view.toc.has_toc);
}

#[test]
fn test_grouped_gallery() {
    let view = derive();
    let gallery = &view.collections[0];

    assert_eq!(gallery.block_id, "gallery");
    assert_eq!(gallery.view_id.as_deref(), Some("v-gallery"));
    assert_eq!(gallery.view_type, ViewType::Gallery);
    assert!(gallery.is_grouped);
    assert!(gallery.block_ids.is_empty());

    let groups: Vec<(&str, bool, usize)> = gallery
        .groups
        .iter()
        .map(|g| (g.value.as_str(), g.hidden, g.total))
        .collect();
    assert_eq!(groups, vec![("Doing", false, 1), ("Done", true, 2)]);

    assert_eq!(gallery.covers.len(), 1);
    assert_eq!(gallery.covers["t1"].position, 50.0);
}

#[test]
fn test_board_inside_synced_block() {
    let view = derive();
    assert_eq!(view.collections.len(), 2);
    let board = &view.collections[1];

    assert_eq!(board.block_id, "board");
    assert_eq!(board.view_type, ViewType::Board);
    assert_eq!(board.board_group_by.as_deref(), Some("stat"));

    let columns: Vec<(Option<&str>, usize)> = board
        .board_columns
        .iter()
        .map(|c| (c.value.as_deref(), c.total))
        .collect();
    assert_eq!(
        columns,
        vec![(Some("In progress"), 4), (Some("Done"), 2), (None, 0)]
    );
    assert_eq!(board.board_columns[1].block_ids, vec!["t2", "t3"]);
}

#[test]
fn test_page_view_serializes() {
    let json = serde_json::to_value(derive()).unwrap();

    assert_eq!(json["title"], "Roadmap");
    assert_eq!(json["toc"]["hasToc"], true);
    assert_eq!(json["toc"]["entries"][1]["type"], "sub_sub_header");
    assert_eq!(json["collections"][0]["view_type"], "gallery");
    assert_eq!(json["collections"][1]["board_columns"][0]["value"], "In progress");
}

#[test]
fn test_higher_threshold_hides_toc() {
    let map = RecordMap::from_value(fixture()).unwrap();
    let page = map.block_by_id(PAGE).unwrap();
    let toc = TableOfContents::derive(page, &map, 10);
    assert_eq!(toc.entries.len(), 5);
    assert!(!toc.has_toc);
}

#[test]
fn test_malformed_sections_degrade_to_empty() {
    let map = RecordMap::from_value(json!({
        "block": {
            PAGE: { "value": { "id": PAGE, "type": "page", "content": ["cv"] } },
            "cv": { "value": { "id": "cv", "type": "collection_view", "collection_id": "c", "view_ids": ["v"] } }
        },
        "collection": "not a map",
        "collection_view": { "v": { "value": { "id": "v", "type": "board", "format": { "board_columns": 3 } } } },
        "collection_query": []
    }))
    .unwrap();

    let view = PageView::derive(&map, PAGE, &RenderConfig::default()).unwrap();
    let cv = &view.collections[0];
    assert_eq!(cv.name, "");
    assert!(cv.board_columns.is_empty());
    assert!(cv.block_ids.is_empty());
    assert!(view.toc.entries.is_empty());
}
