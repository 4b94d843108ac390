//! Table of contents derivation.
//!
//! Headings are collected from a page's content tree in document order,
//! descending into synced blocks and column layouts but not into sub-pages.
//! Raw heading depths are then normalized so that the outline never jumps
//! more than one level at a time.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::ids::uuid_to_id;
use crate::models::{Block, BlockType, RecordMap};

/// Heading level of a table of contents entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingType {
    Header,
    SubHeader,
    SubSubHeader,
}

impl HeadingType {
    /// Heading level of a block type, if it is a heading.
    pub fn from_block_type(block_type: &BlockType) -> Option<Self> {
        match block_type {
            BlockType::Header => Some(Self::Header),
            BlockType::SubHeader => Some(Self::SubHeader),
            BlockType::SubSubHeader => Some(Self::SubSubHeader),
            _ => None,
        }
    }

    /// Depth before normalization.
    pub fn raw_indent(self) -> i32 {
        match self {
            Self::Header => 0,
            Self::SubHeader => 1,
            Self::SubSubHeader => 2,
        }
    }
}

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    /// Anchor id of the heading (block id without dashes).
    pub id: String,
    #[serde(rename = "type")]
    pub heading_type: HeadingType,
    pub text: String,
    pub indent_level: i32,
}

/// Table of contents of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
    /// Whether there are enough headings to show the table of contents.
    pub has_toc: bool,
}

impl TableOfContents {
    pub fn derive(page: &Block, record_map: &RecordMap, min_items: usize) -> Self {
        let entries = page_table_of_contents(page, record_map);
        let has_toc = has_toc(entries.len(), min_items);
        Self { entries, has_toc }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `entry_count` headings warrant a table of contents.
pub fn has_toc(entry_count: usize, min_items: usize) -> bool {
    entry_count >= min_items
}

/// Headings of a page in document order, with normalized indent levels.
pub fn page_table_of_contents(page: &Block, record_map: &RecordMap) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut path = HashSet::new();
    path.insert(page.id.as_str());
    collect_headings(&page.content, record_map, &mut path, &mut entries);

    normalize_indent_levels(&mut entries);

    debug!(
        subsystem = "core",
        component = "toc",
        page_id = %page.id,
        result_count = entries.len(),
        "Table of contents derived"
    );
    entries
}

fn collect_headings<'a>(
    content: &'a [String],
    record_map: &'a RecordMap,
    path: &mut HashSet<&'a str>,
    entries: &mut Vec<TocEntry>,
) {
    for block_id in content {
        let Some(block) = record_map.block_by_id(block_id) else {
            continue;
        };

        if let Some(heading_type) = HeadingType::from_block_type(&block.block_type) {
            trace!(block_id = %block_id, heading = ?heading_type, "Heading found");
            entries.push(TocEntry {
                id: uuid_to_id(block_id),
                heading_type,
                text: block.title(),
                indent_level: heading_type.raw_indent(),
            });
        } else if block.block_type.is_pass_through() {
            // A container that (transitively) contains itself is skipped.
            if !path.insert(block_id.as_str()) {
                trace!(block_id = %block_id, "Container cycle, skipped");
                continue;
            }
            collect_headings(&block.content, record_map, path, entries);
            path.remove(block_id.as_str());
        }
    }
}

/// Rewrite indent levels so each heading is at most one level deeper than
/// the heading it falls under.
///
/// A stack of `(actual, effective)` levels tracks the current outline path.
/// A deeper heading nests one below the top of the stack, a heading at the
/// same raw depth takes the same effective level, and a shallower one pops
/// until one of those applies.
pub fn normalize_indent_levels(entries: &mut [TocEntry]) {
    let mut stack: Vec<(i32, i32)> = vec![(-1, -1)];

    for entry in entries.iter_mut() {
        let actual = entry.indent_level;
        loop {
            let (top_actual, top_effective) = stack.last().copied().unwrap_or((-1, -1));

            if actual > top_actual {
                entry.indent_level = top_effective + 1;
                stack.push((actual, entry.indent_level));
                break;
            }
            if actual == top_actual {
                entry.indent_level = top_effective;
                break;
            }
            if stack.len() > 1 {
                stack.pop();
            } else {
                // Below the sentinel: treat as a new top-level heading.
                entry.indent_level = 0;
                break;
            }
        }
    }
}
