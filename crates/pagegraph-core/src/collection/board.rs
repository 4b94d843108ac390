//! Board view columns.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::results_key;
use crate::defaults::BOARD_COLUMN_VALUE_TYPE;
use crate::models::{
    BoardColumnResult, Collection, CollectionQueryResult, CollectionView, GroupConfig,
    PropertySchema, ViewType,
};

/// One board column, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub property: String,
    /// Schema of the column's property; `None` when the collection lacks it.
    pub schema: Option<PropertySchema>,
    /// Column label.
    pub value: Option<String>,
    pub value_type: String,
    pub hidden: bool,
    pub block_ids: Vec<String>,
    pub total: usize,
}

/// Property id the board is split on.
pub fn board_group_by(view: Option<&CollectionView>) -> Option<&str> {
    view?
        .format
        .as_ref()?
        .board_columns_by
        .as_ref()?
        .group_by
        .as_deref()
}

/// Column definitions: `board_columns`, or the legacy `board_groups2` when
/// the former is missing or empty.
fn column_configs(view: &CollectionView) -> &[GroupConfig] {
    let Some(format) = view.format.as_ref() else {
        return &[];
    };
    [&format.board_columns, &format.board_groups2]
        .into_iter()
        .filter_map(|configs| configs.as_deref())
        .find(|configs| !configs.is_empty())
        .unwrap_or_default()
}

/// Label precedence: a string from the aggregate, then the aggregate's entry
/// for the group-by property, then the column's own value.
fn column_label(
    config: &GroupConfig,
    column_result: Option<&BoardColumnResult>,
    group_by: Option<&str>,
) -> Option<String> {
    let literal = config.literal_value();
    let aggregate = column_result
        .and_then(|r| r.value.as_ref())
        .and_then(|v| v.value.as_ref());

    match aggregate {
        Some(Value::String(label)) if !label.is_empty() => Some(label.clone()),
        Some(Value::Object(entries)) => group_by
            .and_then(|key| entries.get(key))
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .or(literal),
        _ => literal,
    }
}

/// Columns of a board view.
///
/// Empty unless the view is a board and the collection, view and query
/// result are all present. Column `i` takes its aggregate from
/// `board_columns.results[i]`; a missing aggregate falls back to the
/// bucket's size.
pub fn board_columns(
    collection: Option<&Collection>,
    view: Option<&CollectionView>,
    result: Option<&CollectionQueryResult>,
) -> Vec<BoardColumn> {
    let (Some(collection), Some(view), Some(result)) = (collection, view, result) else {
        return Vec::new();
    };
    if view.view_type != Some(ViewType::Board) {
        return Vec::new();
    }

    let configs = column_configs(view);
    let group_by = board_group_by(Some(view));
    let aggregates = result
        .board_columns
        .as_ref()
        .map(|b| b.results.as_slice())
        .unwrap_or_default();

    let columns: Vec<BoardColumn> = configs
        .iter()
        .enumerate()
        .map(|(index, config)| {
            let value_type = config
                .value
                .as_ref()
                .and_then(|v| v.value_type.as_deref())
                .filter(|t| !t.is_empty())
                .unwrap_or(BOARD_COLUMN_VALUE_TYPE)
                .to_string();
            let key = results_key(&value_type, config.key_value().as_deref());
            let bucket = result.bucket(&key);
            let column_result = aggregates.get(index).and_then(Option::as_ref);

            if bucket.is_none() {
                trace!(bucket_key = %key, column = index, "No bucket for board column");
            }

            let total = column_result
                .and_then(|r| r.total)
                .map(|t| t as usize)
                .or_else(|| bucket.as_ref().map(Vec::len))
                .unwrap_or(0);

            BoardColumn {
                property: config.property.clone(),
                schema: collection.schema.get(&config.property).cloned(),
                value: column_label(config, column_result, group_by),
                value_type,
                hidden: config.hidden,
                block_ids: bucket.unwrap_or_default(),
                total,
            }
        })
        .collect();

    debug!(
        subsystem = "core",
        component = "board",
        view_id = %view.id,
        result_count = columns.len(),
        "Board columns derived"
    );
    columns
}
