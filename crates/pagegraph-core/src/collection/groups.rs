//! Grouped collection views ("group by" on gallery, list and table views).

use serde::Serialize;
use tracing::{debug, trace};

use super::resolver::member_ids;
use crate::defaults::GROUP_RESULTS_TYPE;
use crate::models::{Collection, CollectionQueryResult, CollectionView, PropertySchema};

/// One group of a grouped view, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionGroup {
    /// Group-by property id.
    pub property: String,
    pub schema: PropertySchema,
    /// Display value; empty for the single fallback group.
    pub value: String,
    pub hidden: bool,
    pub block_ids: Vec<String>,
    pub total: usize,
}

fn group_by_property(view: Option<&CollectionView>) -> Option<&str> {
    view?
        .format
        .as_ref()?
        .collection_group_by
        .as_deref()
        .filter(|p| !p.is_empty())
}

/// Whether the view groups its members by a property.
pub fn is_grouped(view: Option<&CollectionView>) -> bool {
    group_by_property(view).is_some()
}

/// Groups of a grouped view.
///
/// Groups follow the order of `aggregationResults`. An aggregation entry
/// whose bucket `results:<property>:<value>` is missing produces no group.
/// When no group could be built but the store sent pre-grouped ids, they
/// form a single group with an empty value.
pub fn collection_groups(
    collection: Option<&Collection>,
    view: Option<&CollectionView>,
    result: Option<&CollectionQueryResult>,
) -> Vec<CollectionGroup> {
    let (Some(collection), Some(view), Some(result)) = (collection, view, result) else {
        return Vec::new();
    };
    let Some(property) = group_by_property(Some(view)) else {
        return Vec::new();
    };
    let Some(schema) = collection.schema.get(property) else {
        return Vec::new();
    };
    let Some(group_results) = result
        .collection_group_results
        .as_ref()
        .filter(|g| g.result_type.as_deref() == Some(GROUP_RESULTS_TYPE))
    else {
        return Vec::new();
    };

    let configs = view
        .format
        .as_ref()
        .and_then(|f| f.collection_groups.as_deref())
        .unwrap_or_default();

    let mut groups = Vec::new();
    for aggregation in result.aggregation_results.iter().flatten() {
        let value = aggregation.display_value();
        // Empty values are not mapped to "uncategorized" here.
        let key = format!("results:{property}:{value}");
        let Some(block_ids) = result.bucket(&key) else {
            trace!(bucket_key = %key, "No bucket for aggregation entry, group skipped");
            continue;
        };

        let hidden = configs
            .iter()
            .find(|config| config.literal_value().as_deref() == Some(value.as_str()))
            .is_some_and(|config| config.hidden);

        groups.push(CollectionGroup {
            property: property.to_string(),
            schema: schema.clone(),
            total: block_ids.len(),
            value,
            hidden,
            block_ids,
        });
    }

    if groups.is_empty() {
        if let Some(ids) = &group_results.block_ids {
            groups.push(CollectionGroup {
                property: property.to_string(),
                schema: schema.clone(),
                value: String::new(),
                hidden: false,
                block_ids: ids.clone(),
                total: ids.len(),
            });
        }
    }

    debug!(
        subsystem = "core",
        component = "groups",
        group_by = property,
        result_count = groups.len(),
        "Collection groups derived"
    );
    groups
}

/// Flat member ids of an ungrouped view; empty when the view is grouped.
pub fn ungrouped_block_ids(
    view: Option<&CollectionView>,
    result: Option<&CollectionQueryResult>,
) -> Vec<String> {
    if is_grouped(view) {
        return Vec::new();
    }
    member_ids(result).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn collection() -> Collection {
        serde_json::from_value(json!({
            "id": "c1",
            "schema": { "status": { "name": "Status", "type": "select" } }
        }))
        .unwrap()
    }

    fn gallery(format: Value) -> CollectionView {
        serde_json::from_value(json!({ "id": "v1", "type": "gallery", "format": format })).unwrap()
    }

    fn query(value: Value) -> CollectionQueryResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_bucket_drops_group() {
        let view = gallery(json!({ "collection_group_by": "status" }));
        let result = query(json!({
            "collection_group_results": { "type": "results", "blockIds": ["a", "b"] },
            "aggregationResults": [{ "type": "select", "value": "x" }, { "type": "select", "value": "y" }],
            "results:status:x": { "blockIds": ["a"] }
        }));

        let groups = collection_groups(Some(&collection()), Some(&view), Some(&result));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].value, "x");
        assert_eq!(groups[0].block_ids, vec!["a"]);
        assert_eq!(groups[0].total, 1);
        assert_eq!(groups[0].schema.name, "Status");
    }

    #[test]
    fn test_groups_follow_aggregation_order_and_hidden_flags() {
        let view = gallery(json!({
            "collection_group_by": "status",
            "collection_groups": [
                { "property": "status", "hidden": true, "value": { "type": "select", "value": "Done" } },
                { "property": "status", "hidden": false, "value": { "type": "select", "value": "Todo" } }
            ]
        }));
        let result = query(json!({
            "collection_group_results": { "type": "results", "blockIds": [] },
            "aggregationResults": [
                { "type": "select", "value": "Todo" },
                { "type": "select", "value": "Done" },
                { "type": "select", "value": "Later" }
            ],
            "results:status:Done": { "blockIds": ["d1", "d2"] },
            "results:status:Todo": { "blockIds": ["t1"] },
            "results:status:Later": { "blockIds": [] }
        }));

        let groups = collection_groups(Some(&collection()), Some(&view), Some(&result));
        let summary: Vec<(&str, bool, usize)> = groups
            .iter()
            .map(|g| (g.value.as_str(), g.hidden, g.total))
            .collect();
        assert_eq!(
            summary,
            vec![("Todo", false, 1), ("Done", true, 2), ("Later", false, 0)]
        );
    }

    #[test]
    fn test_absent_aggregation_value_uses_empty_key() {
        let view = gallery(json!({ "collection_group_by": "status" }));
        let result = query(json!({
            "collection_group_results": { "type": "results" },
            "aggregationResults": [{ "type": "select" }],
            "results:status:": { "blockIds": ["n1"] },
            "results:status:uncategorized": { "blockIds": ["u1"] }
        }));

        let groups = collection_groups(Some(&collection()), Some(&view), Some(&result));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].value, "");
        assert_eq!(groups[0].block_ids, vec!["n1"]);
    }

    #[test]
    fn test_numeric_value_formatting_mismatch_drops_group() {
        let view = gallery(json!({ "collection_group_by": "status" }));
        let result = query(json!({
            "collection_group_results": { "type": "results" },
            "aggregationResults": [{ "type": "number", "value": 1 }],
            "results:status:1.0": { "blockIds": ["n1"] }
        }));

        assert!(collection_groups(Some(&collection()), Some(&view), Some(&result)).is_empty());
    }

    #[test]
    fn test_hidden_flag_matches_non_string_config_values() {
        let view = gallery(json!({
            "collection_group_by": "status",
            "collection_groups": [
                { "property": "status", "hidden": true, "value": { "type": "checkbox", "value": true } }
            ]
        }));
        let result = query(json!({
            "collection_group_results": { "type": "results" },
            "aggregationResults": [
                { "type": "checkbox", "value": true },
                { "type": "checkbox", "value": false }
            ],
            "results:status:true": { "blockIds": ["t1"] },
            "results:status:false": { "blockIds": ["f1"] }
        }));

        let groups = collection_groups(Some(&collection()), Some(&view), Some(&result));
        let summary: Vec<(&str, bool)> = groups.iter().map(|g| (g.value.as_str(), g.hidden)).collect();
        assert_eq!(summary, vec![("true", true), ("false", false)]);
    }

    #[test]
    fn test_fallback_single_group_from_group_results() {
        let view = gallery(json!({ "collection_group_by": "status" }));
        let result = query(json!({
            "collection_group_results": { "type": "results", "blockIds": ["a", "b"] }
        }));

        let groups = collection_groups(Some(&collection()), Some(&view), Some(&result));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].value, "");
        assert!(!groups[0].hidden);
        assert_eq!(groups[0].total, 2);
    }

    #[test]
    fn test_requires_results_marker_and_schema() {
        let view = gallery(json!({ "collection_group_by": "status" }));
        let result = query(json!({
            "collection_group_results": { "type": "reducer", "blockIds": ["a"] },
            "aggregationResults": [{ "value": "x" }],
            "results:status:x": { "blockIds": ["a"] }
        }));
        assert!(collection_groups(Some(&collection()), Some(&view), Some(&result)).is_empty());

        let view = gallery(json!({ "collection_group_by": "missing_prop" }));
        let result = query(json!({
            "collection_group_results": { "type": "results", "blockIds": ["a"] }
        }));
        assert!(collection_groups(Some(&collection()), Some(&view), Some(&result)).is_empty());
    }

    #[test]
    fn test_ungrouped_ids_empty_when_grouped() {
        let grouped = gallery(json!({ "collection_group_by": "status" }));
        let plain = gallery(json!({ "collection_group_by": "" }));
        let result = query(json!({ "blockIds": ["a", "b"] }));

        assert!(is_grouped(Some(&grouped)));
        assert!(!is_grouped(Some(&plain)));
        assert!(ungrouped_block_ids(Some(&grouped), Some(&result)).is_empty());
        assert_eq!(ungrouped_block_ids(Some(&plain), Some(&result)), vec!["a", "b"]);
        assert_eq!(ungrouped_block_ids(None, Some(&result)), vec!["a", "b"]);
    }
}
