//! Core data models for pagegraph.
//!
//! These types mirror the document store's record map wire format. Every
//! field that the store may omit, or send in an unexpected shape, is parsed
//! leniently: a mismatch reads as absent data, never as a hard error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::text::block_title;

pub(crate) mod lenient;

/// Collection schema: property id to property definition.
pub type Schema = BTreeMap<String, PropertySchema>;

// =============================================================================
// RECORD MAP
// =============================================================================

/// A denormalized snapshot of part of the document graph.
///
/// The four mappings are independent. A reference from one into another
/// (a block's `collection_id`, a view id) may have no target; see
/// [`crate::record_map`] for the fail-soft accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordMap {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub block: HashMap<String, RecordEntry<Block>>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub collection: HashMap<String, RecordEntry<Collection>>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub collection_view: HashMap<String, RecordEntry<CollectionView>>,
    /// Query results keyed by collection id, then view id. A malformed
    /// entry is dropped on its own.
    #[serde(default, deserialize_with = "lenient::nested_map")]
    pub collection_query: HashMap<String, HashMap<String, CollectionQueryResult>>,
}

/// A record wrapper as sent by the store: `{ "role": ..., "value": {...} }`.
///
/// Some store responses wrap records twice (`{ "value": { "value": {...},
/// "role": ... } }`); both forms are accepted. A value that does not parse
/// as `T` is kept as `None`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordEntry<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub value: Option<T>,
}

impl<T> RecordEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            role: None,
            value: Some(value),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RecordEntry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Object(mut entry) = Value::deserialize(deserializer)? else {
            return Ok(Self {
                role: None,
                value: None,
            });
        };

        let mut role = entry
            .remove("role")
            .and_then(|r| r.as_str().map(str::to_string));
        let mut value = entry.remove("value").unwrap_or(Value::Null);

        let double_wrapped = value.get("id").is_none()
            && value.get("value").is_some_and(Value::is_object);
        if double_wrapped {
            if let Value::Object(mut inner) = value {
                if role.is_none() {
                    role = inner
                        .remove("role")
                        .and_then(|r| r.as_str().map(str::to_string));
                }
                value = inner.remove("value").unwrap_or(Value::Null);
            }
        }

        Ok(Self {
            role,
            value: serde_json::from_value(value).ok(),
        })
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// Block type tag.
///
/// Types the derivation engine does not care about are kept verbatim in
/// [`BlockType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Page,
    Header,
    SubHeader,
    SubSubHeader,
    Text,
    Image,
    Column,
    ColumnList,
    TransclusionContainer,
    TransclusionReference,
    CollectionView,
    CollectionViewPage,
    Other(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Page => "page",
            Self::Header => "header",
            Self::SubHeader => "sub_header",
            Self::SubSubHeader => "sub_sub_header",
            Self::Text => "text",
            Self::Image => "image",
            Self::Column => "column",
            Self::ColumnList => "column_list",
            Self::TransclusionContainer => "transclusion_container",
            Self::TransclusionReference => "transclusion_reference",
            Self::CollectionView => "collection_view",
            Self::CollectionViewPage => "collection_view_page",
            Self::Other(other) => other,
        }
    }

    /// Containers whose children are laid out inline with the parent's
    /// content (synced blocks and column layouts).
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            Self::TransclusionContainer | Self::ColumnList | Self::Column
        )
    }

    /// Blocks that hold a collection view (inline or full page).
    pub fn is_collection_view(&self) -> bool {
        matches!(self, Self::CollectionView | Self::CollectionViewPage)
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "page" => Self::Page,
            "header" => Self::Header,
            "sub_header" => Self::SubHeader,
            "sub_sub_header" => Self::SubSubHeader,
            "text" => Self::Text,
            "image" => Self::Image,
            "column" => Self::Column,
            "column_list" => Self::ColumnList,
            "transclusion_container" => Self::TransclusionContainer,
            "transclusion_reference" => Self::TransclusionReference,
            "collection_view" => Self::CollectionView,
            "collection_view_page" => Self::CollectionViewPage,
            _ => Self::Other(tag),
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the document graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Ordered child block ids.
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub content: Vec<String>,
    /// Rich-text property values, keyed by property id (`title` for the
    /// block's own text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    /// Display metadata (covers, positions, image sources).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_id: Option<String>,
    /// Views of the collection; the first one is the one displayed.
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub view_ids: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    /// Table of the parent record: `block`, `collection`, `space` or `team`.
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_table: Option<String>,
}

impl Block {
    /// Create a bare block of the given type.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            content: Vec::new(),
            properties: None,
            format: None,
            collection_id: None,
            view_ids: Vec::new(),
            parent_id: None,
            parent_table: None,
        }
    }

    /// Raw value of a property, if the block has one.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    /// Raw value of a format field, if the block has one.
    pub fn format_value(&self, key: &str) -> Option<&Value> {
        self.format.as_ref()?.get(key)
    }

    pub fn format_str(&self, key: &str) -> Option<&str> {
        self.format_value(key)?.as_str()
    }

    pub fn format_f64(&self, key: &str) -> Option<f64> {
        self.format_value(key)?.as_f64()
    }

    /// The block's title flattened to plain text.
    pub fn title(&self) -> String {
        block_title(self)
    }

    pub fn has_children(&self) -> bool {
        !self.content.is_empty()
    }
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Collection property type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Title,
    Text,
    Number,
    Select,
    MultiSelect,
    Status,
    Relation,
    File,
    Checkbox,
    Date,
    Person,
    Url,
    Other(String),
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Status => "status",
            Self::Relation => "relation",
            Self::File => "file",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Person => "person",
            Self::Url => "url",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for PropertyType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "title" => Self::Title,
            "text" => Self::Text,
            "number" => Self::Number,
            "select" => Self::Select,
            "multi_select" => Self::MultiSelect,
            "status" => Self::Status,
            "relation" => Self::Relation,
            "file" => Self::File,
            "checkbox" => Self::Checkbox,
            "date" => Self::Date,
            "person" => Self::Person,
            "url" => Self::Url,
            _ => Self::Other(tag),
        }
    }
}

impl From<PropertyType> for String {
    fn from(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// Definition of one collection property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Select/multi-select options, kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl PropertySchema {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            options: None,
        }
    }
}

/// A database of pages with a shared property schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    /// Rich-text display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "lenient::filtered_map")]
    pub schema: Schema,
}

// =============================================================================
// COLLECTION VIEWS
// =============================================================================

/// Collection view layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Table,
    Gallery,
    List,
    Board,
    Calendar,
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::Gallery => "gallery",
            Self::List => "list",
            Self::Board => "board",
            Self::Calendar => "calendar",
        };
        f.write_str(name)
    }
}

/// Where a card's cover image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverType {
    PageCover,
    PageContent,
    Property,
    File,
    #[serde(rename = "none")]
    Empty,
}

/// Cover configuration of a gallery or board view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCover {
    #[serde(rename = "type")]
    pub cover_type: CoverType,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub property: Option<String>,
}

/// The value a group or board column is keyed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_type: Option<String>,
    /// Scalar the group is keyed on: a string, boolean or number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl GroupValue {
    /// The value rendered as a string; `None` for null and non-scalars.
    pub fn display_value(&self) -> Option<String> {
        scalar_string(self.value.as_ref()?)
    }

    /// The value as a bucket key segment. Falsy values (`false`, `0`, `""`)
    /// and non-scalars have none and address the uncategorized bucket.
    pub fn key_value(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => scalar_string(other).filter(|v| !v.is_empty()),
        }
    }
}

/// One entry of `collection_groups`, `board_columns` or `board_groups2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub property: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub hidden: bool,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<GroupValue>,
}

impl GroupConfig {
    /// The literal value of this group as a string, if any.
    pub fn literal_value(&self) -> Option<String> {
        self.value.as_ref()?.display_value()
    }

    /// The bucket key segment of this group, if any. See
    /// [`GroupValue::key_value`].
    pub fn key_value(&self) -> Option<String> {
        self.value.as_ref()?.key_value()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardColumnsBy {
    #[serde(
        rename = "groupBy",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_by: Option<String>,
}

/// View display configuration. Which fields are meaningful depends on the
/// view type; all are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewFormat {
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub collection_group_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub collection_groups: Option<Vec<GroupConfig>>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub board_columns: Option<Vec<GroupConfig>>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub board_groups2: Option<Vec<GroupConfig>>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub board_columns_by: Option<BoardColumnsBy>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub gallery_cover: Option<CardCover>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub board_cover: Option<CardCover>,
}

/// A saved view over a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionView {
    pub id: String,
    /// Layout tag; unknown or missing tags read as absent.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_type: Option<ViewType>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub format: Option<ViewFormat>,
}

impl CollectionView {
    pub fn new(id: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            id: id.into(),
            view_type: Some(view_type),
            name: None,
            format: None,
        }
    }

    pub fn with_format(mut self, format: ViewFormat) -> Self {
        self.format = Some(format);
        self
    }
}

// =============================================================================
// QUERY RESULTS
// =============================================================================

/// Pre-grouped member list returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupResults {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_type: Option<String>,
    #[serde(
        rename = "blockIds",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_ids: Option<Vec<String>>,
    #[serde(
        rename = "hasMore",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_more: Option<bool>,
}

/// One group bucket announced by the store, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub aggregation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

impl AggregationResult {
    /// The group's value rendered as a string, empty when absent.
    ///
    /// Only scalars are rendered; integral numbers print without a
    /// fractional part. No other normalization is applied.
    pub fn display_value(&self) -> String {
        self.value
            .as_ref()
            .and_then(scalar_string)
            .unwrap_or_default()
    }
}

/// Render a scalar JSON value as a string. Integral numbers print without a
/// fractional part; null, arrays and objects have no rendering.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        }),
        _ => None,
    }
}

/// Aggregate payload of one board column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardColumnResult {
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub value: Option<BoardColumnResultValue>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Label of a board column: a plain string, or an object keyed by the
/// group-by property id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardColumnResultValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Per-column aggregates, index-aligned with the view's column definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardColumnsResult {
    #[serde(default, deserialize_with = "lenient::aligned_vec")]
    pub results: Vec<Option<BoardColumnResult>>,
}

/// Result of querying one collection through one view.
///
/// Besides the named fields, the payload carries buckets under synthetic
/// keys `results:<valueType>:<value>`, each `{ "blockIds": [...] }`. Those
/// land in [`CollectionQueryResult::buckets`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionQueryResult {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_type: Option<String>,
    #[serde(
        rename = "blockIds",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub collection_group_results: Option<GroupResults>,
    #[serde(
        rename = "aggregationResults",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub aggregation_results: Option<Vec<AggregationResult>>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub board_columns: Option<BoardColumnsResult>,
    #[serde(flatten)]
    pub buckets: HashMap<String, Value>,
}

impl CollectionQueryResult {
    /// Member ids stored under a synthetic bucket key.
    ///
    /// `None` when the key is absent or its `blockIds` is not a list.
    /// Keys are compared byte for byte.
    pub fn bucket(&self, key: &str) -> Option<Vec<String>> {
        let ids = self.buckets.get(key)?.get("blockIds")?.as_array()?;
        Some(
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// Ids of `collection_group_results`, when present.
    pub fn group_result_ids(&self) -> Option<&[String]> {
        self.collection_group_results
            .as_ref()?
            .block_ids
            .as_deref()
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Highlighted snippet of a search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHighlight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One page matched by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub is_navigable: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<SearchHighlight>,
}

/// Search response: ranked hits plus the records needed to render them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub record_map: RecordMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_type_round_trips_unknown_tags() {
        let block_type: BlockType = serde_json::from_value(json!("callout")).unwrap();
        assert_eq!(block_type, BlockType::Other("callout".to_string()));
        assert_eq!(serde_json::to_value(&block_type).unwrap(), json!("callout"));
    }

    #[test]
    fn test_block_type_known_tags() {
        let block_type: BlockType = serde_json::from_value(json!("sub_sub_header")).unwrap();
        assert_eq!(block_type, BlockType::SubSubHeader);
        assert!(BlockType::ColumnList.is_pass_through());
        assert!(!BlockType::Page.is_pass_through());
        assert!(BlockType::CollectionViewPage.is_collection_view());
    }

    #[test]
    fn test_record_entry_accepts_double_wrapped_values() {
        let entry: RecordEntry<Block> = serde_json::from_value(json!({
            "spaceId": "s1",
            "value": { "role": "reader", "value": { "id": "b1", "type": "text" } }
        }))
        .unwrap();
        assert_eq!(entry.role.as_deref(), Some("reader"));
        assert_eq!(entry.value.unwrap().id, "b1");
    }

    #[test]
    fn test_record_entry_with_malformed_value_is_absent() {
        let entry: RecordEntry<Block> =
            serde_json::from_value(json!({ "role": "reader", "value": { "id": 3 } })).unwrap();
        assert!(entry.value.is_none());

        let entry: RecordEntry<Block> = serde_json::from_value(json!("garbage")).unwrap();
        assert!(entry.value.is_none());
    }

    #[test]
    fn test_query_result_collects_synthetic_buckets() {
        let result: CollectionQueryResult = serde_json::from_value(json!({
            "type": "results",
            "blockIds": ["a", "b"],
            "results:select:Done": { "blockIds": ["a"] },
            "results:select:Todo": { "blockIds": "oops" }
        }))
        .unwrap();

        assert_eq!(result.block_ids.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(result.bucket("results:select:Done"), Some(vec!["a".to_string()]));
        assert_eq!(result.bucket("results:select:Todo"), None);
        assert_eq!(result.bucket("results:select:done"), None);
    }

    #[test]
    fn test_unknown_view_type_reads_as_absent() {
        let view: CollectionView =
            serde_json::from_value(json!({ "id": "v1", "type": "timeline", "format": 7 })).unwrap();
        assert!(view.view_type.is_none());
        assert!(view.format.is_none());
    }

    #[test]
    fn test_view_format_ignores_card_layout_fields() {
        let view: CollectionView = serde_json::from_value(json!({
            "id": "v1",
            "type": "gallery",
            "format": {
                "gallery_cover": { "type": "page_cover" },
                "gallery_cover_size": "large",
                "gallery_cover_aspect": "contain",
                "gallery_properties": [{ "property": "title", "visible": true }]
            }
        }))
        .unwrap();

        let format = view.format.unwrap();
        assert_eq!(
            format.gallery_cover.map(|c| c.cover_type),
            Some(CoverType::PageCover)
        );
        assert_eq!(format.board_cover, None);
    }

    #[test]
    fn test_aggregation_display_value() {
        let agg = |value: Value| AggregationResult {
            value: Some(value),
            ..Default::default()
        };
        assert_eq!(agg(json!("x")).display_value(), "x");
        assert_eq!(agg(json!(3)).display_value(), "3");
        assert_eq!(agg(json!(3.0)).display_value(), "3");
        assert_eq!(agg(json!(1.5)).display_value(), "1.5");
        assert_eq!(agg(json!(false)).display_value(), "false");
        assert_eq!(agg(json!(null)).display_value(), "");
        assert_eq!(AggregationResult::default().display_value(), "");
    }

    #[test]
    fn test_group_value_key_treats_falsy_values_as_uncategorized() {
        let group = |value: Value| GroupValue {
            value_type: Some("checkbox".to_string()),
            value: Some(value),
        };
        assert_eq!(group(json!(true)).key_value().as_deref(), Some("true"));
        assert_eq!(group(json!(2)).key_value().as_deref(), Some("2"));
        assert_eq!(group(json!("Done")).key_value().as_deref(), Some("Done"));
        assert_eq!(group(json!(false)).key_value(), None);
        assert_eq!(group(json!(0)).key_value(), None);
        assert_eq!(group(json!("")).key_value(), None);
        assert_eq!(group(json!(["x"])).key_value(), None);

        assert_eq!(group(json!(false)).display_value().as_deref(), Some("false"));
        assert_eq!(group(json!(null)).display_value(), None);
    }

    #[test]
    fn test_collection_schema_drops_malformed_properties() {
        let collection: Collection = serde_json::from_value(json!({
            "id": "c1",
            "name": [["Tasks"]],
            "schema": {
                "title": { "name": "Name", "type": "title" },
                "abc1": { "name": "Status", "type": "select" },
                "zzz9": { "name": "Broken" }
            }
        }))
        .unwrap();
        assert_eq!(collection.schema.len(), 2);
        assert_eq!(collection.schema["abc1"].property_type, PropertyType::Select);
    }
}
