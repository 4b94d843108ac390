//! Card cover images for gallery and board views.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::defaults::{COVER_POSITION, COVER_POSITION_PERCENT, STORE_ORIGIN, UNSPLASH_ORIGIN};
use crate::models::{
    Block, BlockType, CardCover, Collection, CollectionView, CoverType, PropertyType, RecordMap,
    ViewType,
};

/// Maps a raw image reference to a displayable URL.
pub type MapImageUrl<'a> = &'a dyn Fn(&str, &Block) -> String;

/// Resolved cover of one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardCoverInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Vertical object position in percent.
    pub position: f64,
}

impl CardCoverInfo {
    pub fn resolve(
        block: &Block,
        collection: Option<&Collection>,
        cover: &CardCover,
        record_map: &RecordMap,
        map_image_url: MapImageUrl<'_>,
    ) -> Self {
        Self {
            url: cover_url(block, collection, cover, record_map, map_image_url),
            position: cover_position(block),
        }
    }

    pub fn has_cover(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Cover configuration of a gallery or board view.
pub fn view_card_cover(view: &CollectionView) -> Option<&CardCover> {
    let format = view.format.as_ref()?;
    match view.view_type {
        Some(ViewType::Gallery) => format.gallery_cover.as_ref(),
        Some(ViewType::Board) => format.board_cover.as_ref(),
        _ => None,
    }
}

/// Image reference to displayable URL.
///
/// Inline `data:` images, Unsplash images and already-signed attachment URLs
/// pass through. Anything else goes through the store's image proxy, tagged
/// with the owning block so the store can authorize the request.
pub fn default_map_image_url(url: &str, block: &Block) -> String {
    if url.is_empty()
        || url.starts_with("data:")
        || url.starts_with(UNSPLASH_ORIGIN)
        || is_signed_attachment(url)
    {
        return url.to_string();
    }

    let absolute = if url.starts_with("/images") {
        format!("{STORE_ORIGIN}{url}")
    } else {
        url.to_string()
    };
    let proxied = if absolute.starts_with("/image") {
        format!("{STORE_ORIGIN}{absolute}")
    } else {
        format!("{STORE_ORIGIN}/image/{}", urlencoding::encode(&absolute))
    };

    let Ok(mut proxied_url) = Url::parse(&proxied) else {
        trace!(url = %proxied, "Unparseable image proxy URL, passed through");
        return proxied;
    };

    let table = match block.parent_table.as_deref() {
        Some("space" | "collection" | "team") | None => "block",
        Some(table) => table,
    };
    let kept: Vec<(String, String)> = proxied_url
        .query_pairs()
        .filter(|(key, _)| !matches!(key.as_ref(), "table" | "id" | "cache"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    proxied_url
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("table", table)
        .append_pair("id", &block.id)
        .append_pair("cache", "v2");
    proxied_url.to_string()
}

/// Presigned S3 attachment URLs are already authorized.
fn is_signed_attachment(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let on_s3 = parsed
        .host_str()
        .is_some_and(|host| host.ends_with(".amazonaws.com"))
        && parsed.path().starts_with("/secure.notion-static.com");
    on_s3
        && ["X-Amz-Credential", "X-Amz-Signature", "X-Amz-Algorithm"]
            .iter()
            .all(|key| parsed.query_pairs().any(|(k, _)| k == *key))
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.is_empty())
}

fn first_image_source<'a>(block: &Block, record_map: &'a RecordMap) -> Option<(&'a str, &'a Block)> {
    block
        .content
        .iter()
        .filter_map(|id| record_map.block_by_id(id))
        .filter(|child| child.block_type == BlockType::Image)
        .find_map(|image| {
            let source = image
                .property("source")
                .and_then(|s| s.get(0))
                .and_then(|s| s.get(0));
            non_empty(source)
                .or_else(|| non_empty(image.format_value("display_source")))
                .map(|source| (source, image))
        })
}

fn flatten_once(values: Vec<Value>) -> Vec<Value> {
    values
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect()
}

/// URL of the first attachment of a `file` property. Values look like
/// `[["name.png", [["a", "https://..."]]]]`.
fn file_property_url(
    block: &Block,
    collection: &Collection,
    property: &str,
) -> Option<String> {
    let schema = collection.schema.get(property)?;
    if schema.property_type != PropertyType::File {
        return None;
    }

    let entry = block
        .property(property)?
        .as_array()?
        .iter()
        .filter_map(Value::as_array)
        .find(|entry| entry.len() == 2)?;

    let flat = flatten_once(flatten_once(entry.clone()));
    non_empty(flat.get(2)).map(str::to_string)
}

/// Cover URL of a card, or `None` when the card has no cover.
pub fn cover_url(
    block: &Block,
    collection: Option<&Collection>,
    cover: &CardCover,
    record_map: &RecordMap,
    map_image_url: MapImageUrl<'_>,
) -> Option<String> {
    match cover.cover_type {
        CoverType::PageCover => {
            non_empty(block.format_value("page_cover")).map(|url| map_image_url(url, block))
        }
        CoverType::PageContent => first_image_source(block, record_map)
            .map(|(source, image)| map_image_url(source, image)),
        CoverType::Property | CoverType::File => {
            let property = cover.property.as_deref().filter(|p| !p.is_empty())?;
            file_property_url(block, collection?, property).map(|url| map_image_url(&url, block))
        }
        CoverType::Empty => None,
    }
}

/// Vertical cover position in percent, inverted for CSS `object-position`.
///
/// `card_cover_position` wins over `page_cover_position`; both are in
/// `0.0..=1.0`.
pub fn cover_position(block: &Block) -> f64 {
    if block.format.is_none() {
        return COVER_POSITION_PERCENT;
    }
    let position = block
        .format_f64("card_cover_position")
        .or_else(|| block.format_f64("page_cover_position"))
        .unwrap_or(COVER_POSITION);
    (1.0 - position) * 100.0
}
