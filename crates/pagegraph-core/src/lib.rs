//! # pagegraph-core
//!
//! Record map model and derivation engine for pagegraph.
//!
//! This crate turns a denormalized record map snapshot (blocks, collections,
//! collection views and query results) into the structures a page renderer
//! needs: collection member lists, groups and board columns, the table of
//! contents, and the scroll-spy active heading. Derivations are pure and
//! fail soft; only parsing and I/O at the edges return errors.

pub mod collection;
pub mod config;
pub mod defaults;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod page;
pub mod record_map;
pub mod scroll_spy;
pub mod text;
pub mod toc;
pub mod traits;

// Re-export commonly used types at crate root
pub use collection::{
    BoardColumn, CardCoverInfo, CollectionData, CollectionGroup, MemberSource,
};
pub use config::RenderConfig;
pub use error::{Error, Result};
pub use ids::{map_page_url, parse_page_id, uuid_to_id};
pub use models::*;
pub use page::{CollectionViewData, PageView};
pub use scroll_spy::{active_section, HeadingAnchor, Rect, ScrollSpy, Throttle, ThrottleDecision};
pub use text::{block_title, text_content};
pub use toc::{HeadingType, TableOfContents, TocEntry};
pub use traits::*;
