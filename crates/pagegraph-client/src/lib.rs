//! # pagegraph-client
//!
//! Document store access for pagegraph.
//!
//! This crate provides:
//! - An HTTP [`DocumentStore`](pagegraph_core::DocumentStore) backend that
//!   loads a page chunk and its collection query results
//! - Page resolution from raw URL ids (slugs, dashed or compact ids,
//!   friendly path overrides) with 404/400/500 style outcomes
//! - Site search scoped to the root page
//! - An in-memory store for local record maps and tests
//!
//! The `pagegraph` binary wires these together into a command line tool.

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod resolve;
pub mod search;

pub use client::HttpDocumentStore;
pub use config::ClientConfig;
pub use error::PageError;
pub use memory::MemoryDocumentStore;
pub use resolve::{PageResolver, ResolvedPage};
pub use search::SearchService;
