//! Structured logging field name constants for pagegraph.
//!
//! Fields filled in after a span opens (`Span::record`) and the CLI's JSON
//! error output use these names. Fields given inline to the `tracing` macros
//! are literals with the same spelling: `subsystem`, `component`, `op`,
//! `page_id`, `collection_id`, `view_id`, `bucket_key`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Unusable configuration, command failures |
//! | WARN  | Fetch failures, collection queries skipped |
//! | INFO  | Lifecycle events (client init, page resolved) |
//! | DEBUG | Decision points (fallback tier chosen, group counts) |
//! | TRACE | Per-item iteration (buckets, headings, anchors) |

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a derivation or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of blocks in a fetched record map.
pub const BLOCK_COUNT: &str = "block_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// HTTP-style status code of a failure.
pub const STATUS_CODE: &str = "status_code";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
