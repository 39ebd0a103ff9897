//! Shared constants for the board, its stores, and the host.

// ── Brush ───────────────────────────────────────────────────────

/// Brush color before the visitor picks one.
pub const DEFAULT_COLOR: &str = "#000000";

/// Brush width in CSS pixels before the visitor picks one.
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Narrowest accepted brush, in CSS pixels.
pub const MIN_STROKE_WIDTH: f64 = 1.0;

/// Widest accepted brush, in CSS pixels.
pub const MAX_STROKE_WIDTH: f64 = 50.0;

// ── Replication ─────────────────────────────────────────────────

/// Pause between back-to-back flushes when the buffer refilled mid-write.
pub const DEFAULT_FLUSH_DELAY_MS: u64 = 50;

/// Message shown to the visitor when the remote clear fails.
pub const CLEAR_FAILED_MESSAGE: &str = "Could not clear the board. Please try again.";

// ── Stores ──────────────────────────────────────────────────────

/// Postgres `NOTIFY` channel carrying change events.
pub const CHANGE_CHANNEL: &str = "canvas_changes";

/// Buffered change events per subscription before the forwarder waits.
pub const SUBSCRIPTION_CAPACITY: usize = 256;

/// Rows per `INSERT` statement; keeps bind parameters under the Postgres limit.
pub const INSERT_CHUNK_ROWS: usize = 1000;

/// First pause before reopening a dropped host change feed.
pub const FEED_RECONNECT_INITIAL_MS: u64 = 1000;

/// Longest pause between attempts to reopen a host change feed.
pub const FEED_RECONNECT_MAX_MS: u64 = 10_000;
