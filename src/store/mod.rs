//! RemoteStore — where segments are persisted and fanned out.
//!
//! ARCHITECTURE
//! ============
//! The board never talks to a database directly. It needs four things from
//! its backend: a batched insert, a delete-everything, an ordered read of all
//! rows, and a push feed of row changes. [`RemoteStore`] names exactly those.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | tests and single-process runs |
//! | [`PgStore`] | the board host; rows in Postgres, feed via `LISTEN/NOTIFY` |
//! | [`HttpStore`] | clients of the board host over REST + WebSocket |
//!
//! DELIVERY
//! ========
//! The change feed is at-least-once and only ordered per originating client.
//! Every subscriber, including the writer, sees its own inserts echoed back.
//! A feed that may have missed events reports [`StoreEvent::Delete`], which
//! makes subscribers clear and reload from the ordered query.

mod http;
mod memory;
mod postgres;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::segment::{Segment, SegmentError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("store responded with status {0}")]
    Status(u16),
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error("invalid segment: {0}")]
    InvalidSegment(#[from] SegmentError),
    #[error("injected failure: {0}")]
    Injected(&'static str),
}

impl From<tokio_tungstenite::tungstenite::Error> for StoreError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// One change reported by the store's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A row was inserted, by any client.
    Insert { record: Segment },
    /// Rows were deleted, or the feed may have dropped events.
    Delete,
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Receiving end of a change feed. Dropping it stops the feed's forwarder.
pub struct Subscription {
    rx: mpsc::Receiver<StoreEvent>,
    forwarder: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a channel fed by `forwarder`. The task is aborted on drop.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<StoreEvent>, forwarder: Option<JoinHandle<()>>) -> Self {
        Self { rx, forwarder }
    }

    /// Next event, or `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// Persist `rows` as one write. Store-assigned fields on the input are
    /// ignored.
    async fn insert_batch(&self, rows: &[Segment]) -> Result<(), StoreError>;

    /// Remove every row.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Every row, oldest `created_at` first.
    async fn query_all_ordered_by_creation(&self) -> Result<Vec<Segment>, StoreError>;

    /// Open a change feed. Events produced after this returns are delivered.
    async fn subscribe(&self) -> Result<Subscription, StoreError>;
}
