//! Client for a remote board host.
//!
//! Rows go over the REST resource at `/api/strokes`; the change feed is the
//! WebSocket at `/api/strokes/live`, which carries [`StoreEvent`] JSON as
//! text messages.
//!
//! RECONNECT
//! =========
//! Only the first feed connection is made inside `subscribe`, so a host that
//! is down surfaces as an error. After that, a dropped connection is retried
//! with exponential backoff until the [`Subscription`] is dropped. Each
//! reopened connection is announced with [`StoreEvent::Delete`], because
//! inserts made while disconnected were never relayed.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::{RemoteStore, StoreError, StoreEvent, Subscription};
use crate::consts::{FEED_RECONNECT_INITIAL_MS, FEED_RECONNECT_MAX_MS, SUBSCRIPTION_CAPACITY};
use crate::segment::Segment;

type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    strokes_url: String,
    live_url: String,
    reconnect_initial: Duration,
    reconnect_max: Duration,
}

impl HttpStore {
    /// Point at a board host, e.g. `http://localhost:3000`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] unless the URL is `http://` or
    /// `https://`.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client: reqwest::Client::new(),
            strokes_url: format!("{base}/api/strokes"),
            live_url: live_url(base)?,
            reconnect_initial: Duration::from_millis(FEED_RECONNECT_INITIAL_MS),
            reconnect_max: Duration::from_millis(FEED_RECONNECT_MAX_MS),
        })
    }

    /// Override the feed reconnect backoff. The pause starts at `initial`
    /// and doubles per failed attempt up to `max`.
    #[must_use]
    pub fn with_reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial = initial;
        self.reconnect_max = max.max(initial);
        self
    }

    #[must_use]
    pub fn strokes_url(&self) -> &str {
        &self.strokes_url
    }

    #[must_use]
    pub fn live_url(&self) -> &str {
        &self.live_url
    }
}

fn live_url(base: &str) -> Result<String, StoreError> {
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/strokes/live"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/strokes/live"));
    }
    Err(StoreError::InvalidUrl(base.to_owned()))
}

fn check_status(response: &reqwest::Response) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() { Ok(()) } else { Err(StoreError::Status(status.as_u16())) }
}

#[async_trait::async_trait]
impl RemoteStore for HttpStore {
    async fn insert_batch(&self, rows: &[Segment]) -> Result<(), StoreError> {
        let response = self.client.post(&self.strokes_url).json(rows).send().await?;
        check_status(&response)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let response = self.client.delete(&self.strokes_url).send().await?;
        check_status(&response)
    }

    async fn query_all_ordered_by_creation(&self) -> Result<Vec<Segment>, StoreError> {
        let response = self.client.get(&self.strokes_url).send().await?;
        check_status(&response)?;
        Ok(response.json::<Vec<Segment>>().await?)
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let (stream, _) = connect_async(self.live_url.as_str()).await?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let feed = Feed {
            url: self.live_url.clone(),
            tx,
            initial: self.reconnect_initial,
            max: self.reconnect_max,
        };

        let forwarder = tokio::spawn(feed.run(stream));
        Ok(Subscription::new(rx, Some(forwarder)))
    }
}

// =============================================================================
// FEED
// =============================================================================

/// How one feed connection ended.
enum FeedEnd {
    /// The subscriber is gone; stop for good.
    Unsubscribed,
    /// The host side closed or failed after relaying `relayed` events.
    Disconnected { relayed: usize },
}

struct Feed {
    url: String,
    tx: mpsc::Sender<StoreEvent>,
    initial: Duration,
    max: Duration,
}

impl Feed {
    async fn run(self, mut stream: FeedStream) {
        let mut backoff = self.initial;

        loop {
            match self.relay(&mut stream).await {
                FeedEnd::Unsubscribed => break,
                FeedEnd::Disconnected { relayed } => {
                    // A connection that carried events was healthy; start over.
                    if relayed > 0 {
                        backoff = self.initial;
                    }
                }
            }

            let Some(reopened) = self.reconnect(&mut backoff).await else {
                break;
            };
            stream = reopened;

            // EDGE: inserts made while disconnected were not relayed; a delete makes the subscriber reload.
            if self.tx.send(StoreEvent::Delete).await.is_err() {
                break;
            }
        }

        debug!("http store: feed ended");
    }

    async fn relay(&self, stream: &mut FeedStream) -> FeedEnd {
        let mut relayed = 0;

        while let Some(msg) = stream.next().await {
            let event = match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<StoreEvent>(text.as_str()) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, "http store: undecodable feed message");
                        continue;
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "http store: feed connection failed");
                    break;
                }
            };
            if self.tx.send(event).await.is_err() {
                return FeedEnd::Unsubscribed;
            }
            relayed += 1;
        }

        FeedEnd::Disconnected { relayed }
    }

    /// Reopen the feed, sleeping `backoff` before each attempt. Returns
    /// `None` once the subscriber is gone.
    async fn reconnect(&self, backoff: &mut Duration) -> Option<FeedStream> {
        loop {
            debug!(retry_ms = backoff.as_millis(), "http store: reopening feed");
            tokio::select! {
                () = self.tx.closed() => return None,
                () = tokio::time::sleep(*backoff) => {}
            }
            *backoff = backoff.saturating_mul(2).min(self.max);

            match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    info!(url = %self.url, "http store: feed reconnected");
                    return Some(stream);
                }
                Err(e) => warn!(error = %e, "http store: feed reconnect failed"),
            }
        }
    }
}
