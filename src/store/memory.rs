//! In-process store with a broadcast change feed.
//!
//! Besides backing single-process runs, this store is the test double for
//! everything above the [`RemoteStore`] seam. Test builds add hooks so it
//! can fail on request, hold inserts in flight, and record each batch.
//! None of that is compiled into the production insert path.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use super::{RemoteStore, StoreError, StoreEvent, Subscription};
use crate::consts::SUBSCRIPTION_CAPACITY;
use crate::segment::Segment;

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

#[derive(Default)]
struct Rows {
    rows: Vec<Segment>,
    next_id: i64,
    last_created_at: i64,
}

pub struct MemoryStore {
    rows: Mutex<Rows>,
    events: broadcast::Sender<StoreEvent>,
    #[cfg(test)]
    hooks: TestHooks,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(SUBSCRIPTION_CAPACITY);
        Self {
            rows: Mutex::new(Rows { next_id: 1, ..Rows::default() }),
            events,
            #[cfg(test)]
            hooks: TestHooks::default(),
        }
    }

    /// Snapshot of stored rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> Vec<Segment> {
        self.lock_rows().rows.clone()
    }

    fn lock_rows(&self) -> MutexGuard<'_, Rows> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: StoreEvent) {
        if self.events.send(event).is_err() {
            debug!("memory store: change event with no subscribers");
        }
    }
}

// =============================================================================
// TEST HOOKS
// =============================================================================

#[cfg(test)]
#[derive(Default)]
struct TestHooks {
    insert_gate: tokio::sync::RwLock<()>,
    insert_attempts: std::sync::atomic::AtomicUsize,
    fail_insert: std::sync::atomic::AtomicBool,
    fail_delete: std::sync::atomic::AtomicBool,
    fail_query: std::sync::atomic::AtomicBool,
    /// Every successful batch since the last `delete_all`, in write order.
    batches: Mutex<Vec<Vec<Segment>>>,
}

#[cfg(test)]
impl TestHooks {
    /// Count the attempt, wait out any hold, then fire a pending failure.
    async fn before_insert(&self) -> Result<tokio::sync::RwLockReadGuard<'_, ()>, StoreError> {
        self.insert_attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let gate = self.insert_gate.read().await;
        check(&self.fail_insert, "insert")?;
        Ok(gate)
    }

    fn lock_batches(&self) -> MutexGuard<'_, Vec<Vec<Segment>>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
fn check(flag: &std::sync::atomic::AtomicBool, op: &'static str) -> Result<(), StoreError> {
    if flag.swap(false, std::sync::atomic::Ordering::SeqCst) { Err(StoreError::Injected(op)) } else { Ok(()) }
}

#[cfg(test)]
impl MemoryStore {
    /// Every batch written since the last `delete_all`, in order.
    pub(crate) fn batches(&self) -> Vec<Vec<Segment>> {
        self.hooks.lock_batches().clone()
    }

    /// Number of `insert_batch` calls started, including failed and held ones.
    pub(crate) fn insert_attempts(&self) -> usize {
        self.hooks.insert_attempts.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Make the next `insert_batch` fail.
    pub(crate) fn fail_next_insert(&self) {
        self.hooks.fail_insert.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Make the next `delete_all` fail.
    pub(crate) fn fail_next_delete(&self) {
        self.hooks.fail_delete.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Make the next ordered query fail.
    pub(crate) fn fail_next_query(&self) {
        self.hooks.fail_query.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// Park every `insert_batch` until the returned guard is dropped.
    pub(crate) async fn hold_inserts(&self) -> tokio::sync::RwLockWriteGuard<'_, ()> {
        self.hooks.insert_gate.write().await
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[async_trait::async_trait]
impl RemoteStore for MemoryStore {
    async fn insert_batch(&self, rows: &[Segment]) -> Result<(), StoreError> {
        #[cfg(test)]
        let _gate = self.hooks.before_insert().await?;

        let inserted = {
            let mut state = self.lock_rows();
            let mut inserted = Vec::with_capacity(rows.len());
            for row in rows {
                // Strictly increasing, so ordering by created_at is total.
                let created_at = now_ms().max(state.last_created_at + 1);
                state.last_created_at = created_at;
                let id = state.next_id;
                state.next_id += 1;

                let mut segment = row.clone();
                segment.id = Some(id);
                segment.created_at = Some(created_at);
                inserted.push(segment);
            }
            state.rows.extend(inserted.iter().cloned());
            inserted
        };

        #[cfg(test)]
        self.hooks.lock_batches().push(inserted.clone());

        for record in inserted {
            self.publish(StoreEvent::Insert { record });
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        #[cfg(test)]
        check(&self.hooks.fail_delete, "delete")?;

        self.lock_rows().rows.clear();
        #[cfg(test)]
        self.hooks.lock_batches().clear();
        self.publish(StoreEvent::Delete);
        Ok(())
    }

    async fn query_all_ordered_by_creation(&self) -> Result<Vec<Segment>, StoreError> {
        #[cfg(test)]
        check(&self.hooks.fail_query, "query")?;

        let mut rows = self.rows();
        rows.sort_by_key(|row| (row.created_at, row.id));
        Ok(rows)
    }

    async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let mut events = self.events.subscribe();
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);

        let forwarder = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // EDGE: events were dropped; a delete makes the subscriber reload.
                        warn!(missed, "memory store: subscriber lagged; requesting resync");
                        StoreEvent::Delete
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(Subscription::new(rx, Some(forwarder)))
    }
}
