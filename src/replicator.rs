//! StrokeReplicator — batch local segments out, apply remote changes in.
//!
//! DESIGN
//! ======
//! Locally drawn segments land in a pending buffer. The first enqueue while
//! Idle switches to Flushing and spawns the single flush task; later enqueues
//! only append. The flush task swaps the whole buffer out, writes it with one
//! `insert_batch`, and repeats after a short delay while the buffer keeps
//! refilling. When it finds the buffer empty it goes back to Idle and exits.
//!
//! The buffer and the flush state share one mutex, so swapping the buffer
//! out and deciding whether a flush is running happen as one step. The lock
//! is never held across an `.await`.
//!
//! The flush task is spawned on the runtime handle given to `new`, so
//! pointer input may arrive on any thread.
//!
//! ERROR HANDLING
//! ==============
//! A failed batch is logged and dropped; there is no retry. A failed load is
//! logged and leaves the surface as it is. A failed clear is the one error a
//! visitor sees, through the [`Notifier`].

#[cfg(test)]
#[path = "replicator_test.rs"]
mod replicator_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::consts::CLEAR_FAILED_MESSAGE;
use crate::notify::Notifier;
use crate::raster::Raster;
use crate::segment::Segment;
use crate::store::{RemoteStore, StoreError, StoreEvent};
use crate::surface::DrawSurface;

/// The surface as shared between pointer input and the replicator.
pub type SharedSurface<R> = Arc<Mutex<DrawSurface<R>>>;

/// Lock the surface. A poisoned lock is recovered; the surface holds no
/// invariants a panicking draw call could break.
pub(crate) fn lock<R: Raster>(surface: &SharedSurface<R>) -> MutexGuard<'_, DrawSurface<R>> {
    surface.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// FLUSH STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    /// No flush task exists.
    Idle,
    /// Exactly one flush task is writing or waiting to write.
    Flushing,
}

struct PendingBuffer {
    segments: Vec<Segment>,
    state: FlushState,
}

// =============================================================================
// REPLICATOR
// =============================================================================

pub struct StrokeReplicator<R: Raster> {
    store: Arc<dyn RemoteStore>,
    surface: SharedSurface<R>,
    notifier: Arc<dyn Notifier>,
    flush_delay: Duration,
    runtime: Handle,
    pending: Arc<Mutex<PendingBuffer>>,
    state_tx: Arc<watch::Sender<FlushState>>,
}

impl<R: Raster> Clone for StrokeReplicator<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            surface: Arc::clone(&self.surface),
            notifier: Arc::clone(&self.notifier),
            flush_delay: self.flush_delay,
            runtime: self.runtime.clone(),
            pending: Arc::clone(&self.pending),
            state_tx: Arc::clone(&self.state_tx),
        }
    }
}

impl<R: Raster + 'static> StrokeReplicator<R> {
    #[must_use]
    pub fn new(
        store: Arc<dyn RemoteStore>,
        surface: SharedSurface<R>,
        notifier: Arc<dyn Notifier>,
        flush_delay: Duration,
        runtime: Handle,
    ) -> Self {
        let (state_tx, _) = watch::channel(FlushState::Idle);
        Self {
            store,
            surface,
            notifier,
            flush_delay,
            runtime,
            pending: Arc::new(Mutex::new(PendingBuffer { segments: Vec::new(), state: FlushState::Idle })),
            state_tx: Arc::new(state_tx),
        }
    }

    #[must_use]
    pub fn state(&self) -> FlushState {
        *self.state_tx.borrow()
    }

    /// Runtime that flush and board tasks are spawned on.
    #[must_use]
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Segments waiting for the next write.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock_pending().segments.len()
    }

    // --- Outbound ---

    /// Queue a locally drawn segment. Starts a flush if none is running.
    pub fn enqueue(&self, segment: Segment) {
        let start_flush = {
            let mut pending = self.lock_pending();
            pending.segments.push(segment);
            if pending.state == FlushState::Idle {
                self.set_state(&mut pending, FlushState::Flushing);
                true
            } else {
                false
            }
        };

        if start_flush {
            let this = self.clone();
            self.runtime.spawn(async move { this.flush().await });
        }
    }

    async fn flush(self) {
        loop {
            let batch = std::mem::take(&mut self.lock_pending().segments);

            if !batch.is_empty() {
                match self.store.insert_batch(&batch).await {
                    Ok(()) => debug!(count = batch.len(), "flushed segments"),
                    Err(e) => error!(error = %e, count = batch.len(), "segment batch dropped"),
                }
            }

            {
                let mut pending = self.lock_pending();
                if pending.segments.is_empty() {
                    self.set_state(&mut pending, FlushState::Idle);
                    return;
                }
            }

            tokio::time::sleep(self.flush_delay).await;
        }
    }

    /// Resolve once no flush is running.
    pub async fn wait_idle(&self) {
        let mut rx = self.state_tx.subscribe();
        if let Err(e) = rx.wait_for(|state| *state == FlushState::Idle).await {
            debug!(error = %e, "flush state channel closed");
        }
    }

    // --- Inbound ---

    /// Render every stored segment, oldest first. Returns how many were drawn.
    pub async fn load_all(&self) -> usize {
        let rows = match self.store.query_all_ordered_by_creation().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "failed to load segments");
                return 0;
            }
        };

        let mut surface = lock(&self.surface);
        for row in &rows {
            surface.render_segment(row);
        }
        info!(count = rows.len(), "replayed segments");
        rows.len()
    }

    /// Render a segment reported by the change feed. Echoes of our own
    /// segments are drawn again.
    pub fn on_remote_insert(&self, segment: &Segment) {
        lock(&self.surface).render_segment(segment);
    }

    /// Any delete means: clear and reload from the store.
    pub async fn on_remote_delete_any(&self) {
        lock(&self.surface).clear();
        self.load_all().await;
    }

    pub async fn apply(&self, event: StoreEvent) {
        match event {
            StoreEvent::Insert { record } => self.on_remote_insert(&record),
            StoreEvent::Delete => self.on_remote_delete_any().await,
        }
    }

    /// Delete every stored segment and clear the surface.
    ///
    /// # Errors
    ///
    /// Returns the store error after notifying the visitor. The surface is
    /// left untouched.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        match self.store.delete_all().await {
            Ok(()) => {
                lock(&self.surface).clear();
                info!("board cleared");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to clear board");
                self.notifier.notify_error(CLEAR_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    // --- Internals ---

    fn lock_pending(&self) -> MutexGuard<'_, PendingBuffer> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Update the state and publish it while the buffer lock is held, so
    /// watchers never see a stale value.
    fn set_state(&self, pending: &mut PendingBuffer, state: FlushState) {
        pending.state = state;
        self.state_tx.send_replace(state);
    }
}
