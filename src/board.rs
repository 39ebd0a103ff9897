//! Board — one drawing surface wired to one replicator and the change feed.
//!
//! LIFECYCLE
//! =========
//! 1. `new` builds the surface with the configured brush.
//! 2. `mount` sizes the surface, opens the change feed, replays the store,
//!    and spawns the pump that applies feed events.
//! 3. Pointer input draws synchronously and queues segments for the flush.
//! 4. Dropping the [`MountHandle`] stops the pump. Queued segments are not
//!    flushed on teardown; an in-flight flush runs to completion.
//!
//! A board has at most one pump. Mounting again while a handle is alive is
//! refused with [`MountError::AlreadyMounted`]; drop the handle first.
//!
//! Every task the board starts runs on the runtime handle given to `new`,
//! so the synchronous methods may be called from any thread.
//!
//! The feed is opened before the replay so no insert falls between the two.
//! A segment that lands in both is drawn twice, which is invisible.

#[cfg(test)]
#[path = "board_test.rs"]
mod board_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::brush::BrushError;
use crate::config::BoardConfig;
use crate::geometry::Viewport;
use crate::input::PointerInput;
use crate::notify::Notifier;
use crate::raster::Raster;
use crate::replicator::{SharedSurface, StrokeReplicator, lock};
use crate::store::{RemoteStore, StoreError};
use crate::surface::DrawSurface;

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("board is already mounted")]
    AlreadyMounted,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Board<R: Raster> {
    surface: SharedSurface<R>,
    replicator: StrokeReplicator<R>,
    store: Arc<dyn RemoteStore>,
    mounted: Arc<AtomicBool>,
}

/// Keeps a mounted board's feed pump alive. Dropping it unmounts.
pub struct MountHandle {
    pump: JoinHandle<()>,
    _claim: MountClaim,
}

/// Releases the board's mount flag when dropped, including when `mount`
/// fails or is cancelled part way.
struct MountClaim(Arc<AtomicBool>);

impl Drop for MountClaim {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MountHandle {
    /// Whether the feed ended on its own.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pump.is_finished()
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl<R: Raster + 'static> Board<R> {
    /// Build an unmounted board whose tasks run on `runtime`.
    #[must_use]
    pub fn new(
        raster: R,
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn Notifier>,
        config: BoardConfig,
        runtime: Handle,
    ) -> Self {
        let surface = Arc::new(Mutex::new(DrawSurface::new(raster, config.brush)));
        let replicator =
            StrokeReplicator::new(Arc::clone(&store), Arc::clone(&surface), notifier, config.flush_delay, runtime);
        Self { surface, replicator, store, mounted: Arc::new(AtomicBool::new(false)) }
    }

    /// Size the surface, replay the store, and start applying feed events.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::AlreadyMounted`] while an earlier handle is
    /// alive, without touching the surface. Returns the store error if the
    /// feed cannot be opened. The replay still runs, so the board shows the
    /// stored drawing without live updates.
    pub async fn mount(&self, viewport: Viewport) -> Result<MountHandle, MountError> {
        if self.mounted.swap(true, Ordering::SeqCst) {
            warn!("board is already mounted");
            return Err(MountError::AlreadyMounted);
        }
        let claim = MountClaim(Arc::clone(&self.mounted));

        lock(&self.surface).resize(viewport);

        let subscription = self.store.subscribe().await;
        self.replicator.load_all().await;

        let mut subscription = match subscription {
            Ok(subscription) => subscription,
            Err(e) => {
                error!(error = %e, "failed to open change feed");
                return Err(e.into());
            }
        };

        let replicator = self.replicator.clone();
        let pump = self.replicator.runtime().spawn(async move {
            while let Some(event) = subscription.recv().await {
                replicator.apply(event).await;
            }
            warn!("change feed ended");
        });

        info!(width = viewport.width, height = viewport.height, "board mounted");
        Ok(MountHandle { pump, _claim: claim })
    }

    /// Resize and replay. The returned task resolves to the number of
    /// segments drawn.
    pub fn resize(&self, viewport: Viewport) -> JoinHandle<usize> {
        lock(&self.surface).resize(viewport);
        let replicator = self.replicator.clone();
        self.replicator.runtime().spawn(async move { replicator.load_all().await })
    }

    /// Feed one pointer or touch event. Returns whether a segment was drawn.
    pub fn pointer(&self, input: &PointerInput) -> bool {
        let segment = lock(&self.surface).handle_pointer(input);
        match segment {
            Some(segment) => {
                self.replicator.enqueue(segment);
                true
            }
            None => false,
        }
    }

    /// # Errors
    ///
    /// Returns [`BrushError::InvalidColor`] and keeps the previous color.
    pub fn set_color(&self, color: &str) -> Result<(), BrushError> {
        lock(&self.surface).set_color(color)
    }

    /// Set the brush width, clamped to the supported range. Returns the
    /// width actually applied.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidWidth`] for non-positive or non-finite
    /// widths.
    pub fn set_stroke_width(&self, width: f64) -> Result<f64, BrushError> {
        lock(&self.surface).set_stroke_width(width)
    }

    /// Clear the board for everyone. Failures are reported to the notifier.
    pub fn clear(&self) -> JoinHandle<Result<(), StoreError>> {
        let replicator = self.replicator.clone();
        self.replicator.runtime().spawn(async move { replicator.clear_all().await })
    }

    /// Run `f` against the surface under its lock.
    pub fn with_surface<T>(&self, f: impl FnOnce(&DrawSurface<R>) -> T) -> T {
        f(&lock(&self.surface))
    }

    #[must_use]
    pub fn replicator(&self) -> &StrokeReplicator<R> {
        &self.replicator
    }
}
