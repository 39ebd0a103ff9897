//! Shared state for the board host.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! host is a thin shell over one [`RemoteStore`]; handlers map store errors
//! to status codes.

use std::sync::Arc;

use crate::store::RemoteStore;

/// Clone is required by Axum; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }
}
