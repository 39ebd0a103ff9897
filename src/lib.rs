//! Shared drawing board for the portfolio site.
//!
//! Visitors draw freehand on a raster surface. Every pointer move becomes a
//! straight line segment that is rendered immediately, normalized against the
//! surface's CSS box, batched, and written to a [`store::RemoteStore`]. The
//! store's change feed fans new segments out to every mounted board, so all
//! copies of the page converge on the same drawing.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`board`] | Owning component: one surface + one replicator + change-feed pump |
//! | [`surface`] | Raster ownership, stroke sessions, local rendering |
//! | [`replicator`] | Pending buffer, flush state machine, replay |
//! | [`store`] | `RemoteStore` seam and its memory / Postgres / HTTP backends |
//! | [`segment`] | The persisted line primitive and its wire row |
//! | [`brush`] | Current color and stroke width |
//! | [`geometry`] | Points, CSS box, device pixel ratio |
//! | [`input`] | Pointer and touch input translation |
//! | [`raster`] | Raster trait and the headless [`raster::DisplayList`] |
//! | [`notify`] | User-visible error notifications |
//! | [`config`] | Board and host configuration |
//! | [`routes`], [`state`], [`db`] | The board host's HTTP surface |

pub mod board;
pub mod brush;
pub mod config;
pub mod consts;
pub mod db;
pub mod geometry;
pub mod input;
pub mod notify;
pub mod raster;
pub mod replicator;
pub mod routes;
pub mod segment;
pub mod state;
pub mod store;
pub mod surface;
