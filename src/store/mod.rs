//! Client-side entity synchronization.
//!
//! - [`EntityCache`]: ordered local copy of a collection
//! - [`SyncController`]: remote operations reconciled into the cache
//! - [`Stats`]: counts recomputed from the cache after each mutation
//! - [`views`]: filters and aggregates computed on demand
//! - [`Console`]: products, orders and users over one gateway

mod cache;
mod console;
mod controller;
mod error;
mod stats;
pub mod views;

pub use cache::EntityCache;
pub use console::Console;
pub use controller::SyncController;
pub use error::StoreError;
pub use stats::{compute_stats, Stats};
