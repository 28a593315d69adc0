//! Vibe Admin
//!
//! Synchronization layer for the admin console: local caches of the
//! products, orders and users collections kept consistent with a remote
//! document store.

pub mod config;
pub mod gateway;
pub mod models;
pub mod store;

pub use config::{Config, ConfigError, ConfigSource, ConfigValue};
pub use gateway::{
    Document, FileGateway, GatewayError, MemoryGateway, RemoteGateway, SortDirection,
};
pub use models::{
    apply_patch, AccountStatus, Deletable, Entity, EntityKind, Fields, OrderStatus, Orders,
    Products, StatusHistoryEntry, Users,
};
pub use store::{compute_stats, Console, EntityCache, Stats, StoreError, SyncController};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
