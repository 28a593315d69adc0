//! The three collection controllers wired to one gateway.

use std::sync::Arc;

use super::controller::SyncController;
use super::error::StoreError;
use crate::gateway::RemoteGateway;
use crate::models::{Orders, Products, Users};

/// Products, orders and users over a shared gateway.
///
/// Constructed explicitly and passed to whoever needs it; there is no global
/// instance.
pub struct Console {
    pub products: SyncController<Products>,
    pub orders: SyncController<Orders>,
    pub users: SyncController<Users>,
}

impl Console {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            products: SyncController::new(gateway.clone()),
            orders: SyncController::new(gateway.clone()),
            users: SyncController::new(gateway),
        }
    }

    /// Loads all three collections concurrently.
    ///
    /// All three fetches run to completion and record their own failures;
    /// the first failure in products, orders, users order is returned.
    pub async fn refresh_all(&self) -> Result<(), StoreError> {
        let (products, orders, users) = tokio::join!(
            self.products.fetch_all(),
            self.orders.fetch_all(),
            self.users.fetch_all(),
        );
        products.and(orders).and(users)
    }

    /// True while any controller has an operation in flight.
    pub fn busy(&self) -> bool {
        self.products.busy() || self.orders.busy() || self.users.busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Document, MemoryGateway};
    use serde_json::json;

    #[tokio::test]
    async fn test_refresh_all_loads_each_collection() {
        let gateway = MemoryGateway::new();
        gateway.seed(
            "orders",
            vec![Document::new(
                "o1",
                json!({"status": "pending"}).as_object().cloned().unwrap(),
            )],
        );
        gateway.seed(
            "users",
            vec![
                Document::new("u1", json!({"status": "active"}).as_object().cloned().unwrap()),
                Document::new("u2", json!({"status": "active"}).as_object().cloned().unwrap()),
            ],
        );
        let console = Console::new(Arc::new(gateway));

        console.refresh_all().await.unwrap();

        assert!(console.products.is_empty());
        assert_eq!(console.orders.len(), 1);
        assert_eq!(console.users.stats().count("active"), 2);
        assert!(!console.busy());
    }

    #[tokio::test]
    async fn test_refresh_all_reports_failure() {
        let gateway = Arc::new(MemoryGateway::new());
        gateway.set_unavailable(true);
        let console = Console::new(gateway);

        let err = console.refresh_all().await.unwrap_err();

        assert!(matches!(err, StoreError::RemoteRead(_)));
        assert!(console.products.last_error().is_some());
        assert!(console.orders.last_error().is_some());
        assert!(console.users.last_error().is_some());
    }

    #[tokio::test]
    async fn test_writes_persist_across_sessions_on_disk() {
        use crate::gateway::FileGateway;
        use crate::models::OrderStatus;

        let temp_dir = tempfile::tempdir().unwrap();

        let order_id = {
            let console = Console::new(Arc::new(FileGateway::new(temp_dir.path())));
            console
                .products
                .create(json!({"name": "Rose", "price": 12.5}).as_object().cloned().unwrap())
                .await
                .unwrap();
            let order = console
                .orders
                .create(json!({"total": 40.0}).as_object().cloned().unwrap())
                .await
                .unwrap();
            console
                .orders
                .update_status(&order.id, OrderStatus::Delivered, Some("signed for"))
                .await
                .unwrap();
            order.id
        };

        let console = Console::new(Arc::new(FileGateway::new(temp_dir.path())));
        console.refresh_all().await.unwrap();

        let product = &console.products.entities()[0];
        assert_eq!(product.str_field("name"), Some("Rose"));
        assert_eq!(product.bool_field("active"), Some(true));
        assert_eq!(product.bool_field("featured"), Some(false));

        let order = console.orders.cached(&order_id).unwrap();
        assert_eq!(order.str_field("status"), Some("delivered"));
        assert_eq!(order.str_field("adminNotes"), Some("signed for"));
        let history = crate::models::status_history(&order);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, "delivered");
        assert_eq!(history[0].notes, "signed for");
        assert_eq!(console.orders.total_revenue(), 40.0);
        assert!(console.users.is_empty());
    }
}
