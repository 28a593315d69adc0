//! Read views over cached entities.
//!
//! Every view is recomputed from the slice it is given; nothing is memoized.
//! Filters are stable and keep cache order.

use crate::models::{Entity, OrderStatus};

pub fn filter_by_field(entities: &[Entity], field: &str, value: &str) -> Vec<Entity> {
    entities
        .iter()
        .filter(|e| e.str_field(field) == Some(value))
        .cloned()
        .collect()
}

pub fn by_category(entities: &[Entity], category: &str) -> Vec<Entity> {
    filter_by_field(entities, "category", category)
}

pub fn by_status(entities: &[Entity], status: &str) -> Vec<Entity> {
    filter_by_field(entities, "status", status)
}

/// The first `n` entities in cache order.
///
/// This is only as recent as the cache order: records created locally sit at
/// the front, but updated records keep the position of the last bulk load.
pub fn recent(entities: &[Entity], n: usize) -> Vec<Entity> {
    entities.iter().take(n).cloned().collect()
}

/// Sum of `total` over delivered orders. Non-numeric totals count as zero.
pub fn total_revenue(entities: &[Entity]) -> f64 {
    entities
        .iter()
        .filter(|e| e.str_field("status") == Some(OrderStatus::Delivered.as_str()))
        .map(|e| e.f64_field("total").unwrap_or(0.0))
        .sum()
}

pub fn featured(entities: &[Entity]) -> Vec<Entity> {
    entities
        .iter()
        .filter(|e| e.bool_field("featured") == Some(true))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(id: &str, value: serde_json::Value) -> Entity {
        Entity::new(id, value.as_object().cloned().unwrap())
    }

    fn ids(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.id.as_str()).collect()
    }

    fn orders() -> Vec<Entity> {
        vec![
            entity("o1", json!({"status": "delivered", "total": 30.5})),
            entity("o2", json!({"status": "pending", "total": 100})),
            entity("o3", json!({"status": "delivered", "total": 20})),
            entity("o4", json!({"status": "delivered", "total": "n/a"})),
        ]
    }

    #[test]
    fn test_by_status_is_stable() {
        assert_eq!(ids(&by_status(&orders(), "delivered")), vec!["o1", "o3", "o4"]);
        assert!(by_status(&orders(), "shipped").is_empty());
    }

    #[test]
    fn test_by_category() {
        let products = vec![
            entity("p1", json!({"category": "flower"})),
            entity("p2", json!({"category": "edible"})),
            entity("p3", json!({"category": "flower"})),
        ];

        assert_eq!(ids(&by_category(&products, "flower")), vec!["p1", "p3"]);
    }

    #[test]
    fn test_total_revenue_counts_delivered_only() {
        assert_eq!(total_revenue(&orders()), 50.5);
        assert_eq!(total_revenue(&[]), 0.0);
    }

    #[test]
    fn test_recent_takes_prefix() {
        assert_eq!(ids(&recent(&orders(), 2)), vec!["o1", "o2"]);
        assert_eq!(recent(&orders(), 10).len(), 4);
        assert!(recent(&orders(), 0).is_empty());
    }

    #[test]
    fn test_featured() {
        let products = vec![
            entity("p1", json!({"featured": true})),
            entity("p2", json!({"featured": false})),
            entity("p3", json!({})),
        ];

        assert_eq!(ids(&featured(&products)), vec!["p1"]);
    }
}
