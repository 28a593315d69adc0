//! Summary counts derived from a cache.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use super::cache::EntityCache;
use crate::models::EntityKind;

/// Per-label counts plus the collection size.
///
/// Always produced by a full pass over the cache; never adjusted in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    counts: Vec<(&'static str, usize)>,
}

impl Stats {
    /// Count for a label. Labels outside the kind's enumeration count zero.
    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Label counts in enumeration order.
    pub fn counts(&self) -> &[(&'static str, usize)] {
        &self.counts
    }
}

/// Recomputes stats for `K` over the cache contents.
pub fn compute_stats<K: EntityKind>(cache: &EntityCache) -> Stats {
    let counts = match K::STAT_FIELD {
        Some(field) => K::STAT_LABELS
            .iter()
            .map(|label| {
                let n = cache
                    .iter()
                    .filter(|e| e.str_field(field) == Some(*label))
                    .count();
                (*label, n)
            })
            .collect(),
        None => Vec::new(),
    };

    Stats {
        total: cache.len(),
        counts,
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len() + 1))?;
        map.serialize_entry("total", &self.total)?;
        for (label, n) in &self.counts {
            map.serialize_entry(label, n)?;
        }
        map.end()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {}", "total", self.total)?;
        for (label, n) in &self.counts {
            writeln!(f, "{:<12} {}", label, n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Orders, Products, Users};
    use serde_json::json;

    fn cache(statuses: &[&str]) -> EntityCache {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Entity::new(
                    format!("e{}", i),
                    json!({"status": s}).as_object().cloned().unwrap(),
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_order_stats() {
        let stats = compute_stats::<Orders>(&cache(&[
            "pending",
            "pending",
            "shipped",
            "delivered",
            "refunded",
        ]));

        assert_eq!(stats.total, 5);
        assert_eq!(stats.count("pending"), 2);
        assert_eq!(stats.count("shipped"), 1);
        assert_eq!(stats.count("delivered"), 1);
        assert_eq!(stats.count("processing"), 0);
        assert_eq!(stats.count("cancelled"), 0);
        // unrecognised labels are counted in total only
        assert_eq!(stats.count("refunded"), 0);
    }

    #[test]
    fn test_user_stats() {
        let stats = compute_stats::<Users>(&cache(&["active", "inactive", "active"]));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.count("active"), 2);
        assert_eq!(stats.count("inactive"), 1);
    }

    #[test]
    fn test_product_stats_total_only() {
        let stats = compute_stats::<Products>(&cache(&["x", "y"]));

        assert_eq!(stats.total, 2);
        assert!(stats.counts().is_empty());
    }

    #[test]
    fn test_empty_cache_lists_every_label() {
        let stats = compute_stats::<Orders>(&EntityCache::new());

        assert_eq!(stats.total, 0);
        assert_eq!(stats.counts().len(), 5);
    }

    #[test]
    fn test_stats_serialize_in_label_order() {
        let stats = compute_stats::<Users>(&cache(&["active"]));
        let json = serde_json::to_string(&stats).unwrap();

        assert_eq!(json, r#"{"total":1,"active":1,"inactive":0}"#);
    }
}
