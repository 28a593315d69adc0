//! Entity-type descriptors.
//!
//! Each managed collection is described by a zero-sized marker type that
//! implements [`EntityKind`]. The sync controller, cache statistics and read
//! views are generic over the descriptor, so products, orders and users share
//! one implementation.

use serde_json::Value;

use super::entity::Fields;
use super::status::{AccountStatus, OrderStatus};

/// Describes one remote collection and how its records are counted.
pub trait EntityKind: Send + Sync + 'static {
    /// Remote collection name.
    const COLLECTION: &'static str;

    /// Singular, human-readable name used in errors and logs.
    const LABEL: &'static str;

    /// Field counted by the stats aggregator, if any.
    const STAT_FIELD: Option<&'static str>;

    /// The fixed set of labels counted for [`Self::STAT_FIELD`].
    const STAT_LABELS: &'static [&'static str];

    /// Whether a `status` change appends to the record's status history.
    const TRACKS_STATUS_HISTORY: bool = false;

    /// Stamps type-specific defaults onto a record about to be created.
    ///
    /// Runs after the caller's fields are in place, so defaults win.
    fn apply_creation_defaults(_fields: &mut Fields) {}
}

/// Collections whose records may be deleted.
pub trait Deletable: EntityKind {}

/// Catalog items.
#[derive(Debug, Clone, Copy, Default)]
pub struct Products;

impl EntityKind for Products {
    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";
    const STAT_FIELD: Option<&'static str> = None;
    const STAT_LABELS: &'static [&'static str] = &[];

    fn apply_creation_defaults(fields: &mut Fields) {
        fields.insert("featured".into(), Value::Bool(false));
        fields.insert("active".into(), Value::Bool(true));
    }
}

impl Deletable for Products {}

/// Customer orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orders;

impl EntityKind for Orders {
    const COLLECTION: &'static str = "orders";
    const LABEL: &'static str = "Order";
    const STAT_FIELD: Option<&'static str> = Some("status");
    const STAT_LABELS: &'static [&'static str] = &OrderStatus::LABELS;
    const TRACKS_STATUS_HISTORY: bool = true;
}

/// User accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Users;

impl EntityKind for Users {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const STAT_FIELD: Option<&'static str> = Some("status");
    const STAT_LABELS: &'static [&'static str] = &AccountStatus::LABELS;
}
