use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::entity::{format_timestamp, Entity};

/// Field holding an order's append-only status history.
pub const STATUS_HISTORY: &str = "statusHistory";
/// Field holding the most recent admin note on an order.
pub const ADMIN_NOTES: &str = "adminNotes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const LABELS: [&'static str; 5] =
        ["pending", "processing", "shipped", "delivered", "cancelled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid order status '{}'. Valid options: {}",
                    s,
                    OrderStatus::LABELS.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub const LABELS: [&'static str; 2] = ["active", "inactive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            _ => Err(format!(
                "Invalid account status '{}'. Valid options: active, inactive",
                s
            )),
        }
    }
}

/// One step in an order's status history.
///
/// Entries are only ever appended; the list is never rewritten or truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub notes: String,
}

impl StatusHistoryEntry {
    pub fn new(status: impl Into<String>, at: DateTime<Utc>, notes: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            timestamp: format_timestamp(at),
            notes: notes.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        json!({
            "status": self.status,
            "timestamp": self.timestamp,
            "notes": self.notes,
        })
    }
}

/// Reads an order's status history. Malformed entries are skipped.
pub fn status_history(entity: &Entity) -> Vec<StatusHistoryEntry> {
    entity
        .get(STATUS_HISTORY)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
