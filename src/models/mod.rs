mod entity;
mod kind;
mod status;

pub use entity::{
    apply_patch, format_timestamp, parse_timestamp, Entity, Fields, CREATED_AT, UPDATED_AT,
};
pub use kind::{Deletable, EntityKind, Orders, Products, Users};
pub use status::{
    status_history, AccountStatus, OrderStatus, StatusHistoryEntry, ADMIN_NOTES, STATUS_HISTORY,
};
