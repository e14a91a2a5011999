//! Inventory domain module.
//!
//! This crate contains business rules for inventory items and storage
//! locations, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod item;
pub mod location;
pub mod status;

pub use item::{AddItem, InventoryItem, InventoryItemRecord};
pub use location::{CreateLocation, Location};
pub use status::InventoryStatus;
