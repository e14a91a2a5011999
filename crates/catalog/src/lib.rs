//! Card catalog domain module.
//!
//! Catalog entries are immutable reference data identifying a specific printed
//! card. Inventory items point at them by [`CardId`](cardstock_core::CardId).

pub mod card;
pub mod search;

pub use card::Card;
pub use search::CatalogQuery;
