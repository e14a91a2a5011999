//! `cardstock-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, money/currency values and pagination.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod organization;
pub mod page;
pub mod value_object;

pub use entity::{Entity, OrgOwned};
pub use error::{DomainError, DomainResult};
pub use id::{CardId, InventoryItemId, ListingId, LocationId, OrgId};
pub use money::{CurrencyCode, MAX_AMOUNT, ensure_amount};
pub use organization::Organization;
pub use page::{Page, PageRequest};
pub use value_object::ValueObject;
