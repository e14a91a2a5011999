//! Listings domain module.
//!
//! A listing is a resale offer derived from exactly one inventory item. This
//! crate holds the listing entity, its status lifecycle and the all-or-nothing
//! batch planner used when staff list several items at once.

pub mod error;
pub mod listing;
pub mod plan;
pub mod status;

pub use error::ListingError;
pub use listing::{Listing, ListingRecord, INTERNAL_CHANNEL};
pub use plan::{ListingPlan, ListingPolicy, ListingProposal, plan_listings};
pub use status::ListingStatus;
