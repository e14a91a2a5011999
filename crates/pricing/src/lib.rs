//! Pricing domain module.
//!
//! Suggested resale prices are a pure function of an item's acquisition cost
//! and the configured [`PricingPolicy`]: no IO, no side effects.

pub mod evaluate;
pub mod policy;

pub use evaluate::{PriceQuote, PricingEvaluation, RejectedItem, RejectionReason, evaluate};
pub use policy::PricingPolicy;
