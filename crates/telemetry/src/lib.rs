//! Token usage accounting and cost estimation for Dostbot sessions.
//!
//! Every answered turn reports the provider's token counts; the totals are
//! priced against a built-in per-model table.

pub mod pricing;
pub mod usage;

pub use pricing::{ModelPricing, PricingTable};
pub use usage::{SessionUsage, UsageSnapshot};
