//! Subscription plan, usage, and memo tracking for a personal SaaS stack
//!
//! Statistics (monthly use counts, cost-per-use, total spend) are computed
//! by pure functions in [`services::aggregator`] over records fetched from
//! the JSON document store in [`services::store`].

pub mod cli;
pub mod services;
pub mod types;
