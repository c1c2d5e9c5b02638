//! Type definitions for subtrack

mod error;
mod memo;
mod plan;
mod service;
mod usage;

pub use error::*;
pub use memo::*;
pub use plan::*;
pub use service::*;
pub use usage::*;
