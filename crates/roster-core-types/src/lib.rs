//! Core types shared across Roster facilities
//!
//! - **Correlation**: `RequestId` stamped on every engine command
//! - **Schema constants**: canonical field keys and event names used by the
//!   logging macros and the feed story payload

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
