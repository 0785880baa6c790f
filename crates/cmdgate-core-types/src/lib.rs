//! Shared vocabulary for the cmdgate crates
//!
//! - **Correlation ids**: `RequestId`, attached to engine log lines and errors
//! - **Schema constants**: canonical structured-logging field keys and event names
//! - **Sensitive data**: `Sensitive<T>` keeps credentials out of logs and debug output

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RequestId;
pub use sensitive::Sensitive;
